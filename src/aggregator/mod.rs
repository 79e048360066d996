pub mod state;
pub mod store;

pub use store::{run_ingestion, StatusStore};
