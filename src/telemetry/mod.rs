pub mod mqtt;
pub mod parser;

pub use mqtt::{run_mqtt_ingress, Topics};
pub use parser::{
    decode_message, parse_detail, Channel, DetailReport, TelemetryEvent, TelemetryMessage,
};
