/// Ownership of the optional prediction polling task
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Identifies one started schedule; goes stale once that schedule stops.
#[derive(Debug, Clone)]
pub struct ScheduleToken {
    current: Arc<AtomicU64>,
    generation: u64,
}

impl ScheduleToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// False once the schedule that issued this token was stopped
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

/// At most one running prediction task
///
/// `start_if_absent` and `stop_if_present` are the only transitions. The
/// task is aborted when stopped or when the schedule is dropped.
#[derive(Debug, Default)]
pub struct PredictionSchedule {
    handle: Option<JoinHandle<()>>,
    current: Arc<AtomicU64>,
}

impl PredictionSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Spawn the task built by `task` unless one is already running
    ///
    /// # Returns
    /// true if a new task was spawned
    pub fn start_if_absent<F, Fut>(&mut self, task: F) -> bool
    where
        F: FnOnce(ScheduleToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.handle.is_some() {
            return false;
        }

        let generation = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        let token = ScheduleToken {
            current: Arc::clone(&self.current),
            generation,
        };
        self.handle = Some(tokio::spawn(task(token)));
        true
    }

    /// Abort the running task, if any
    ///
    /// Tokens of the stopped task become stale first, so a fetch that is
    /// already past its last await point cannot publish its result.
    ///
    /// # Returns
    /// true if a task was running
    pub fn stop_if_present(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                self.current.fetch_add(1, Ordering::SeqCst);
                handle.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for PredictionSchedule {
    fn drop(&mut self) {
        self.stop_if_present();
    }
}
