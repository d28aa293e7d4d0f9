/// Device restart abstraction.
///
/// A hard reset is the escape hatch for every unrecoverable provisioning
/// path, so it goes through one narrow trait instead of being scattered as
/// direct platform calls.
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Schedules a hard device reset.
///
/// `restart` returns; the reset fires after `delay`, giving callers (the
/// web handlers in particular) time to hand a response back to the
/// transport. No graceful unwind happens on the device side.
pub trait Restart {
    fn restart(&self, delay: Duration);
}

/// Recording double for host builds and tests: restart requests are kept
/// as intents instead of resetting anything.
#[derive(Debug, Clone, Default)]
pub struct RecordedRestart {
    requests: Arc<Mutex<Vec<Duration>>>,
}

impl RecordedRestart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requested(&self) -> bool {
        self.count() > 0
    }

    pub fn count(&self) -> usize {
        self.requests.lock().expect("restart log poisoned").len()
    }

    /// Delays of the recorded requests, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.requests.lock().expect("restart log poisoned").clone()
    }
}

impl Restart for RecordedRestart {
    fn restart(&self, delay: Duration) {
        log::info!("restart requested in {:?}", delay);
        self.requests
            .lock()
            .expect("restart log poisoned")
            .push(delay);
    }
}
