use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub trait TimeSource: Send {
    fn now(&self) -> Instant;
}

pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A time source that only moves when told to. Clones share the same time.
#[derive(Clone)]
pub struct ManualTimeSource {
    now: Arc<Mutex<Instant>>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Start of the current shared epoch. Everyone reads the same epoch; anyone
/// may restart it.
pub struct SharedClock {
    epoch_start: Instant,
    source: Box<dyn TimeSource>,
}

impl SharedClock {
    pub fn new() -> Self {
        Self::with_source(Box::new(SystemTimeSource))
    }

    pub fn with_source(source: Box<dyn TimeSource>) -> Self {
        let epoch_start = source.now();
        Self {
            epoch_start,
            source,
        }
    }

    pub fn reset(&mut self) {
        self.epoch_start = self.source.now();
        log::info!("Shared clock reset");
    }

    pub fn elapsed(&self) -> Duration {
        self.source
            .now()
            .saturating_duration_since(self.epoch_start)
    }

    pub fn epoch_start(&self) -> Instant {
        self.epoch_start
    }
}
