use portable_atomic::{AtomicBool, Ordering};

/// Cooperative stop request, checked once per loop iteration.
///
/// The firmware never raises [`STOP`]; both loops run for the device's
/// lifetime. It is the single exit path should one be wired up later.
pub struct StopFlag(AtomicBool);

impl StopFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for StopFlag {
    fn default() -> Self {
        Self::new()
    }
}

pub static STOP: StopFlag = StopFlag::new();
