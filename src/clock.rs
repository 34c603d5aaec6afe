use web_sys::{Performance, Window};

/// Monotonic millisecond time source
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// `performance.now()`, the same timebase as animation-frame timestamps
pub struct PerformanceClock {
    performance: Performance,
}

impl PerformanceClock {
    pub fn from_window(window: &Window) -> Option<Self> {
        window.performance().map(|performance| Self { performance })
    }
}

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        self.performance.now()
    }
}

/// Hand-driven clock; clones share the same time
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct ManualClock(std::rc::Rc<std::cell::Cell<f64>>);

#[cfg(test)]
impl ManualClock {
    pub fn set(&self, ms: f64) {
        self.0.set(ms);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.0.get()
    }
}
