//! Scroll-wheel page navigation.
//!
//! Wheel deltas accumulate until a threshold is crossed, at which point a
//! single page step fires and the accumulator resets. This keeps trackpad
//! micro-deltas from flipping pages on every event.

/// Accumulated wheel delta required to trigger a page change.
pub const WHEEL_THRESHOLD: f64 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    Next,
    Prev,
}

/// Rolling wheel-delta accumulator.
#[derive(Debug, Default)]
pub struct WheelAccumulator {
    sum: f64,
}

impl WheelAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one wheel event's delta. Returns a page step once the rolling
    /// sum crosses the threshold in either direction, resetting the sum.
    pub fn feed(&mut self, delta: f64) -> Option<PageStep> {
        self.sum += delta;
        if self.sum >= WHEEL_THRESHOLD {
            self.sum = 0.0;
            Some(PageStep::Next)
        } else if self.sum <= -WHEEL_THRESHOLD {
            self.sum = 0.0;
            Some(PageStep::Prev)
        } else {
            None
        }
    }

    /// Drop any partial accumulation (page change, teardown).
    pub fn reset(&mut self) {
        self.sum = 0.0;
    }
}

/// Clamp a page step against document bounds (pages are 1-indexed).
pub fn step_page(current: u32, total: u32, step: PageStep) -> Option<u32> {
    match step {
        PageStep::Next if current < total => Some(current + 1),
        PageStep::Prev if current > 1 => Some(current - 1),
        _ => None,
    }
}
