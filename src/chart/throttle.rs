use std::time::{Duration, Instant};

/// Coalesces redraw requests down to a minimum interval.
///
/// Requests landing inside the throttle window stay pending and are served
/// by the first render tick after the window opens; they are never dropped
/// and never queue up. The gate keeps no state across redraws beyond the
/// last draw time.
#[derive(Debug)]
pub struct RedrawGate {
    min_interval: Duration,
    last_draw: Option<Instant>,
    pending: bool,
}

impl RedrawGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_draw: None,
            pending: false,
        }
    }

    /// Note that something changed and the chart wants a redraw.
    pub fn request(&mut self) {
        self.pending = true;
    }

    /// True when a redraw should happen now; the pending request and the
    /// throttle window are consumed together.
    pub fn try_begin(&mut self, now: Instant) -> bool {
        if !self.pending {
            return false;
        }
        if let Some(last) = self.last_draw
            && now.duration_since(last) < self.min_interval
        {
            return false;
        }
        self.pending = false;
        self.last_draw = Some(now);
        true
    }
}
