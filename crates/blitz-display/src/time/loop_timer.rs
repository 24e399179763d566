use std::time::Instant;

/// Diagnostic stopwatch for the render loop.
///
/// The loop marks the start of every iteration; [`log`](Self::log) reports the
/// time since that mark and since the previous log line.
#[derive(Debug, Clone)]
pub struct LoopTimer {
    loop_start: Instant,
    last_event: Instant,
}

impl LoopTimer {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            loop_start: now,
            last_event: now,
        }
    }

    /// Resets both reference points to `now`.
    pub fn mark_iteration(&mut self, now: Instant) {
        self.loop_start = now;
        self.last_event = now;
    }

    #[inline]
    pub fn loop_start(&self) -> Instant {
        self.loop_start
    }

    /// Emits a timing line at `info` and returns it.
    pub fn log(&mut self, msg: &str) -> String {
        let line = self.line_at(Instant::now(), msg);
        log::info!(target: "blitz_display::timing", "{line}");
        line
    }

    /// Formats `[since_loop_ms since_last_ms] msg` for `now` and moves the
    /// last-event mark to `now`.
    pub fn line_at(&mut self, now: Instant, msg: &str) -> String {
        let since_loop = now.saturating_duration_since(self.loop_start);
        let since_last = now.saturating_duration_since(self.last_event);
        self.last_event = now;
        format!(
            "[{:5.2} {:5.2}] {}",
            since_loop.as_secs_f64() * 1000.0,
            since_last.as_secs_f64() * 1000.0,
            msg
        )
    }
}

impl Default for LoopTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn reports_both_intervals_in_millis() {
        let start = Instant::now();
        let mut timer = LoopTimer::new();
        timer.mark_iteration(start);

        let a = timer.line_at(start + Duration::from_micros(1_500), "cleared");
        assert_eq!(a, "[ 1.50  1.50] cleared");

        let b = timer.line_at(start + Duration::from_micros(12_250), "drawn");
        assert_eq!(b, "[12.25 10.75] drawn");
    }

    #[test]
    fn mark_iteration_restarts_both() {
        let start = Instant::now();
        let mut timer = LoopTimer::new();
        timer.mark_iteration(start);
        timer.line_at(start + Duration::from_millis(5), "x");

        let next = start + Duration::from_millis(16);
        timer.mark_iteration(next);
        assert_eq!(timer.line_at(next, "y"), "[ 0.00  0.00] y");
    }
}
