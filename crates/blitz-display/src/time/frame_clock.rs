use std::time::{Duration, Instant};

/// Timing snapshot for one loop iteration.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Zero-based index of this frame since the clock was created.
    pub frame_index: u64,

    /// Smoothed frames per second, `None` until two ticks have happened.
    pub fps: Option<f32>,
}

/// Per-loop frame clock.
///
/// Delta time is clamped so a debugger pause or a minimized window does not
/// hand a multi-second `dt` to animation code.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
    fps: Option<f32>,
}

/// Weight of the newest sample in the fps moving average.
const FPS_SMOOTHING: f32 = 0.1;

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: None,
            frame_index: 0,
            dt_min,
            dt_max,
            fps: None,
        }
    }

    /// Forgets the previous tick, e.g. after the loop was suspended.
    pub fn reset(&mut self) {
        self.last = None;
    }

    #[inline]
    pub fn fps(&self) -> Option<f32> {
        self.fps
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = match self.last {
            Some(last) => {
                let raw = now.saturating_duration_since(last);
                if raw > Duration::ZERO {
                    let sample = 1.0 / raw.as_secs_f32();
                    self.fps = Some(match self.fps {
                        Some(avg) => avg + (sample - avg) * FPS_SMOOTHING,
                        None => sample,
                    });
                }
                raw.clamp(self.dt_min, self.dt_max)
            }
            None => self.dt_min,
        };
        self.last = Some(now);

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
            fps: self.fps,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_has_no_fps() {
        let mut clock = FrameClock::new();
        let ft = clock.tick_at(Instant::now());
        assert_eq!(ft.frame_index, 0);
        assert!(ft.fps.is_none());
    }

    #[test]
    fn steady_ticks_converge_to_rate() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        let mut last = None;
        for i in 0..200u32 {
            last = Some(clock.tick_at(start + Duration::from_millis(20) * i));
        }
        let ft = last.unwrap();
        assert_eq!(ft.frame_index, 199);
        let fps = ft.fps.unwrap();
        assert!((fps - 50.0).abs() < 0.5, "fps = {fps}");
        assert!((ft.dt - 0.020).abs() < 1e-4);
    }

    #[test]
    fn long_stall_is_clamped() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick_at(start);
        let ft = clock.tick_at(start + Duration::from_secs(5));
        assert!((ft.dt - 0.25).abs() < 1e-6);
    }

    #[test]
    fn reset_drops_baseline() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick_at(start);
        clock.reset();
        let ft = clock.tick_at(start + Duration::from_secs(3));
        assert!((ft.dt - 0.0001).abs() < 1e-6);
        assert_eq!(ft.frame_index, 1);
    }
}
