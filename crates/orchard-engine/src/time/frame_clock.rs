use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous tick, in seconds (clamped).
    pub dt: f32,

    /// Scene time in seconds: the sum of every clamped `dt` so far.
    ///
    /// Stalls longer than the clamp do not make the scene jump ahead.
    pub t: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots, one per window.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    scene_time: f64,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: None,
            scene_time: 0.0,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Forgets the previous tick so the next `dt` is zero; scene time is kept.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    ///
    /// The first tick after creation or [`reset`](Self::reset) reports `dt = 0`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = match self.last {
            None => Duration::ZERO,
            Some(last) => now
                .saturating_duration_since(last)
                .clamp(self.dt_min, self.dt_max),
        };

        self.last = Some(now);
        self.scene_time += dt.as_secs_f64();

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            t: self.scene_time as f32,
            now,
            frame_index: self.frame_index,
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
    fn first_tick_starts_at_zero() {
        let mut c = FrameClock::new();
        let ft = c.tick_at(Instant::now());
        assert_eq!(ft.dt, 0.0);
        assert_eq!(ft.t, 0.0);
        assert_eq!(ft.frame_index, 0);
    }

    #[test]
    fn scene_time_accumulates_clamped_dt() {
        let mut c = FrameClock::new();
        let t0 = Instant::now();
        c.tick_at(t0);
        let a = c.tick_at(t0 + Duration::from_millis(16));
        assert!((a.dt - 0.016).abs() < 1e-6);

        // A five second stall counts as 250 ms.
        let b = c.tick_at(t0 + Duration::from_millis(5016));
        assert!((b.dt - 0.25).abs() < 1e-6);
        assert!((b.t - 0.266).abs() < 1e-5);
        assert_eq!(b.frame_index, 2);
    }

    #[test]
    fn reset_keeps_scene_time() {
        let mut c = FrameClock::new();
        let t0 = Instant::now();
        c.tick_at(t0);
        c.tick_at(t0 + Duration::from_millis(100));
        c.reset();
        let ft = c.tick_at(t0 + Duration::from_secs(60));
        assert_eq!(ft.dt, 0.0);
        assert!((ft.t - 0.1).abs() < 1e-6);
    }
}
