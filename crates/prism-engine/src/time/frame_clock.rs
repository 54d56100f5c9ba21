use std::time::{Duration, Instant};

/// Timing of one frame, handed to `SceneState::begin_frame`.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Clamped seconds since the previous tick.
    pub dt: f32,

    /// Sum of every clamped `dt` so far. Feeds the scene's elapsed time, so
    /// debugger pauses do not make animations jump.
    pub elapsed: f32,

    pub now: Instant,

    /// Selects the frame ring slot.
    pub frame_index: u64,
}

impl FrameTime {
    /// A synthetic frame, for driving the scene without a clock.
    pub fn fixed(frame_index: u64, dt: f32) -> Self {
        Self {
            dt,
            elapsed: dt * frame_index as f32,
            now: Instant::now(),
            frame_index,
        }
    }
}

/// Produces one `FrameTime` per presented frame.
///
/// Delta time is clamped to `[dt_min, dt_max]`.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    elapsed: Duration,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        Self::starting_at(Instant::now(), dt_min, dt_max)
    }

    fn starting_at(start: Instant, dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: start,
            elapsed: Duration::ZERO,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Moves the baseline to now without advancing elapsed time.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;
        self.elapsed += dt;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: self.elapsed.as_secs_f32(),
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

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn ticks_count_frames_and_accumulate_elapsed() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0, Duration::ZERO, Duration::from_secs(1));

        let a = clock.tick_at(t0 + Duration::from_millis(10));
        let b = clock.tick_at(t0 + Duration::from_millis(30));

        assert_eq!(a.frame_index, 0);
        assert_eq!(b.frame_index, 1);
        assert!(approx(a.dt, 0.010));
        assert!(approx(b.dt, 0.020));
        assert!(approx(b.elapsed, 0.030));
        assert_eq!(clock.frame_index(), 2);
    }

    #[test]
    fn long_stalls_are_clamped() {
        let t0 = Instant::now();
        let mut clock =
            FrameClock::starting_at(t0, Duration::from_millis(1), Duration::from_millis(250));

        let ft = clock.tick_at(t0 + Duration::from_secs(5));
        assert!(approx(ft.dt, 0.25));
        assert!(approx(ft.elapsed, 0.25));

        // Same instant again: clamped up to the minimum.
        let ft = clock.tick_at(t0 + Duration::from_secs(5));
        assert!(approx(ft.dt, 0.001));
    }

    #[test]
    fn fixed_frames_derive_elapsed_from_index() {
        let ft = FrameTime::fixed(4, 0.5);
        assert_eq!(ft.frame_index, 4);
        assert!(approx(ft.elapsed, 2.0));
    }
}
