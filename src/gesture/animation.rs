//! Time-driven animation primitives for the card stack.

use std::time::{Duration, Instant};

/// A fixed-duration ease-in-out interpolation between two values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    from: f64,
    to: f64,
    started: Instant,
    duration: Duration,
}

impl Timing {
    pub fn new(from: f64, to: f64, started: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started,
            duration,
        }
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn value(&self, now: Instant) -> f64 {
        let t = ease_in_out(self.progress(now));
        self.from + (self.to - self.from) * t
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

const STEP: Duration = Duration::from_millis(1);
const REST_DISPLACEMENT: f64 = 0.001;
const REST_SPEED: f64 = 0.001;

/// A damped spring pulling a value back to zero.
///
/// `tension`/`friction` are origami-style values and are mapped onto
/// stiffness/damping the way mobile animation libraries do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    position: f64,
    velocity: f64,
    stiffness: f64,
    damping: f64,
    last: Instant,
}

impl Spring {
    pub fn new(position: f64, tension: f64, friction: f64, now: Instant) -> Self {
        Self {
            position,
            velocity: 0.0,
            stiffness: (tension - 30.0) * 3.62 + 194.0,
            damping: (friction - 8.0) * 3.0 + 25.0,
            last: now,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    /// Advance to `now` in fixed 1ms steps. Snaps to zero once at rest.
    pub fn advance(&mut self, now: Instant) {
        let mut remaining = now.saturating_duration_since(self.last);
        self.last = now;

        while !remaining.is_zero() && !self.is_at_rest() {
            let dt = remaining.min(STEP);
            remaining -= dt;

            let dt = dt.as_secs_f64();
            let accel = -self.stiffness * self.position - self.damping * self.velocity;
            self.velocity += accel * dt;
            self.position += self.velocity * dt;
        }

        if self.is_at_rest() {
            self.position = 0.0;
            self.velocity = 0.0;
        }
    }

    pub fn is_at_rest(&self) -> bool {
        self.position.abs() < REST_DISPLACEMENT && self.velocity.abs() < REST_SPEED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_endpoints_and_clamp() {
        let start = Instant::now();
        let timing = Timing::new(0.0, 400.0, start, Duration::from_millis(350));

        assert_eq!(timing.value(start), 0.0);
        let mid = start + Duration::from_millis(175);
        assert!((timing.progress(mid) - 0.5).abs() < 1e-9);
        assert!((timing.value(mid) - 200.0).abs() < 1e-6);
        assert_eq!(timing.value(start + Duration::from_secs(2)), 400.0);
        assert!(timing.is_finished(start + Duration::from_millis(350)));
        assert!(!timing.is_finished(start + Duration::from_millis(349)));
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let start = Instant::now();
        let timing = Timing::new(10.0, -10.0, start, Duration::ZERO);
        assert!(timing.is_finished(start));
        assert_eq!(timing.value(start), -10.0);
    }

    #[test]
    fn test_spring_moves_towards_zero_and_settles() {
        let start = Instant::now();
        let mut spring = Spring::new(120.0, 40.0, 4.0, start);

        spring.advance(start + Duration::from_millis(50));
        assert!(spring.position() < 120.0);
        assert!(!spring.is_at_rest());

        spring.advance(start + Duration::from_secs(10));
        assert!(spring.is_at_rest());
        assert_eq!(spring.position(), 0.0);
    }

    #[test]
    fn test_low_friction_spring_overshoots() {
        let start = Instant::now();
        let mut spring = Spring::new(100.0, 40.0, 4.0, start);

        let mut min: f64 = 100.0;
        for ms in 1..=1000 {
            spring.advance(start + Duration::from_millis(ms));
            min = min.min(spring.position());
        }
        assert!(min < 0.0, "expected overshoot, min was {min}");
    }
}
