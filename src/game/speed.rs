// Scroll speed ramp: exponential approach toward a target that grows with
// survival time. The smoothing factor is expressed per 60 fps frame and
// converted to a rate so other frame rates converge identically.

use super::config::Tuning;
use super::mode::ModeConfig;

const REFERENCE_FPS: f64 = 60.0;

#[derive(Clone, Debug, PartialEq)]
pub struct SpeedRamp {
    pub start: f64,
    pub ramp: f64,
    pub cap: f64,
    /// Continuous-time approach rate (1/s).
    pub rate: f64,
}

impl SpeedRamp {
    pub fn new(cfg: &ModeConfig, tuning: &Tuning) -> Self {
        Self {
            start: cfg.start_speed,
            ramp: cfg.ramp,
            cap: tuning.speed_bonus_cap,
            rate: -REFERENCE_FPS * (1.0 - tuning.speed_smoothing).ln(),
        }
    }

    pub fn target(&self, t: f64) -> f64 {
        self.start + (t * self.ramp).min(self.cap)
    }

    /// Highest speed the ramp can ever produce.
    pub fn ceiling(&self) -> f64 {
        self.start + self.cap
    }

    /// Move `speed` toward the target for elapsed time `t`.
    pub fn step(&self, speed: f64, t: f64, dt: f64) -> f64 {
        let target = self.target(t);
        let k = 1.0 - (-self.rate * dt).exp();
        let next = speed + (target - speed) * k;
        // never overshoot through rounding
        if speed <= target { next.min(target) } else { next.max(target) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::mode::{DESKTOP, MOBILE};

    #[test]
    fn per_frame_coefficient_matches_at_60fps() {
        let r = SpeedRamp::new(&DESKTOP, &Tuning::default());
        let next = r.step(360.0, 10.0, 1.0 / 60.0);
        // target 600, one frame moves 2% of the gap
        assert!((next - (360.0 + 240.0 * 0.02)).abs() < 1e-9);
    }

    #[test]
    fn target_is_capped() {
        let r = SpeedRamp::new(&MOBILE, &Tuning::default());
        assert_eq!(r.target(0.0), 420.0);
        assert_eq!(r.target(10.0), 720.0);
        assert_eq!(r.target(1_000.0), 1020.0);
        assert_eq!(r.ceiling(), 1020.0);
    }

    #[test]
    fn speed_approaches_but_never_exceeds_ceiling() {
        let r = SpeedRamp::new(&DESKTOP, &Tuning::default());
        let mut speed = r.start;
        let mut t = 0.0;
        let dt = 1.0 / 60.0;
        let mut last = speed;
        for _ in 0..(60 * 600) {
            t += dt;
            speed = r.step(speed, t, dt);
            assert!(speed <= r.ceiling());
            assert!(speed >= last);
            last = speed;
        }
        assert!(r.ceiling() - speed < 1.0);
    }

    #[test]
    fn frame_rate_independent() {
        let r = SpeedRamp::new(&DESKTOP, &Tuning::default());
        let run = |fps: f64| {
            let dt = 1.0 / fps;
            let (mut speed, mut t) = (r.start, 0.0);
            for _ in 0..(fps as usize * 5) {
                t += dt;
                speed = r.step(speed, t, dt);
            }
            speed
        };
        assert!((run(30.0) - run(120.0)).abs() < 2.0);
    }

    #[test]
    fn zero_dt_leaves_speed_alone() {
        let r = SpeedRamp::new(&DESKTOP, &Tuning::default());
        assert_eq!(r.step(400.0, 50.0, 0.0), 400.0);
    }
}
