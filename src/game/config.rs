// Global tuning values shared by both modes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Physics, pacing and scoring constants. `Default` matches the shipped game;
/// with the `serde_json` feature a JSON object can override any subset.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Tuning {
    /// Downward acceleration (logical units / s²).
    pub gravity: f64,
    /// Jump impulse before scale coupling (negative = up).
    pub jump_vel_base: f64,
    /// Bounds applied to `scale` before it multiplies the jump impulse.
    pub jump_scale_min: f64,
    pub jump_scale_max: f64,
    /// Largest frame delta ever simulated, in seconds.
    pub max_dt: f64,
    /// Collision box inset on every side.
    pub collision_inset: f64,
    /// Obstacles whose right edge is left of this x are dropped.
    pub despawn_x: f64,
    /// Distance past the right edge at which new obstacles appear.
    pub spawn_margin: f64,
    pub spawn_interval_start: f64,
    pub spawn_interval_decay: f64,
    pub spawn_interval_min: f64,
    /// Score points per second of survival.
    pub score_rate: f64,
    /// Cap on how far the target speed may rise above the start speed.
    pub speed_bonus_cap: f64,
    /// Per-frame smoothing coefficient at 60 fps.
    pub speed_smoothing: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 1800.0,
            jump_vel_base: -820.0,
            jump_scale_min: 0.85,
            jump_scale_max: 1.25,
            max_dt: 0.05,
            collision_inset: 6.0,
            despawn_x: -20.0,
            spawn_margin: 20.0,
            spawn_interval_start: 1.6,
            spawn_interval_decay: 0.02,
            spawn_interval_min: 0.7,
            score_rate: 60.0,
            speed_bonus_cap: 600.0,
            speed_smoothing: 0.02,
        }
    }
}

impl Tuning {
    /// Jump velocity for a viewport scale, with the scale clamped so tiny or huge
    /// screens still get a playable arc.
    pub fn jump_velocity(&self, scale: f64) -> f64 {
        self.jump_vel_base * scale.clamp(self.jump_scale_min, self.jump_scale_max)
    }

    /// Seconds until the next spawn after `t` seconds of survival.
    pub fn spawn_interval(&self, t: f64) -> f64 {
        (self.spawn_interval_start - self.spawn_interval_decay * t).max(self.spawn_interval_min)
    }

    #[cfg(feature = "serde_json")]
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
