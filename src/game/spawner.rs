// Obstacle spawner: countdown timer plus randomized pop sizes.

use rand::Rng;

use super::config::Tuning;
use super::entities::Obstacle;
use super::mode::ModeConfig;
use super::viewport::Viewport;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spawner {
    /// Seconds until the next pop. Starts at zero so a fresh run spawns at once.
    pub timer: f64,
}

impl Spawner {
    pub fn new() -> Self {
        Self { timer: 0.0 }
    }

    pub fn reset(&mut self) {
        self.timer = 0.0;
    }

    /// Advance the countdown by `dt`; when it runs out, return a new pop just
    /// beyond the right edge and rearm with the interval for elapsed time `t`.
    pub fn tick<R: Rng>(
        &mut self,
        dt: f64,
        t: f64,
        viewport: &Viewport,
        cfg: &ModeConfig,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Option<Obstacle> {
        self.timer -= dt;
        if self.timer > 0.0 {
            return None;
        }
        self.timer = tuning.spawn_interval(t);
        Some(spawn_obstacle(viewport, cfg, tuning, rng))
    }
}

/// One pop with width/height drawn from `base + uniform(0, extra)`, all scaled.
pub fn spawn_obstacle<R: Rng>(
    viewport: &Viewport,
    cfg: &ModeConfig,
    tuning: &Tuning,
    rng: &mut R,
) -> Obstacle {
    let s = viewport.scale;
    let w = cfg.obstacle_base_w * s + rng.r#gen::<f64>() * cfg.obstacle_extra_w * s;
    let h = cfg.obstacle_base_h * s + rng.r#gen::<f64>() * cfg.obstacle_extra_h * s;
    Obstacle::on_ground(viewport.view_width + tuning.spawn_margin, w, h, viewport.ground_y)
}
