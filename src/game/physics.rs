//! Per-tick physics: gravity, ground clamp, jump, obstacle scroll, despawn and
//! collision. All functions take the frame delta in seconds and assume it has
//! already gone through [`sanitize_dt`].

use super::config::Tuning;
use super::entities::{Obstacle, Player};

/// Map a raw frame delta to something safe to simulate: NaN, infinite or
/// negative deltas become zero, anything else is capped at `max_dt`.
pub fn sanitize_dt(raw: f64, max_dt: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 { 0.0 } else { raw.min(max_dt) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerStep {
    Airborne,
    Grounded,
    /// Landed (or was standing) and took off this tick.
    Jumped,
}

/// Integrate gravity, clamp to `ground_y`, then apply a jump if requested.
/// The ground clamp runs first so a jump is only possible from the floor.
pub fn step_player(
    player: &mut Player,
    dt: f64,
    ground_y: f64,
    jump_requested: bool,
    jump_velocity: f64,
    tuning: &Tuning,
) -> PlayerStep {
    player.vy += tuning.gravity * dt;
    player.y += player.vy * dt;
    player.on_ground = false;

    if player.y + player.h >= ground_y {
        player.y = ground_y - player.h;
        player.vy = 0.0;
        player.on_ground = true;
    }

    if jump_requested && player.on_ground {
        player.vy = jump_velocity;
        player.on_ground = false;
        return PlayerStep::Jumped;
    }
    if player.on_ground { PlayerStep::Grounded } else { PlayerStep::Airborne }
}

/// Scroll every obstacle left by `speed * dt`.
pub fn advance_obstacles(obstacles: &mut [Obstacle], speed: f64, dt: f64) {
    let dx = speed * dt;
    for o in obstacles.iter_mut() {
        o.x -= dx;
    }
}

/// Drop obstacles whose right edge has passed `left_margin`. Returns how many
/// were removed; spawn order of the survivors is kept.
pub fn despawn_obstacles(obstacles: &mut Vec<Obstacle>, left_margin: f64) -> usize {
    let before = obstacles.len();
    obstacles.retain(|o| o.right() >= left_margin);
    before - obstacles.len()
}

/// Index of the first obstacle (in spawn order) touching the player.
pub fn first_collision(player: &Player, obstacles: &[Obstacle], inset: f64) -> Option<usize> {
    let pb = player.bounds();
    obstacles.iter().position(|o| pb.collides(&o.bounds(), inset))
}
