// Player, obstacles and the inset bounding-box test.

/// Axis-aligned box in logical canvas units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Aabb {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Degenerate boxes (zero / negative / non-finite extent) never collide.
    pub fn has_area(&self) -> bool {
        self.w > 0.0
            && self.h > 0.0
            && self.x.is_finite()
            && self.y.is_finite()
            && self.w.is_finite()
            && self.h.is_finite()
    }

    /// Shrink on every side by `inset`. Each axis is capped at a quarter of
    /// its own extent so a small box keeps half its size instead of inverting.
    pub fn shrunk(&self, inset: f64) -> Aabb {
        let dx = inset.min(self.w / 4.0).max(0.0);
        let dy = inset.min(self.h / 4.0).max(0.0);
        Aabb::new(self.x + dx, self.y + dy, self.w - 2.0 * dx, self.h - 2.0 * dy)
    }

    /// Forgiving overlap test: both boxes shrink by `inset` first, then any
    /// contact (edges inclusive) counts.
    pub fn collides(&self, other: &Aabb, inset: f64) -> bool {
        if !self.has_area() || !other.has_area() {
            return false;
        }
        let a = self.shrunk(inset);
        let b = other.shrunk(inset);
        !(a.right() < b.x || a.x > b.right() || a.bottom() < b.y || a.y > b.bottom())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub vy: f64,
    pub on_ground: bool,
}

impl Player {
    /// A player of edge `size` standing on `ground_y` at `x`.
    pub fn grounded(x: f64, size: f64, ground_y: f64) -> Self {
        Self { x, y: ground_y - size, w: size, h: size, vy: 0.0, on_ground: true }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.w, self.h)
    }
}

/// A scrolling pop the player has to clear.
#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Obstacle {
    /// Obstacle resting on `ground_y` with its left edge at `x`.
    pub fn on_ground(x: f64, w: f64, h: f64, ground_y: f64) -> Self {
        Self { x, y: ground_y - h, w, h }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.w, self.h)
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }
}
