// Desktop / mobile mode and the per-mode configuration record.
// Everything size- or speed-related that differs between the two layouts is
// looked up here once per mode change instead of branching at each use site.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Viewports whose smaller side is below this many CSS pixels start in mobile mode.
pub const AUTO_MOBILE_THRESHOLD: f64 = 700.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Mode {
    #[default]
    Desktop,
    Mobile,
}

impl Mode {
    /// Storage representation (`"desktop"` / `"mobile"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Desktop => "desktop",
            Mode::Mobile => "mobile",
        }
    }

    /// Parse a stored preference. Anything unrecognised is treated as absent.
    pub fn parse(s: &str) -> Option<Mode> {
        match s {
            "desktop" => Some(Mode::Desktop),
            "mobile" => Some(Mode::Mobile),
            _ => None,
        }
    }

    pub fn toggled(self) -> Mode {
        match self {
            Mode::Desktop => Mode::Mobile,
            Mode::Mobile => Mode::Desktop,
        }
    }

    /// Pick a mode from raw CSS viewport size. Non-finite input falls back to desktop.
    pub fn auto_detect(css_width: f64, css_height: f64) -> Mode {
        let smaller = css_width.min(css_height);
        if smaller.is_finite() && smaller < AUTO_MOBILE_THRESHOLD {
            Mode::Mobile
        } else {
            Mode::Desktop
        }
    }

    pub fn config(self) -> &'static ModeConfig {
        match self {
            Mode::Desktop => &DESKTOP,
            Mode::Mobile => &MOBILE,
        }
    }
}

/// Where the player stands horizontally.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PlayerAnchor {
    /// Fixed logical x.
    Fixed(f64),
    /// Fraction of the view width, never closer to the left edge than `min`.
    Fraction { frac: f64, min: f64 },
}

impl PlayerAnchor {
    pub fn resolve(self, view_width: f64) -> f64 {
        match self {
            PlayerAnchor::Fixed(x) => x,
            PlayerAnchor::Fraction { frac, min } => (frac * view_width).max(min),
        }
    }
}

/// Per-mode constants for viewport, spawner and speed ramp.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModeConfig {
    /// Scroll speed at the start of a run (logical units / s).
    pub start_speed: f64,
    /// Target speed gain per second of survival.
    pub ramp: f64,
    pub player_anchor: PlayerAnchor,
    /// Unscaled player edge length; multiplied by `scale` and rounded.
    pub player_size: f64,
    pub obstacle_base_w: f64,
    pub obstacle_base_h: f64,
    pub obstacle_extra_w: f64,
    pub obstacle_extra_h: f64,
}

pub static DESKTOP: ModeConfig = ModeConfig {
    start_speed: 360.0,
    ramp: 24.0,
    player_anchor: PlayerAnchor::Fixed(120.0),
    player_size: 60.0,
    obstacle_base_w: 28.0,
    obstacle_base_h: 50.0,
    obstacle_extra_w: 10.0,
    obstacle_extra_h: 15.0,
};

pub static MOBILE: ModeConfig = ModeConfig {
    start_speed: 420.0,
    ramp: 30.0,
    player_anchor: PlayerAnchor::Fraction { frac: 0.12, min: 32.0 },
    player_size: 60.0,
    obstacle_base_w: 28.0,
    obstacle_base_h: 50.0,
    obstacle_extra_w: 10.0,
    obstacle_extra_h: 15.0,
};
