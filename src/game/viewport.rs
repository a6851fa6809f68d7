//! Viewport geometry for the two supported layouts.
//!
//! Desktop renders into a fixed 960×360 logical canvas that CSS letterboxes into
//! the page. Mobile takes the whole viewport and derives a `scale` from its
//! height relative to the desktop reference, zoomed out by [`MOBILE_ZOOM`] so
//! more of the track is visible. Every size-dependent gameplay value reads
//! `scale` from here.

use thiserror::Error;

use super::mode::Mode;

pub const DESKTOP_WIDTH: f64 = 960.0;
pub const DESKTOP_HEIGHT: f64 = 360.0;
/// Ground line distance from the bottom edge on desktop.
pub const DESKTOP_GROUND_OFFSET: f64 = 64.0;
/// Ground line distance from the bottom edge on mobile.
pub const MOBILE_GROUND_OFFSET: f64 = 80.0;
pub const MOBILE_ZOOM: f64 = 0.6;
pub const MIN_DPR: f64 = 1.0;
pub const MAX_DPR: f64 = 3.0;

/// Raw window metrics as reported by the browser.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportMetrics {
    pub css_width: f64,
    pub css_height: f64,
    pub device_pixel_ratio: f64,
}

impl ViewportMetrics {
    pub fn new(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> Self {
        Self { css_width, css_height, device_pixel_ratio }
    }

    fn has_area(&self) -> bool {
        self.css_width.is_finite()
            && self.css_height.is_finite()
            && self.css_width > 0.0
            && self.css_height > 0.0
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ViewportError {
    #[error("viewport metrics unavailable ({width}x{height})")]
    MissingMetrics { width: f64, height: f64 },
}

/// CSS size applied to the canvas element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CssSize {
    pub width: &'static str,
    pub height: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    pub mode: Mode,
    /// Device pixel ratio after clamping to `[1, 3]`.
    pub dpr: f64,
    /// Backing-store resolution in physical pixels.
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Logical drawing area; the context is scaled by `dpr`.
    pub view_width: f64,
    pub view_height: f64,
    pub css: CssSize,
    pub ground_y: f64,
    pub scale: f64,
}

pub fn clamp_dpr(raw: f64) -> f64 {
    if raw.is_finite() { raw.clamp(MIN_DPR, MAX_DPR) } else { MIN_DPR }
}

impl Viewport {
    /// Compute geometry for `mode`. Mobile needs a real window size; desktop
    /// ignores the window dimensions entirely.
    pub fn compute(mode: Mode, metrics: &ViewportMetrics) -> Result<Viewport, ViewportError> {
        let dpr = clamp_dpr(metrics.device_pixel_ratio);
        match mode {
            Mode::Desktop => Ok(Self::desktop(dpr)),
            Mode::Mobile => {
                if !metrics.has_area() {
                    return Err(ViewportError::MissingMetrics {
                        width: metrics.css_width,
                        height: metrics.css_height,
                    });
                }
                let (w, h) = (metrics.css_width, metrics.css_height);
                Ok(Viewport {
                    mode,
                    dpr,
                    canvas_width: (w * dpr).floor() as u32,
                    canvas_height: (h * dpr).floor() as u32,
                    view_width: w,
                    view_height: h,
                    css: CssSize { width: "100vw", height: "100vh" },
                    ground_y: h - MOBILE_GROUND_OFFSET,
                    scale: (h / DESKTOP_HEIGHT) * MOBILE_ZOOM,
                })
            }
        }
    }

    /// Desktop geometry at the given (already clamped) pixel ratio.
    pub fn desktop(dpr: f64) -> Viewport {
        Viewport {
            mode: Mode::Desktop,
            dpr,
            canvas_width: (DESKTOP_WIDTH * dpr).floor() as u32,
            canvas_height: (DESKTOP_HEIGHT * dpr).floor() as u32,
            view_width: DESKTOP_WIDTH,
            view_height: DESKTOP_HEIGHT,
            css: CssSize { width: "min(960px,96vw)", height: "auto" },
            ground_y: DESKTOP_HEIGHT - DESKTOP_GROUND_OFFSET,
            scale: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_is_fixed() {
        let vp = Viewport::compute(Mode::Desktop, &ViewportMetrics::new(1234.0, 777.0, 2.0)).unwrap();
        assert_eq!(vp.view_width, 960.0);
        assert_eq!(vp.view_height, 360.0);
        assert_eq!(vp.ground_y, 296.0);
        assert_eq!(vp.scale, 1.0);
        assert_eq!((vp.canvas_width, vp.canvas_height), (1920, 720));
    }

    #[test]
    fn desktop_tolerates_missing_metrics() {
        let vp = Viewport::compute(Mode::Desktop, &ViewportMetrics::new(0.0, f64::NAN, 0.0)).unwrap();
        assert_eq!(vp.dpr, 1.0);
        assert_eq!(vp.ground_y, 296.0);
    }

    #[test]
    fn mobile_scales_with_height() {
        let vp = Viewport::compute(Mode::Mobile, &ViewportMetrics::new(390.0, 720.0, 3.0)).unwrap();
        assert_eq!(vp.view_width, 390.0);
        assert_eq!(vp.ground_y, 640.0);
        assert!((vp.scale - 1.2).abs() < 1e-12);
        assert_eq!((vp.canvas_width, vp.canvas_height), (1170, 2160));
        assert_eq!(vp.css.width, "100vw");
    }

    #[test]
    fn dpr_is_clamped() {
        assert_eq!(clamp_dpr(0.5), 1.0);
        assert_eq!(clamp_dpr(4.0), 3.0);
        assert_eq!(clamp_dpr(f64::NAN), 1.0);
        let vp = Viewport::compute(Mode::Mobile, &ViewportMetrics::new(100.5, 200.5, 5.0)).unwrap();
        assert_eq!(vp.dpr, 3.0);
        assert_eq!(vp.canvas_width, 301);
    }

    #[test]
    fn mobile_rejects_zero_area() {
        let err = Viewport::compute(Mode::Mobile, &ViewportMetrics::new(0.0, 800.0, 1.0)).unwrap_err();
        assert!(matches!(err, ViewportError::MissingMetrics { .. }));
        assert!(Viewport::compute(Mode::Mobile, &ViewportMetrics::new(400.0, f64::INFINITY, 1.0)).is_err());
    }

    #[test]
    fn recompute_is_idempotent() {
        let m = ViewportMetrics::new(414.0, 896.0, 2.0);
        let a = Viewport::compute(Mode::Mobile, &m).unwrap();
        let b = Viewport::compute(Mode::Mobile, &m).unwrap();
        assert_eq!(a, b);
    }
}
