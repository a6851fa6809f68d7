// Canvas renderer. Pure consumer of `Snapshot`; never mutates game state.

use std::f64::consts::TAU;

use web_sys::CanvasRenderingContext2d;

use super::mode::Mode;
use super::{Phase, Snapshot};

const SKY: &str = "#bfe9ff";
const GROUND: &str = "#9bd66b";
const GROUND_HATCH: &str = "rgba(0,0,0,.06)";
const CLOUD: &str = "rgba(255,255,255,.9)";
const CAPY: &str = "#b88b5c";
const STICK: &str = "#c79c55";
const HIGHLIGHT: &str = "rgba(255,255,255,.5)";
const TEXT: &str = "#1f2a37";
pub const POP_COLORS: [&str; 5] = ["#ff6b6b", "#ffd93d", "#6bcb77", "#4d96ff", "#a78bfa"];

const CLOUD_COUNT: usize = 6;
const CLOUD_SPACING: f64 = 240.0;
/// Parallax factors relative to the scroll speed.
const CLOUD_PARALLAX: f64 = 0.18;
const HATCH_PARALLAX: f64 = 0.06;

/// Stable colour per pop derived from its position, so a pop keeps its colour
/// for a while and neighbours differ.
pub fn pop_color(x: f64) -> &'static str {
    let idx = (x / 37.0).floor().rem_euclid(POP_COLORS.len() as f64) as usize;
    POP_COLORS[idx.min(POP_COLORS.len() - 1)]
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cloud {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Cloud `i` at elapsed time `t`. Clouds wrap around a strip one spacing wider
/// than the view.
pub fn cloud_at(i: usize, t: f64, speed: f64, scale: f64, view_width: f64) -> Cloud {
    let strip = view_width + CLOUD_SPACING * scale;
    let drift = (t * speed * CLOUD_PARALLAX).rem_euclid(strip);
    Cloud {
        x: i as f64 * CLOUD_SPACING * scale - drift - 80.0 * scale,
        y: 40.0 * scale + (i % 3) as f64 * 25.0 * scale,
        w: 80.0 * scale + (i % 2) as f64 * 30.0 * scale,
        h: 30.0 * scale + (i % 2) as f64 * 10.0 * scale,
    }
}

/// Horizontal offset of the ground hatching pattern.
pub fn hatch_offset(t: f64, speed: f64, step: f64) -> f64 {
    if step <= 0.0 { 0.0 } else { (t * speed * HATCH_PARALLAX).rem_euclid(step) }
}

pub fn render(ctx: &CanvasRenderingContext2d, snap: &Snapshot<'_>) {
    let vp = snap.viewport;
    let (w, h, s) = (vp.view_width, vp.view_height, vp.scale);

    ctx.clear_rect(0.0, 0.0, w, h);
    ctx.set_fill_style_str(SKY);
    ctx.fill_rect(0.0, 0.0, w, h);

    draw_clouds(ctx, snap);
    draw_ground(ctx, snap);

    let p = snap.player;
    ctx.set_fill_style_str(CAPY);
    ctx.fill_rect(p.x, p.y, p.w, p.h);

    for o in snap.obstacles {
        draw_pop(ctx, o.x, o.y, o.w, o.h, s);
    }

    ctx.set_fill_style_str(TEXT);
    ctx.set_text_align("left");
    ctx.set_font(&format!("bold {}px system-ui, sans-serif", (18.0 * s.max(0.8)).round()));
    ctx.fill_text(&hud_text(snap), 12.0, 28.0 * s.max(0.8)).ok();

    match snap.phase {
        Phase::Idle => banner(ctx, w, h, s, "Capy Run", &start_hint(snap)),
        Phase::GameOver => banner(
            ctx,
            w,
            h,
            s,
            "Game Over",
            &format!("Score {} • Best {} · {}", snap.score, snap.best, start_hint(snap)),
        ),
        Phase::Suspended => banner(ctx, w, h, s, "Paused", &start_hint(snap)),
        Phase::Running => {}
    }
}

/// Top-left status line.
pub fn hud_text(snap: &Snapshot<'_>) -> String {
    if snap.muted { format!("Score: {}  (muted)", snap.score) } else { format!("Score: {}", snap.score) }
}

fn start_hint(snap: &Snapshot<'_>) -> String {
    match snap.mode {
        Mode::Mobile => "Tap to play".to_string(),
        Mode::Desktop => "Press Space to play".to_string(),
    }
}

fn banner(ctx: &CanvasRenderingContext2d, w: f64, h: f64, s: f64, title: &str, sub: &str) {
    ctx.set_fill_style_str("rgba(0,0,0,.35)");
    ctx.fill_rect(0.0, 0.0, w, h);
    ctx.set_fill_style_str("#fff");
    ctx.set_text_align("center");
    ctx.set_font(&format!("bold {}px system-ui, sans-serif", (34.0 * s.max(0.7)).round()));
    ctx.fill_text(title, w / 2.0, h / 2.0 - 10.0 * s).ok();
    ctx.set_font(&format!("{}px system-ui, sans-serif", (16.0 * s.max(0.8)).round()));
    ctx.fill_text(sub, w / 2.0, h / 2.0 + 22.0 * s).ok();
}

fn draw_clouds(ctx: &CanvasRenderingContext2d, snap: &Snapshot<'_>) {
    let vp = snap.viewport;
    let s = vp.scale;
    ctx.save();
    ctx.set_global_alpha(0.7);
    ctx.set_fill_style_str(CLOUD);
    for i in 0..CLOUD_COUNT {
        let c = cloud_at(i, snap.elapsed, snap.speed, s, vp.view_width);
        ctx.begin_path();
        ctx.ellipse(c.x, c.y, c.w * 0.6, c.h, 0.0, 0.0, TAU).ok();
        ctx.ellipse(c.x + c.w * 0.3, c.y - 8.0 * s, c.w * 0.4, c.h * 1.1, 0.0, 0.0, TAU).ok();
        ctx.ellipse(c.x - c.w * 0.2, c.y - 6.0 * s, c.w * 0.35, c.h * 0.9, 0.0, 0.0, TAU).ok();
        ctx.fill();
    }
    ctx.restore();
}

fn draw_ground(ctx: &CanvasRenderingContext2d, snap: &Snapshot<'_>) {
    let vp = snap.viewport;
    let (g, s) = (vp.ground_y, vp.scale);
    ctx.set_fill_style_str(GROUND);
    ctx.fill_rect(0.0, g, vp.view_width, vp.view_height - g);

    let step = 20.0 * s;
    if step <= 0.0 {
        return;
    }
    let off = hatch_offset(snap.elapsed, snap.speed, step);
    ctx.set_stroke_style_str(GROUND_HATCH);
    ctx.set_line_width(1.0);
    let mut x = 0.0;
    while x < vp.view_width {
        ctx.begin_path();
        ctx.move_to(x - off, g);
        ctx.line_to(x - off + 10.0 * s, g - 4.0 * s);
        ctx.stroke();
        x += step;
    }
}

fn draw_pop(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, s: f64) {
    ctx.set_fill_style_str(STICK);
    round_rect(ctx, x + w * 0.4, y + h * 0.9, w * 0.2, h * 0.5, 6.0 * s);
    ctx.fill();
    ctx.set_fill_style_str(pop_color(x));
    round_rect(ctx, x, y, w, h, 12.0 * s);
    ctx.fill();
    ctx.set_fill_style_str(HIGHLIGHT);
    round_rect(ctx, x + w * 0.1, y + h * 0.1, w * 0.12, h * 0.5, 6.0 * s);
    ctx.fill();
}

fn round_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.arc_to(x + w, y, x + w, y + h, r).ok();
    ctx.arc_to(x + w, y + h, x, y + h, r).ok();
    ctx.arc_to(x, y + h, x, y, r).ok();
    ctx.arc_to(x, y, x + w, y, r).ok();
    ctx.close_path();
}
