// Integration tests (native) for the `capy-run` crate.
// These drive the public game API with synthetic timestamps; nothing here
// touches the DOM so they run under `cargo test` on the host.

use capy_run::game::entities::Aabb;
use capy_run::game::storage::{MemoryModeStore, ModeStore};
use capy_run::{GameBuilder, GameEvent, InputState, Mode, Phase, Tuning, ViewportMetrics};

const FRAME_MS: f64 = 1000.0 / 60.0;

fn quiet() -> Tuning {
    Tuning { spawn_margin: 1.0e9, ..Tuning::default() }
}

// Phone-sized viewport 420 css px tall: scale 0.7, below the jump floor.
#[test]
fn small_mobile_jump_uses_minimum_multiplier() {
    let metrics = ViewportMetrics::new(390.0, 420.0, 2.0);
    let mut g = GameBuilder::new(metrics).seed(1).tuning(quiet()).build();
    assert_eq!(g.mode(), Mode::Mobile);
    assert!(g.viewport().scale < 0.85);
    assert!(g.start(0.0));
    let out = g.frame(FRAME_MS, InputState { jump_held: true });
    assert!(out.jumped);
    assert!((g.player().vy - (-820.0 * 0.85)).abs() < 1e-9);
}

#[test]
fn ten_seconds_survival_scores_about_six_hundred() {
    let mut g = GameBuilder::new(ViewportMetrics::new(1280.0, 800.0, 1.0)).seed(2).tuning(quiet()).build();
    g.start(0.0);
    let mut now = 0.0;
    for _ in 0..600 {
        now += FRAME_MS;
        let out = g.frame(now, InputState::default());
        assert!(out.reschedule);
    }
    assert!((g.elapsed() - 10.0).abs() < 1e-6);
    let score = g.score() as i64;
    assert!((score - 600).abs() <= 2, "score {score}");
}

// Deltas a hair under 1/60 s must still credit points.
#[test]
fn short_frames_still_score() {
    let mut g = GameBuilder::new(ViewportMetrics::new(1280.0, 800.0, 1.0)).seed(2).tuning(quiet()).build();
    g.start(0.0);
    let mut now = 0.0;
    for _ in 0..600 {
        now += 16.5;
        g.frame(now, InputState::default());
    }
    let score = g.score() as i64;
    assert!((score - 594).abs() <= 1, "score {score}");
}

#[test]
fn score_and_speed_never_decrease_while_running() {
    let mut g = GameBuilder::new(ViewportMetrics::new(1280.0, 800.0, 1.0)).seed(11).build();
    g.start(0.0);
    let (mut score, mut speed) = (g.score(), g.speed());
    let mut now = 0.0;
    for i in 0..2000 {
        now += if i % 7 == 0 { 120.0 } else { 13.0 };
        g.frame(now, InputState { jump_held: i % 30 < 2 });
        assert!(g.score() >= score);
        assert!(g.speed() >= speed);
        assert!(g.speed() <= 360.0 + 600.0);
        score = g.score();
        speed = g.speed();
        if !g.is_running() {
            break;
        }
    }
}

#[test]
fn obstacles_scroll_off_and_are_dropped() {
    let mut g = GameBuilder::new(ViewportMetrics::new(1280.0, 800.0, 1.0)).seed(4).build();
    g.start(0.0);
    let mut now = 0.0;
    let mut seen = 0;
    // keep jumping so the run lasts; collisions still end it eventually
    for i in 0..3000 {
        now += FRAME_MS;
        g.frame(now, InputState { jump_held: i % 2 == 0 });
        seen = seen.max(g.obstacles().len());
        for o in g.obstacles() {
            assert!(o.x + o.w >= -20.0);
            assert!((o.y + o.h - g.viewport().ground_y).abs() < 1e-9);
        }
        if !g.is_running() {
            break;
        }
    }
    assert!(seen > 0);
}

#[test]
fn same_seed_same_run() {
    let run = |seed| {
        let mut g = GameBuilder::new(ViewportMetrics::new(1280.0, 800.0, 1.0)).seed(seed).build();
        g.start(0.0);
        let mut now = 0.0;
        while g.is_running() && now < 60_000.0 {
            now += FRAME_MS;
            g.frame(now, InputState::default());
        }
        (g.score(), g.obstacles().to_vec())
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn hidden_tab_then_mode_toggle_goes_idle() {
    let store = MemoryModeStore::new();
    let mut g = GameBuilder::new(ViewportMetrics::new(1280.0, 800.0, 1.0))
        .seed(3)
        .tuning(quiet())
        .store(Box::new(store.clone()))
        .build();
    g.start(0.0);
    g.frame(FRAME_MS, InputState::default());
    g.push_event(GameEvent::VisibilityHidden);
    g.drain_events();
    assert_eq!(g.phase(), Phase::Suspended);
    g.push_event(GameEvent::ToggleMode);
    g.drain_events();
    assert_eq!(g.phase(), Phase::Idle);
    assert_eq!(g.score(), 0);
    assert_eq!(store.load(), Some(Mode::Mobile));
}

#[test]
fn boxes_collide_on_overlap_only() {
    let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
    assert!(a.collides(&Aabb::new(5.0, 5.0, 10.0, 10.0), 6.0));
    assert!(!a.collides(&Aabb::new(20.0, 20.0, 5.0, 5.0), 6.0));
}
