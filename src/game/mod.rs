//! Endless-runner core: the loop controller and the state it owns.
//!
//! [`Game`] is the single writer for everything gameplay-related. Browser
//! callbacks never touch it directly; they queue [`GameEvent`]s which are
//! drained at the top of the next [`Game::frame`]. A frame sanitizes the delta
//! time, ramps the speed, runs the spawner, integrates physics, resolves at
//! most one collision and reports whether another frame should be scheduled.
//!
//! Phase transitions:
//!
//! ```text
//! Idle ──start──▶ Running ──collision──▶ GameOver ──start──▶ Running …
//!                    │  ▲
//!          hidden tab│  │start (resumes, no reset)
//!                    ▼  │
//!                 Suspended
//! ```
//!
//! A mode switch resets to `Idle` from any phase.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand::rngs::StdRng;

pub mod audio;
pub mod config;
pub mod entities;
pub mod mode;
pub mod physics;
pub mod render;
pub mod spawner;
pub mod speed;
pub mod storage;
pub mod viewport;
pub mod web;

use audio::{Audio, Beep, SilentAudio};
use config::Tuning;
use entities::{Obstacle, Player};
use mode::Mode;
use physics::PlayerStep;
use spawner::Spawner;
use speed::SpeedRamp;
use storage::{MemoryModeStore, ModeStore};
use viewport::{Viewport, ViewportMetrics};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Before the first start, or after a mode switch.
    Idle,
    Running,
    GameOver,
    /// Stopped because the page was hidden; no game-over card, `start` resumes.
    Suspended,
}

/// Things that happen outside a tick and are applied at the start of the next one.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Resize(ViewportMetrics),
    ToggleMode,
    VisibilityHidden,
    ToggleMute,
}

/// Input sampled once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    /// Jump key or pointer currently held.
    pub jump_held: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameOutcome {
    /// Whether the caller should request another animation frame.
    pub reschedule: bool,
    /// Delta actually simulated (0 when the frame was skipped).
    pub dt: f64,
    pub jumped: bool,
    pub collided: bool,
}

/// Read-only view handed to the renderer each frame.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub viewport: &'a Viewport,
    pub player: &'a Player,
    pub obstacles: &'a [Obstacle],
    pub phase: Phase,
    pub mode: Mode,
    pub score: u64,
    pub best: u64,
    pub elapsed: f64,
    pub speed: f64,
    pub muted: bool,
}

/// Builder for [`Game`]; the defaults are silent audio, an empty in-memory
/// mode store and an entropy-seeded RNG.
pub struct GameBuilder {
    metrics: ViewportMetrics,
    tuning: Tuning,
    seed: Option<u64>,
    audio: Box<dyn Audio>,
    store: Box<dyn ModeStore>,
}

impl GameBuilder {
    pub fn new(metrics: ViewportMetrics) -> Self {
        Self {
            metrics,
            tuning: Tuning::default(),
            seed: None,
            audio: Box::new(SilentAudio),
            store: Box::new(MemoryModeStore::new()),
        }
    }

    pub fn tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn audio(mut self, audio: Box<dyn Audio>) -> Self {
        self.audio = audio;
        self
    }

    pub fn store(mut self, store: Box<dyn ModeStore>) -> Self {
        self.store = store;
        self
    }

    pub fn build(self) -> Game {
        let preferred = self
            .store
            .load()
            .unwrap_or_else(|| Mode::auto_detect(self.metrics.css_width, self.metrics.css_height));
        let (mode, viewport, pending_mode) = match Viewport::compute(preferred, &self.metrics) {
            Ok(vp) => (preferred, vp, None),
            Err(e) => {
                log::warn!("{e}; starting in desktop layout");
                let vp = Viewport::desktop(viewport::clamp_dpr(self.metrics.device_pixel_ratio));
                (Mode::Desktop, vp, Some(preferred))
            }
        };
        let rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let cfg = mode.config();
        let mut game = Game {
            ramp: SpeedRamp::new(cfg, &self.tuning),
            speed: cfg.start_speed,
            player: Player::grounded(0.0, 0.0, viewport.ground_y),
            tuning: self.tuning,
            mode,
            viewport,
            metrics: self.metrics,
            pending_mode,
            obstacles: Vec::new(),
            spawner: Spawner::new(),
            phase: Phase::Idle,
            t: 0.0,
            score: 0,
            score_carry: 0.0,
            best: 0,
            last_ts: 0.0,
            muted: false,
            events: VecDeque::new(),
            rng,
            audio: self.audio,
            store: self.store,
        };
        game.reset();
        log::info!("game ready in {} mode", mode.as_str());
        game
    }
}

pub struct Game {
    tuning: Tuning,
    mode: Mode,
    viewport: Viewport,
    /// Last metrics received, used when a mode switch needs fresh geometry.
    metrics: ViewportMetrics,
    /// Mode switch waiting for usable metrics.
    pending_mode: Option<Mode>,
    player: Player,
    obstacles: Vec<Obstacle>,
    spawner: Spawner,
    ramp: SpeedRamp,
    phase: Phase,
    t: f64,
    score: u64,
    /// Fractional points not yet credited.
    score_carry: f64,
    speed: f64,
    best: u64,
    last_ts: f64,
    muted: bool,
    events: VecDeque<GameEvent>,
    rng: StdRng,
    audio: Box<dyn Audio>,
    store: Box<dyn ModeStore>,
}

impl Game {
    // --- Queries ---------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn elapsed(&self) -> f64 {
        self.t
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Jump impulse for the current viewport scale.
    pub fn jump_velocity(&self) -> f64 {
        self.tuning.jump_velocity(self.viewport.scale)
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            viewport: &self.viewport,
            player: &self.player,
            obstacles: &self.obstacles,
            phase: self.phase,
            mode: self.mode,
            score: self.score,
            best: self.best,
            elapsed: self.t,
            speed: self.speed,
            muted: self.muted,
        }
    }

    // --- Run state machine -----------------------------------------------------

    /// Begin a run (or resume a suspended one). Returns `true` when the caller
    /// has to schedule a frame because the loop was not running.
    pub fn start(&mut self, now_ms: f64) -> bool {
        match self.phase {
            Phase::Running => return false,
            Phase::Idle | Phase::GameOver => self.reset(),
            Phase::Suspended => {}
        }
        self.audio.unlock();
        self.audio.play(now_ms);
        self.phase = Phase::Running;
        if now_ms.is_finite() {
            self.last_ts = now_ms;
        }
        log::info!("run started ({} mode, score {})", self.mode.as_str(), self.score);
        true
    }

    /// Finish the current run: record the best score and silence the music.
    pub fn end(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.phase = Phase::GameOver;
        self.best = self.best.max(self.score);
        self.audio.stop();
        log::info!("game over: score {} best {}", self.score, self.best);
    }

    /// Stop without a game-over (page hidden). Keeps score and obstacles.
    pub fn suspend(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.phase = Phase::Suspended;
        self.audio.stop();
        log::info!("run suspended at score {}", self.score);
    }

    /// Clear the run and put a fresh player on the ground. Leaves the phase at `Idle`.
    pub fn reset(&mut self) {
        let cfg = self.mode.config();
        self.phase = Phase::Idle;
        self.t = 0.0;
        self.score = 0;
        self.score_carry = 0.0;
        self.spawner.reset();
        self.obstacles.clear();
        self.ramp = SpeedRamp::new(cfg, &self.tuning);
        self.speed = cfg.start_speed;
        self.place_player();
    }

    fn place_player(&mut self) {
        let cfg = self.mode.config();
        let x = cfg.player_anchor.resolve(self.viewport.view_width);
        let size = (cfg.player_size * self.viewport.scale).round();
        self.player = Player::grounded(x, size, self.viewport.ground_y);
    }

    // --- Mode & viewport -------------------------------------------------------

    /// Switch layouts. Geometry is recomputed and the run reset; when the
    /// current metrics cannot produce geometry the switch waits for the next
    /// usable resize. Manual switches are persisted.
    pub fn set_mode(&mut self, next: Mode, manual: bool) {
        if manual {
            self.store.save(next);
        }
        if next == self.mode {
            self.pending_mode = None;
            return;
        }
        match Viewport::compute(next, &self.metrics) {
            Ok(vp) => {
                if self.phase == Phase::Running {
                    self.audio.stop();
                }
                self.mode = next;
                self.viewport = vp;
                self.pending_mode = None;
                self.reset();
                log::info!("switched to {} mode (scale {:.3})", next.as_str(), self.viewport.scale);
            }
            Err(e) => {
                log::warn!("{e}; keeping {} layout until next resize", self.mode.as_str());
                self.pending_mode = Some(next);
            }
        }
    }

    pub fn toggle_mode(&mut self) {
        let next = self.pending_mode.unwrap_or(self.mode).toggled();
        self.set_mode(next, true);
    }

    /// New window metrics. Without a stored preference the mode follows the
    /// window size; otherwise only the geometry is refreshed.
    pub fn resize(&mut self, metrics: ViewportMetrics) {
        self.metrics = metrics;
        let mut target = self.pending_mode.unwrap_or(self.mode);
        if self.store.load().is_none() && metrics.css_width > 0.0 && metrics.css_height > 0.0 {
            target = Mode::auto_detect(metrics.css_width, metrics.css_height);
        }
        if target != self.mode {
            self.set_mode(target, false);
            return;
        }
        self.pending_mode = None;
        match Viewport::compute(self.mode, &metrics) {
            Ok(vp) => {
                if vp != self.viewport {
                    self.viewport = vp;
                    if self.phase != Phase::Running && self.phase != Phase::Suspended {
                        self.place_player();
                    }
                }
            }
            Err(e) => log::warn!("{e}; keeping last viewport"),
        }
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        self.audio.set_mute(self.muted);
    }

    // --- Events ----------------------------------------------------------------

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push_back(event);
    }

    /// Apply every queued event in arrival order.
    pub fn drain_events(&mut self) {
        while let Some(event) = self.events.pop_front() {
            match event {
                GameEvent::Resize(m) => self.resize(m),
                GameEvent::ToggleMode => self.toggle_mode(),
                GameEvent::VisibilityHidden => self.suspend(),
                GameEvent::ToggleMute => self.toggle_mute(),
            }
        }
    }

    // --- Tick ------------------------------------------------------------------

    /// One animation-frame callback. `now_ms` is the frame timestamp on the
    /// same clock that was passed to [`Game::start`].
    pub fn frame(&mut self, now_ms: f64, input: InputState) -> FrameOutcome {
        self.drain_events();
        let raw_dt = (now_ms - self.last_ts) / 1000.0;
        if now_ms.is_finite() {
            self.last_ts = now_ms;
        }
        self.audio.update(now_ms);

        let mut out = FrameOutcome::default();
        if self.phase != Phase::Running {
            return out;
        }
        let dt = physics::sanitize_dt(raw_dt, self.tuning.max_dt);
        if dt > 0.0 {
            self.update(dt, input, &mut out);
            out.dt = dt;
        }
        out.reschedule = self.phase == Phase::Running;
        out
    }

    fn update(&mut self, dt: f64, input: InputState, out: &mut FrameOutcome) {
        self.t += dt;
        self.score_carry += self.tuning.score_rate * dt;
        let whole = self.score_carry.floor();
        self.score += whole as u64;
        self.score_carry -= whole;

        self.speed = self.ramp.step(self.speed, self.t, dt);

        let cfg = self.mode.config();
        if let Some(o) = self.spawner.tick(dt, self.t, &self.viewport, cfg, &self.tuning, &mut self.rng) {
            self.obstacles.push(o);
        }

        let jump_velocity = self.jump_velocity();
        let step = physics::step_player(
            &mut self.player,
            dt,
            self.viewport.ground_y,
            input.jump_held,
            jump_velocity,
            &self.tuning,
        );
        if step == PlayerStep::Jumped {
            out.jumped = true;
            self.audio.beep(Beep::Jump);
        }

        physics::advance_obstacles(&mut self.obstacles, self.speed, dt);
        physics::despawn_obstacles(&mut self.obstacles, self.tuning.despawn_x);

        if physics::first_collision(&self.player, &self.obstacles, self.tuning.collision_inset).is_some() {
            out.collided = true;
            self.audio.beep(Beep::Crash);
            self.end();
        }
    }
}
