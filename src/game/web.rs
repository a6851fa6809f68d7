//! Browser binding: canvas setup, DOM listeners and the animation-frame loop.
//!
//! The controller lives in a thread-local next to the canvas and the held-input
//! tracker. Listeners only queue events or flip input flags; the single rAF
//! chain is the one place a tick runs. `loop_active` guarantees at most one
//! chain is pending at any time.

use std::cell::RefCell;

use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent, PointerEvent, Window, window};

use super::audio::WebAudio;
use super::mode::Mode;
use super::storage::LocalStorageModeStore;
use super::viewport::{Viewport, ViewportMetrics};
use super::{Game, GameBuilder, GameEvent, InputState, render};

pub const CANVAS_ID: &str = "game";
const SCORE_ID: &str = "score";

#[derive(Debug, Error)]
pub enum GameError {
    #[error("no window")]
    NoWindow,
    #[error("no document")]
    NoDocument,
    #[error("canvas element unavailable")]
    NoCanvas,
    #[error("2d context unavailable")]
    NoContext,
    #[error("javascript error: {0}")]
    Js(String),
}

impl From<JsValue> for GameError {
    fn from(v: JsValue) -> Self {
        GameError::Js(v.as_string().unwrap_or_else(|| format!("{v:?}")))
    }
}

impl From<GameError> for JsValue {
    fn from(e: GameError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

/// Jump keys and pointer currently held.
#[derive(Debug, Default)]
struct HeldInput {
    space: bool,
    arrow_up: bool,
    pointer: bool,
}

impl HeldInput {
    fn state(&self) -> InputState {
        InputState { jump_held: self.space || self.arrow_up || self.pointer }
    }
}

struct Runner {
    game: Game,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    input: HeldInput,
    /// Geometry last pushed to the canvas element.
    applied: Option<Viewport>,
    loop_active: bool,
}

impl Runner {
    /// Resize the canvas backing store and CSS box when the geometry changed.
    fn sync_canvas(&mut self) {
        let vp = self.game.viewport();
        if self.applied.as_ref() == Some(vp) {
            return;
        }
        self.canvas.set_width(vp.canvas_width);
        self.canvas.set_height(vp.canvas_height);
        let style = self.canvas.style();
        style.set_property("width", vp.css.width).ok();
        style.set_property("height", vp.css.height).ok();
        self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).ok();
        self.ctx.scale(vp.dpr, vp.dpr).ok();
        if let Some(body) = window().and_then(|w| w.document()).and_then(|d| d.body()) {
            let classes = body.class_list();
            let mobile = vp.mode == Mode::Mobile;
            classes.toggle_with_force("mobile", mobile).ok();
            classes.toggle_with_force("desktop", !mobile).ok();
        }
        self.applied = Some(vp.clone());
    }

    fn draw(&mut self) {
        self.sync_canvas();
        render::render(&self.ctx, &self.game.snapshot());
        if let Some(el) = window().and_then(|w| w.document()).and_then(|d| d.get_element_by_id(SCORE_ID)) {
            el.set_text_content(Some(&format!("Score: {}", self.game.score())));
        }
    }

    /// Outside a running loop nothing drains the queue, so do it here and redraw.
    fn settle(&mut self) {
        if !self.loop_active {
            self.game.drain_events();
            self.draw();
        }
    }
}

thread_local! {
    static RUNNER: RefCell<Option<Runner>> = const { RefCell::new(None) };
    static FRAME: RefCell<Option<Closure<dyn FnMut(f64)>>> = const { RefCell::new(None) };
}

fn now_ms() -> f64 {
    window().and_then(|w| w.performance()).map(|p| p.now()).unwrap_or(0.0)
}

fn read_metrics(win: &Window) -> ViewportMetrics {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    ViewportMetrics::new(dim(win.inner_width()), dim(win.inner_height()), win.device_pixel_ratio())
}

fn request_frame() {
    FRAME.with(|f| {
        if let (Some(cb), Some(w)) = (f.borrow().as_ref(), window()) {
            if let Err(e) = w.request_animation_frame(cb.as_ref().unchecked_ref()) {
                log::warn!("requestAnimationFrame failed: {:?}", e);
            }
        }
    });
}

fn install_frame_callback() {
    let cb = Closure::wrap(Box::new(move |ts: f64| {
        let again = RUNNER.with(|cell| {
            let mut guard = cell.borrow_mut();
            let Some(r) = guard.as_mut() else { return false };
            let input = r.input.state();
            let outcome = r.game.frame(ts, input);
            r.draw();
            if !outcome.reschedule {
                r.loop_active = false;
            }
            outcome.reschedule
        });
        if again {
            request_frame();
        }
    }) as Box<dyn FnMut(f64)>);
    FRAME.with(|f| f.replace(Some(cb)));
}

/// Start (or resume) a run from a user gesture and make sure a frame is queued.
fn start_run() {
    let schedule = RUNNER.with(|cell| {
        let mut guard = cell.borrow_mut();
        let Some(r) = guard.as_mut() else { return false };
        if r.game.is_running() {
            return false;
        }
        r.game.drain_events();
        r.game.start(now_ms());
        if r.loop_active {
            return false;
        }
        r.loop_active = true;
        true
    });
    if schedule {
        request_frame();
    }
}

fn with_runner(f: impl FnOnce(&mut Runner)) {
    RUNNER.with(|cell| {
        if let Some(r) = cell.borrow_mut().as_mut() {
            f(r);
        }
    });
}

fn is_jump_key(code: &str) -> bool {
    code == "Space" || code == "ArrowUp"
}

fn canvas_and_context(doc: &Document) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), GameError> {
    let canvas: HtmlCanvasElement = match doc.get_element_by_id(CANVAS_ID) {
        Some(el) => el.dyn_into().map_err(|_| GameError::NoCanvas)?,
        None => {
            let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into().map_err(|_| GameError::NoCanvas)?;
            c.set_id(CANVAS_ID);
            doc.body().ok_or(GameError::NoDocument)?.append_child(&c)?;
            c
        }
    };
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or(GameError::NoContext)?
        .dyn_into()
        .map_err(|_| GameError::NoContext)?;
    Ok((canvas, ctx))
}

fn listen<E: wasm_bindgen::convert::FromWasmAbi + 'static>(
    target: &web_sys::EventTarget,
    event: &str,
    handler: impl FnMut(E) + 'static,
) -> Result<(), GameError> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Non-passive listener, so `prevent_default` is honoured (touch scrolling).
fn listen_active<E: wasm_bindgen::convert::FromWasmAbi + 'static>(
    target: &web_sys::EventTarget,
    event: &str,
    handler: impl FnMut(E) + 'static,
) -> Result<(), GameError> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    let opts = AddEventListenerOptions::new();
    opts.set_passive(false);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        closure.as_ref().unchecked_ref(),
        &opts,
    )?;
    closure.forget();
    Ok(())
}

fn install_listeners(win: &Window, doc: &Document, canvas: &HtmlCanvasElement) -> Result<(), GameError> {
    listen(win, "keydown", |e: KeyboardEvent| {
        let code = e.code();
        if is_jump_key(&code) {
            e.prevent_default();
            with_runner(|r| match code.as_str() {
                "Space" => r.input.space = true,
                _ => r.input.arrow_up = true,
            });
            start_run();
        } else if e.key().eq_ignore_ascii_case("m") {
            with_runner(|r| {
                r.game.push_event(GameEvent::ToggleMute);
                r.settle();
            });
        }
    })?;
    listen(win, "keyup", |e: KeyboardEvent| {
        let code = e.code();
        with_runner(|r| match code.as_str() {
            "Space" => r.input.space = false,
            "ArrowUp" => r.input.arrow_up = false,
            _ => {}
        });
    })?;
    listen(canvas, "pointerdown", |e: PointerEvent| {
        e.prevent_default();
        with_runner(|r| r.input.pointer = true);
        start_run();
    })?;
    listen(win, "pointerup", |_e: PointerEvent| {
        with_runner(|r| r.input.pointer = false);
    })?;
    listen(win, "pointercancel", |_e: PointerEvent| {
        with_runner(|r| r.input.pointer = false);
    })?;
    // keep the page from scrolling or bouncing under a dragging finger
    listen_active(win, "touchmove", |e: web_sys::Event| e.prevent_default())?;
    listen(win, "resize", |_e: web_sys::Event| {
        let Some(w) = window() else { return };
        let metrics = read_metrics(&w);
        with_runner(|r| {
            r.game.push_event(GameEvent::Resize(metrics));
            r.settle();
        });
    })?;
    let doc_for_visibility = doc.clone();
    listen(doc, "visibilitychange", move |_e: web_sys::Event| {
        if !doc_for_visibility.hidden() {
            return;
        }
        // no frames arrive while hidden, so apply right away
        with_runner(|r| {
            r.game.push_event(GameEvent::VisibilityHidden);
            r.game.drain_events();
        });
    })?;

    // Optional page chrome; absent buttons are simply not wired.
    if let Some(btn) = doc.get_element_by_id("btnStart") {
        listen(&btn, "click", |_e: web_sys::MouseEvent| start_run())?;
    }
    if let Some(btn) = doc.get_element_by_id("btnMute") {
        listen(&btn, "click", |_e: web_sys::MouseEvent| {
            with_runner(|r| {
                r.game.push_event(GameEvent::ToggleMute);
                r.settle();
            })
        })?;
    }
    if let Some(btn) = doc.get_element_by_id("btnToggle") {
        listen(&btn, "click", |_e: web_sys::MouseEvent| {
            let metrics = window().map(|w| read_metrics(&w));
            with_runner(|r| {
                if let Some(m) = metrics {
                    r.game.push_event(GameEvent::Resize(m));
                }
                r.game.push_event(GameEvent::ToggleMode);
                r.settle();
            })
        })?;
    }
    Ok(())
}

/// Build the game on the page's canvas, wire input and draw the idle screen.
/// Calling it again is a no-op.
pub fn launch() -> Result<(), GameError> {
    if RUNNER.with(|cell| cell.borrow().is_some()) {
        return Ok(());
    }
    let win = window().ok_or(GameError::NoWindow)?;
    let doc = win.document().ok_or(GameError::NoDocument)?;
    let (canvas, ctx) = canvas_and_context(&doc)?;

    let game = GameBuilder::new(read_metrics(&win))
        .audio(Box::new(WebAudio::new()))
        .store(Box::new(LocalStorageModeStore))
        .build();

    install_frame_callback();
    install_listeners(&win, &doc, &canvas)?;

    let mut runner = Runner { game, canvas, ctx, input: HeldInput::default(), applied: None, loop_active: false };
    runner.draw();
    RUNNER.with(|cell| cell.replace(Some(runner)));
    log::info!("capy run launched");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_input_any_source_jumps() {
        let mut h = HeldInput::default();
        assert!(!h.state().jump_held);
        h.pointer = true;
        assert!(h.state().jump_held);
        h.pointer = false;
        h.arrow_up = true;
        assert!(h.state().jump_held);
    }

    #[test]
    fn jump_keys() {
        assert!(is_jump_key("Space"));
        assert!(is_jump_key("ArrowUp"));
        assert!(!is_jump_key("KeyM"));
    }

    #[test]
    fn error_messages() {
        assert_eq!(GameError::NoCanvas.to_string(), "canvas element unavailable");
        assert_eq!(GameError::Js("boom".into()).to_string(), "javascript error: boom");
    }
}
