// Browser tests; run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use capy_run::game::audio::{Audio, Beep, WebAudio};
use capy_run::game::storage::{LocalStorageModeStore, ModeStore, MODE_KEY};
use capy_run::Mode;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn launch_creates_canvas() {
    capy_run::start_game().expect("start_game");
    let doc = web_sys::window().unwrap().document().unwrap();
    let canvas = doc.get_element_by_id(capy_run::game::web::CANVAS_ID).expect("canvas");
    assert_eq!(canvas.tag_name().to_lowercase(), "canvas");
    // second call is a no-op
    capy_run::start_game().expect("start_game again");
}

#[wasm_bindgen_test]
fn local_storage_round_trips_mode() {
    let mut store = LocalStorageModeStore;
    store.save(Mode::Mobile);
    assert_eq!(store.load(), Some(Mode::Mobile));
    let raw = web_sys::window().unwrap().local_storage().unwrap().unwrap().get_item(MODE_KEY).unwrap();
    assert_eq!(raw.as_deref(), Some("mobile"));
    store.save(Mode::Desktop);
    assert_eq!(store.load(), Some(Mode::Desktop));
}

#[wasm_bindgen_test]
fn touchmove_default_is_prevented() {
    capy_run::start_game().expect("start_game");
    let win = web_sys::window().unwrap();
    let init = web_sys::EventInit::new();
    init.set_cancelable(true);
    let ev = web_sys::Event::new_with_event_init_dict("touchmove", &init).unwrap();
    win.dispatch_event(&ev).unwrap();
    assert!(ev.default_prevented());
}

#[wasm_bindgen_test]
fn repeated_unlock_resumes_quietly() {
    let mut audio = WebAudio::new();
    audio.unlock();
    // second unlock goes through the resume path of the existing context
    audio.unlock();
    audio.set_mute(true);
    audio.beep(Beep::Jump);
    audio.stop();
}
