//! Capy Run core crate.
//!
//! The gameplay lives in [`game`] and is plain Rust, so it runs and tests
//! natively. Only [`game::web`] touches the DOM; `start_game()` is the single
//! entry point the page calls.

use wasm_bindgen::prelude::*;

pub mod game;

pub use game::config::Tuning;
pub use game::mode::Mode;
pub use game::viewport::{Viewport, ViewportMetrics};
pub use game::web::GameError;
pub use game::{FrameOutcome, Game, GameBuilder, GameEvent, InputState, Phase};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(target_arch = "wasm32")]
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("logger already set: {e}").into());
    }
}

#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    game::web::launch().map_err(JsValue::from)
}
