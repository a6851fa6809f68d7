// Persistence of the player's manual desktop/mobile choice.

use std::cell::RefCell;
use std::rc::Rc;

use super::mode::Mode;

pub const MODE_KEY: &str = "capy_mode";

pub trait ModeStore {
    /// Stored preference, or `None` when absent, unreadable or unrecognised.
    fn load(&self) -> Option<Mode>;
    fn save(&mut self, mode: Mode);
}

/// In-memory store. Clones share the same slot so a test can keep a handle
/// while the game owns the other.
#[derive(Clone, Debug, Default)]
pub struct MemoryModeStore {
    slot: Rc<RefCell<Option<Mode>>>,
}

impl MemoryModeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mode: Mode) -> Self {
        Self { slot: Rc::new(RefCell::new(Some(mode))) }
    }
}

impl ModeStore for MemoryModeStore {
    fn load(&self) -> Option<Mode> {
        *self.slot.borrow()
    }

    fn save(&mut self, mode: Mode) {
        *self.slot.borrow_mut() = Some(mode);
    }
}

/// `window.localStorage` backed store. Private browsing or disabled storage
/// degrade to "no preference".
#[derive(Debug, Default)]
pub struct LocalStorageModeStore;

impl LocalStorageModeStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

impl ModeStore for LocalStorageModeStore {
    fn load(&self) -> Option<Mode> {
        let raw = Self::storage()?.get_item(MODE_KEY).ok().flatten()?;
        Mode::parse(&raw)
    }

    fn save(&mut self, mode: Mode) {
        let Some(storage) = Self::storage() else {
            log::warn!("localStorage unavailable, mode preference not saved");
            return;
        };
        if let Err(e) = storage.set_item(MODE_KEY, mode.as_str()) {
            log::warn!("failed to save mode preference: {:?}", e);
        }
    }
}
