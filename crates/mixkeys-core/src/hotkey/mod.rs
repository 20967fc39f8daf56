mod binding;
mod capture;
mod key_combination;
mod manager;

pub use {
    binding::{BindingState, HOTKEY_VOLUME_STEP, HotkeyAction, HotkeyBinding, HotkeyTriple},
    capture::{KeyCapture, capture_hotkeys},
    key_combination::KeyCombination,
    manager::{HotkeyBindingManager, HotkeyHook, RescanPlan, bindings_for, dispatch_hotkey},
};
