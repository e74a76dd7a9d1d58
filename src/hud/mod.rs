//! The viewer's user-facing chrome: loading bar, status text and settings panel.
//!
//! On WASM: drives DOM elements of the host page via web-sys
//! On Native: logs and mirrors the status into the window title

/// Status text shown once the model is attached.
pub const LOADING_COMPLETE: &str = "Loading complete!";
/// Status text shown when the model could not be loaded.
pub const LOADING_FAILED: &str = "Error loading model.";

pub const PANEL_OPEN_CLASS: &str = "show";
pub const ICON_OPEN: &str = r#"<i class="fas fa-times"></i>"#;
pub const ICON_CLOSED: &str = r#"<i class="fas fa-cogs"></i>"#;

pub fn loading_label(percent: u32) -> String {
    format!("Loading... {percent}%")
}

/// Whether the settings panel is open. Starts closed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PanelState {
    open: bool,
}

impl PanelState {
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Markup of the settings button for the current state.
    pub fn icon(&self) -> &'static str {
        if self.open { ICON_OPEN } else { ICON_CLOSED }
    }
}

/// Platform specific rendering of the viewer's UI state.
pub trait Hud {
    /// Sets the bar to `percent` and the label underneath it to `label`.
    fn set_progress(&mut self, percent: u32, label: &str);

    /// Replaces the label without touching the bar.
    fn set_status(&mut self, text: &str);

    fn hide_progress(&mut self);

    fn set_panel(&mut self, panel: &PanelState);
}

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{WebHud, bind_controls};

#[cfg(not(target_arch = "wasm32"))]
mod native;

#[cfg(not(target_arch = "wasm32"))]
pub use native::NativeHud;
