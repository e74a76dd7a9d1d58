//! Native HUD: there is no DOM, so progress and status go to the log and the
//! window title. The settings panel has no visual counterpart and is only logged.

use std::sync::Arc;

use winit::window::Window;

use super::{Hud, PanelState, loading_label};

const TITLE: &str = "Model Viewer";

pub struct NativeHud {
    window: Option<Arc<Window>>,
    // ten-percent bucket and text of the last logged progress line
    last_logged: Option<(u32, String)>,
}

impl NativeHud {
    pub fn new(window: Option<Arc<Window>>) -> Self {
        Self {
            window,
            last_logged: None,
        }
    }

    /// Text of the most recent progress line written to the log.
    pub fn last_logged(&self) -> Option<&str> {
        self.last_logged.as_ref().map(|(_, label)| label.as_str())
    }

    fn set_title(&self, status: &str) {
        if let Some(window) = &self.window {
            window.set_title(&format!("{TITLE} - {status}"));
        }
    }
}

impl Hud for NativeHud {
    fn set_progress(&mut self, percent: u32, label: &str) {
        // Chunks are small; plain progress is only logged every tenth percent
        let bucket = percent / 10;
        let new_bucket = self.last_logged.as_ref().map(|(b, _)| *b) != Some(bucket);
        if new_bucket || label != loading_label(percent) {
            log::info!("{label}");
            self.last_logged = Some((bucket, label.to_string()));
        }
        self.set_title(label);
    }

    fn set_status(&mut self, text: &str) {
        log::info!("{text}");
        self.set_title(text);
    }

    fn hide_progress(&mut self) {
        if let Some(window) = &self.window {
            window.set_title(TITLE);
        }
    }

    fn set_panel(&mut self, panel: &PanelState) {
        log::info!(
            "Settings panel {}",
            if panel.is_open() { "opened" } else { "closed" }
        );
    }
}
