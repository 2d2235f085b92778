//! Host integration seams
//!
//! The core never talks to a windowing system directly. Window
//! visibility, app quit, the per-process screen-sharing visibility
//! toggle, and screenshot capture are opaque collaborators behind
//! [`PanelHost`]; the surrounding shell supplies the real implementation.
//! [`HeadlessHost`] is the shipped fallback: visible-by-default,
//! capture unsupported.

use anyhow::{bail, Result};
use parking_lot::Mutex;
use tracing::info;

/// Capabilities the surrounding shell provides to the core.
pub trait PanelHost: Send + Sync {
    /// Show the notes panel.
    fn show_panel(&self);

    /// Hide the notes panel.
    fn hide_panel(&self);

    /// Quit the application.
    fn quit(&self);

    /// Whether the panel window is visible to screen-sharing capture.
    fn screen_sharing_visible(&self) -> Result<bool>;

    /// Set whether the panel window is visible to screen-sharing capture.
    fn set_screen_sharing_visible(&self, visible: bool) -> Result<()>;

    /// Capture a screenshot, returned as base64 image data. Only the AI
    /// chat attachment path uses this.
    fn capture_screenshot(&self) -> Result<String>;
}

/// Host for environments without a windowing system.
///
/// Mirrors the behavior of the platform fallbacks: the window reports
/// visible to screen sharing, toggling it is accepted and remembered for
/// the process, and screenshot capture is unsupported.
pub struct HeadlessHost {
    screen_sharing_visible: Mutex<bool>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        HeadlessHost {
            screen_sharing_visible: Mutex::new(true),
        }
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelHost for HeadlessHost {
    fn show_panel(&self) {
        info!(event_type = "host", action = "show_panel", "Panel shown");
    }

    fn hide_panel(&self) {
        info!(event_type = "host", action = "hide_panel", "Panel hidden");
    }

    fn quit(&self) {
        info!(event_type = "host", action = "quit", "Quit requested");
    }

    fn screen_sharing_visible(&self) -> Result<bool> {
        Ok(*self.screen_sharing_visible.lock())
    }

    fn set_screen_sharing_visible(&self, visible: bool) -> Result<()> {
        *self.screen_sharing_visible.lock() = visible;
        info!(visible, "Screen-sharing visibility set");
        Ok(())
    }

    fn capture_screenshot(&self) -> Result<String> {
        bail!("Screenshot capture is not supported by this host")
    }
}

/// Flip the host's screen-sharing visibility, returning the new state.
pub fn toggle_screen_sharing_visibility(host: &dyn PanelHost) -> Result<bool> {
    let next = !host.screen_sharing_visible()?;
    host.set_screen_sharing_visible(next)?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_defaults_to_visible() {
        let host = HeadlessHost::new();
        assert!(host.screen_sharing_visible().unwrap());
    }

    #[test]
    fn test_toggle_round_trips() {
        let host = HeadlessHost::new();
        assert!(!toggle_screen_sharing_visibility(&host).unwrap());
        assert!(!host.screen_sharing_visible().unwrap());
        assert!(toggle_screen_sharing_visibility(&host).unwrap());
    }

    #[test]
    fn test_screenshot_unsupported() {
        let host = HeadlessHost::new();
        assert!(host.capture_screenshot().is_err());
    }
}
