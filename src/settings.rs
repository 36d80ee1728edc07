//! Player preferences
//!
//! Persisted in LocalStorage, separate from any run state. Run state itself
//! is ephemeral and never saved.

use serde::{Deserialize, Serialize};

/// When to show the on-screen touch buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TouchControlsMode {
    /// Show on coarse-pointer devices only (decided by the page's CSS)
    #[default]
    Auto,
    Shown,
    Hidden,
}

impl TouchControlsMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TouchControlsMode::Auto => "auto",
            TouchControlsMode::Shown => "shown",
            TouchControlsMode::Hidden => "hidden",
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// On-screen touch buttons
    pub touch_controls: TouchControlsMode,
    /// Show the live speed readout in the HUD
    pub show_speed: bool,
    /// Minimize motion cues (crouch squash, jump arc exaggeration)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            touch_controls: TouchControlsMode::Auto,
            show_speed: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "lane_dash_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_round_trip() {
        let settings = Settings {
            touch_controls: TouchControlsMode::Shown,
            show_speed: false,
            reduced_motion: true,
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.touch_controls, TouchControlsMode::Shown);
        assert!(!back.show_speed);
        assert!(back.reduced_motion);
    }
}
