use serde::{Deserialize, Serialize};
use super::keyboard_shortcuts::KeyboardShortcuts;
use crate::constants::{
    DEFAULT_GRID_SIZE, DEFAULT_NUDGE_STEP, DEFAULT_PAN_STEP, DEFAULT_PARALLEL_LINE_GAP, DEFAULT_UNDO_LEVELS,
    FINE_GRID_SIZE,
};

/// User settings that persist across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub keyboard_shortcuts: KeyboardShortcuts,
    /// Stay in a placement/line tool after using it
    pub keep_last_tool: bool,
    pub grid_size: f64,
    /// Grid used while Alt is held
    pub fine_grid_size: f64,
    pub nudge_step: f64,
    pub pan_step: f64,
    pub parallel_line_gap: f64,
    /// Put newly drawn lines into their parallel bundle automatically
    pub auto_parallel: bool,
    pub undo_levels: usize,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            keyboard_shortcuts: KeyboardShortcuts::default(),
            keep_last_tool: false,
            grid_size: DEFAULT_GRID_SIZE,
            fine_grid_size: FINE_GRID_SIZE,
            nudge_step: DEFAULT_NUDGE_STEP,
            pan_step: DEFAULT_PAN_STEP,
            parallel_line_gap: DEFAULT_PARALLEL_LINE_GAP,
            auto_parallel: false,
            undo_levels: DEFAULT_UNDO_LEVELS,
        }
    }
}

impl UserSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings saved by [`UserSettings::to_json`]
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid settings object
    pub fn from_json(json: &str) -> Result<Self, String> {
        let mut settings: Self = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse settings: {e}"))?;

        // Merge in any new shortcuts that were added since the settings were last saved
        settings.keyboard_shortcuts.merge_with_defaults();

        Ok(settings)
    }

    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| format!("Failed to serialize settings: {e}"))
    }

    /// Grid for snapping, fine or normal
    #[must_use]
    pub fn snap_grid(&self, fine: bool) -> f64 {
        if fine {
            self.fine_grid_size
        } else {
            self.grid_size
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl UserSettings {
    fn local_storage() -> Result<web_sys::Storage, String> {
        web_sys::window()
            .ok_or("No window")?
            .local_storage()
            .map_err(|_| "Local storage unavailable".to_string())?
            .ok_or_else(|| "Local storage unavailable".to_string())
    }

    /// Load user settings from `localStorage`, falling back to defaults when none were saved
    ///
    /// # Errors
    ///
    /// Returns an error if storage is unavailable or the saved settings do not parse
    pub fn load() -> Result<Self, String> {
        let storage = Self::local_storage()?;
        let saved = storage
            .get_item(crate::constants::USER_SETTINGS_STORAGE_KEY)
            .map_err(|_| "Failed to read settings".to_string())?;

        match saved {
            Some(json) => Self::from_json(&json),
            None => Ok(Self::default()),
        }
    }

    /// Save user settings to `localStorage`
    ///
    /// # Errors
    ///
    /// Returns an error if storage is unavailable or the write fails
    pub fn save(&self) -> Result<(), String> {
        let json = self.to_json()?;
        Self::local_storage()?
            .set_item(crate::constants::USER_SETTINGS_STORAGE_KEY, &json)
            .map_err(|_| "Failed to save settings".to_string())
    }
}
