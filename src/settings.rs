//! Player preferences
//!
//! Persisted as one JSON document, separate from high scores.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::platform::{KeyValueStore, load_json, save_json};
use crate::sim::Character;

/// Canvas scale bounds
pub const MIN_CANVAS_SCALE: f32 = 0.5;
pub const MAX_CANVAS_SCALE: f32 = 3.0;

/// Remembered between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Index into `Character::ALL`
    pub last_character_index: usize,
    pub last_player_name: String,
    pub highest_level: u32,
    /// Display scale of the canvas
    pub canvas_scale: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_character_index: 0,
            last_player_name: String::new(),
            highest_level: 1,
            canvas_scale: 1.0,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "cave_runner_settings";

    pub fn character(&self) -> Character {
        Character::from_index(self.last_character_index)
    }

    /// Clamp values that might have been hand-edited in storage
    pub fn sanitized(mut self) -> Self {
        self.last_character_index %= Character::ALL.len();
        self.highest_level = self.highest_level.max(1);
        self.canvas_scale = if self.canvas_scale.is_finite() {
            self.canvas_scale.clamp(MIN_CANVAS_SCALE, MAX_CANVAS_SCALE)
        } else {
            1.0
        };
        self
    }

    /// Load from the store. Missing data is not an error; corrupt data is.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StorageError> {
        let settings = load_json::<Settings>(store, Self::STORAGE_KEY)?;
        match settings {
            Some(s) => {
                log::info!("Loaded settings");
                Ok(s.sanitized())
            }
            None => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
        }
    }

    /// Load, falling back to defaults on any storage failure
    pub fn load_or_default(store: &dyn KeyValueStore) -> Self {
        Self::load(store).unwrap_or_else(|e| {
            log::warn!("Failed to load settings: {}", e);
            Self::default()
        })
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, Self::STORAGE_KEY, self)?;
        log::debug!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_missing_settings_default() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store).unwrap(), Settings::default());
    }

    #[test]
    fn test_settings_persist() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            last_character_index: 3,
            last_player_name: "Ada".into(),
            highest_level: 4,
            canvas_scale: 1.5,
        };
        settings.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store).unwrap(), settings);
        assert_eq!(settings.character(), Character::Ninja);
    }

    #[test]
    fn test_partial_json_and_sanitize() {
        let mut store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, r#"{"canvasScale": 40.0, "lastCharacterIndex": 12}"#)
            .unwrap();
        let s = Settings::load(&store).unwrap();
        assert_eq!(s.canvas_scale, MAX_CANVAS_SCALE);
        assert_eq!(s.last_character_index, 2);
        assert_eq!(s.highest_level, 1);
    }

    #[test]
    fn test_corrupt_settings_fall_back() {
        let mut store = MemoryStore::new();
        store.set(Settings::STORAGE_KEY, "][").unwrap();
        assert!(Settings::load(&store).is_err());
        assert_eq!(Settings::load_or_default(&store), Settings::default());
    }
}
