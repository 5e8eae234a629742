use crate::note_map::NoteMapEntry;
use crate::types::*;
use serde::{Deserialize, Serialize};

fn default_expression_controller() -> u8 {
    EXPRESSION_CONTROLLER
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    #[serde(default = "default_expression_controller")]
    pub expression_controller: u8,
    pub note_map_dir: Option<String>,
    pub preset_catalog_path: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            expression_controller: EXPRESSION_CONTROLLER,
            note_map_dir: None,
            preset_catalog_path: None,
        }
    }
}

pub trait NoteMapStore: Send + Sync {
    fn save_note_map(&self, key: &NoteMapRef, entries: &[NoteMapEntry])
        -> Result<(), StorageError>;

    /// `Ok(None)` when nothing was ever stored under `key`.
    fn load_note_map(&self, key: &NoteMapRef) -> Result<Option<Vec<NoteMapEntry>>, StorageError>;
}

pub trait SettingsStore: Send + Sync {
    fn load_settings(&self) -> Result<EngineSettings, StorageError>;
    fn save_settings(&self, s: &EngineSettings) -> Result<(), StorageError>;
}
