use espressivo_domain_expression::PresetCatalog;
use espressivo_ports::note_map::NoteMapEntry;
use espressivo_ports::storage::{EngineSettings, NoteMapStore, SettingsStore, StorageError};
use espressivo_ports::types::NoteMapRef;
use std::fs;
use std::path::{Path, PathBuf};

const NOTE_MAP_SUFFIX: &str = ".note_map.json";

pub struct FsStorage {
    base_dir: PathBuf,
    note_map_dir: Option<PathBuf>,
}

impl FsStorage {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            note_map_dir: None,
        }
    }

    /// Stores note maps directly in `dir` instead of `<base>/note_maps`.
    pub fn with_note_map_dir(mut self, dir: PathBuf) -> Self {
        self.note_map_dir = Some(dir);
        self
    }

    /// Applies the note map override from `settings`, if any.
    pub fn configured(self, settings: &EngineSettings) -> Self {
        match settings.note_map_dir.as_ref() {
            Some(dir) => self.with_note_map_dir(PathBuf::from(dir)),
            None => self,
        }
    }

    pub fn default_base_dir() -> Result<PathBuf, StorageError> {
        let base = dirs_next::config_dir()
            .ok_or_else(|| StorageError::Io("config dir not found".to_string()))?;
        Ok(base.join("Espressivo"))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn note_map_dir(&self) -> PathBuf {
        self.note_map_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("note_maps"))
    }

    pub fn note_map_path(&self, key: &NoteMapRef) -> PathBuf {
        self.note_map_dir()
            .join(format!("{}{}", key.as_str(), NOTE_MAP_SUFFIX))
    }

    fn settings_path(&self) -> PathBuf {
        self.base_dir.join("settings.json")
    }

    /// Stored references, sorted.
    pub fn list_note_maps(&self) -> Result<Vec<NoteMapRef>, StorageError> {
        let dir = self.note_map_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut refs = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| StorageError::Io(e.to_string()))? {
            let entry = entry.map_err(|e| StorageError::Io(e.to_string()))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            match name.strip_suffix(NOTE_MAP_SUFFIX) {
                Some(stem) if !stem.is_empty() => refs.push(NoteMapRef(stem.to_string())),
                _ => log::warn!("skipping {:?} in note map directory", name),
            }
        }
        refs.sort();
        Ok(refs)
    }

    pub fn read_note_map_file(path: &Path) -> Result<Vec<NoteMapEntry>, StorageError> {
        Self::read_json(path)
    }

    pub fn write_note_map_file(path: &Path, entries: &[NoteMapEntry]) -> Result<(), StorageError> {
        Self::write_json(path, &entries)
    }

    pub fn load_preset_catalog(path: &Path) -> Result<PresetCatalog, StorageError> {
        Self::read_json(path)
    }

    /// The catalog named in `settings`, or the built-in one.
    pub fn preset_catalog(settings: &EngineSettings) -> Result<PresetCatalog, StorageError> {
        match settings.preset_catalog_path.as_ref() {
            Some(path) => Self::load_preset_catalog(Path::new(path)),
            None => Ok(PresetCatalog::builtin()),
        }
    }

    fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
        let data = fs::read(path).map_err(|e| StorageError::Io(e.to_string()))?;
        serde_json::from_slice(&data).map_err(|e| StorageError::Serde(e.to_string()))
    }

    fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        let data =
            serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serde(e.to_string()))?;
        fs::write(path, data).map_err(|e| StorageError::Io(e.to_string()))
    }
}

impl Default for FsStorage {
    fn default() -> Self {
        let base_dir = Self::default_base_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(base_dir)
    }
}

impl NoteMapStore for FsStorage {
    fn save_note_map(&self, key: &NoteMapRef, entries: &[NoteMapEntry]) -> Result<(), StorageError> {
        let path = self.note_map_path(key);
        log::debug!("writing note map {} to {}", key, path.display());
        Self::write_json(&path, entries)
    }

    fn load_note_map(&self, key: &NoteMapRef) -> Result<Option<Vec<NoteMapEntry>>, StorageError> {
        let path = self.note_map_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Self::read_json(&path).map(Some)
    }
}

impl SettingsStore for FsStorage {
    fn load_settings(&self) -> Result<EngineSettings, StorageError> {
        let path = self.settings_path();
        if !path.exists() {
            return Ok(EngineSettings::default());
        }
        Self::read_json(&path)
    }

    fn save_settings(&self, s: &EngineSettings) -> Result<(), StorageError> {
        let path = self.settings_path();
        Self::write_json(&path, s)
    }
}
