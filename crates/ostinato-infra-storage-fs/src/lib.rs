use ostinato_ports::storage::{SettingsDto, StorageError, StoragePort};
use std::fs;
use std::path::PathBuf;

/// Settings persistence as pretty-printed JSON in the user config dir.
pub struct FsStorage {
    base_dir: PathBuf,
}

impl FsStorage {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_base_dir() -> Result<PathBuf, StorageError> {
        let base = dirs_next::config_dir()
            .ok_or_else(|| StorageError::Io("config dir not found".to_string()))?;
        Ok(base.join("Ostinato"))
    }

    pub fn settings_path(&self) -> PathBuf {
        self.base_dir.join("settings.json")
    }
}

impl Default for FsStorage {
    fn default() -> Self {
        let base_dir = Self::default_base_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { base_dir }
    }
}

impl StoragePort for FsStorage {
    fn load_settings(&self) -> Result<SettingsDto, StorageError> {
        let path = self.settings_path();
        if !path.exists() {
            // first run
            return Ok(SettingsDto::default());
        }
        let data = fs::read(&path).map_err(|e| StorageError::Io(e.to_string()))?;
        serde_json::from_slice(&data).map_err(|e| StorageError::Serde(e.to_string()))
    }

    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_dir).map_err(|e| StorageError::Io(e.to_string()))?;
        let data = serde_json::to_vec_pretty(s).map_err(|e| StorageError::Serde(e.to_string()))?;
        fs::write(self.settings_path(), data).map_err(|e| StorageError::Io(e.to_string()))
    }
}
