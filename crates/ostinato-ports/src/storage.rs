use crate::types::Volume01;
use serde::{Deserialize, Serialize};

fn default_preview_volume() -> Volume01 {
    Volume01::new(0.8)
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDto {
    pub last_bank_path: Option<String>,
    #[serde(default = "default_preview_volume")]
    pub preview_volume: Volume01,
}

impl Default for SettingsDto {
    fn default() -> Self {
        Self {
            last_bank_path: None,
            preview_volume: Volume01::new(0.8),
        }
    }
}

pub trait StoragePort: Send + Sync {
    fn load_settings(&self) -> Result<SettingsDto, StorageError>;
    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError>;
}
