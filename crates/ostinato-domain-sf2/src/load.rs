use crate::error::FormatError;
use crate::model::Bank;
use crate::{hydra, riff};
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(String),
    #[error("format error: {0}")]
    Format(#[from] FormatError),
}

/// Reads and decodes one .sf2 file. The returned bank is complete or the
/// call fails; there is no partially decoded state.
pub fn load_sf2_path(path: &Path) -> Result<Bank, LoadError> {
    let data = std::fs::read(path).map_err(|e| LoadError::Io(e.to_string()))?;
    load_sf2_bytes(&data)
}

pub fn load_sf2_bytes(data: &[u8]) -> Result<Bank, LoadError> {
    let container = riff::read_container(data)?;
    Ok(hydra::decode_bank(data, &container)?)
}
