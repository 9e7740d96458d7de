//! Input manager for reading resumes from disk

use crate::error::{Result, SkillMatchError};
use log::debug;
use std::path::Path;
use tokio::fs;

#[derive(Debug, Clone, Default)]
pub struct InputManager;

impl InputManager {
    pub fn new() -> Self {
        Self
    }

    /// Read a file and return its raw bytes plus the name used to pick a decoder.
    pub async fn read_bytes(&self, path: &Path) -> Result<(Vec<u8>, String)> {
        if !path.exists() {
            return Err(SkillMatchError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let bytes = fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        debug!("Read {} bytes from {}", bytes.len(), path.display());

        Ok((bytes, filename))
    }
}
