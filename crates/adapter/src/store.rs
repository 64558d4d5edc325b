//! JSON file score store
//!
//! The file holds a flat object of integer values, e.g.
//! `{"game.leaderscore": 1024}`. A missing file reads as empty; every
//! `set` rewrites the whole file.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tui_2048_core::{ScoreStore, StoreError};

#[derive(Debug, Clone)]
pub struct FileScoreStore {
    path: PathBuf,
    values: BTreeMap<String, u64>,
}

impl FileScoreStore {
    /// Load `path`, treating a missing or empty file as an empty store
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| StoreError::Format(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(&self.values)
            .map_err(|e| StoreError::Format(e.to_string()))?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }
}

impl ScoreStore for FileScoreStore {
    fn get(&self, key: &str) -> Option<u64> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: u64) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        self.persist()
    }
}
