//! Persistent key-value store backed by one JSON file per key.
//!
//! The store mirrors the browser-storage semantics the app shell relies on:
//! loading falls back to a caller-supplied default on missing or corrupt
//! data, and saving reports failure without aborting the session.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CHARACTERS_KEY: &str = "characters";
pub const SELECTED_CHARACTER_KEY: &str = "selected_character";
pub const SETTINGS_KEY: &str = "settings";
pub const HISTORY_KEY: &str = "history";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Platform data directory for the app, `./magicpedia-data` as a fallback.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .map(|base| base.join("magicpedia"))
            .unwrap_or_else(|| PathBuf::from("magicpedia-data"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Load a value, falling back to `default` when the key is missing or
    /// the stored data cannot be parsed.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let path = self.path(key);
        if !path.exists() {
            return default;
        }
        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    log::error!("Failed to parse stored '{}': {}", key, e);
                    default
                }
            },
            Err(e) => {
                log::error!("Failed to read stored '{}': {}", key, e);
                default
            }
        }
    }

    /// Save a value. Returns `false` (after logging) on failure; a full disk
    /// must not take the session down.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_string_pretty(value) {
            Ok(raw) => match fs::write(self.path(key), raw) {
                Ok(()) => true,
                Err(e) => {
                    log::error!("Failed to save '{}': {}", key, e);
                    false
                }
            },
            Err(e) => {
                log::error!("Failed to serialize '{}': {}", key, e);
                false
            }
        }
    }

    /// Remove a key entirely. Missing keys are not an error.
    pub fn remove(&self, key: &str) -> bool {
        let path = self.path(key);
        if !path.exists() {
            return true;
        }
        match fs::remove_file(&path) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to remove '{}': {}", key, e);
                false
            }
        }
    }
}
