//! Synchronous key-value storage backends.
//!
//! The event store never caches; whatever backend it is handed is the source
//! of truth. `MemoryStorage` backs tests and embedders, `FileStorage` keeps one
//! file per key under a data directory.

use crate::store::StoreError;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;

/// Default upper bound for a single stored value (10MB)
pub const DEFAULT_MAX_VALUE_BYTES: u64 = 10 * 1024 * 1024;

const VALUE_EXTENSION: &str = "json";

/// A string-keyed, string-valued store with browser-storage semantics.
pub trait KeyValueStore {
    /// Returns the raw text stored under `key`, or `None` if the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replaces whatever is stored under `key`.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove_item(&mut self, key: &str) -> Result<(), StoreError>;

    /// Removes every key.
    fn clear(&mut self) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        self.items.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.items.clear();
        Ok(())
    }
}

/// Directory-backed storage: each key lives in `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    max_value_bytes: u64,
}

impl FileStorage {
    /// Opens (and creates if needed) a storage directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::with_limit(dir, DEFAULT_MAX_VALUE_BYTES)
    }

    pub fn with_limit(dir: impl Into<PathBuf>, max_value_bytes: u64) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!("Opened file storage at {}", dir.display());
        Ok(Self { dir, max_value_bytes })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", encode_key(key), VALUE_EXTENSION))
    }

    fn check_size(&self, key: &str, size: u64) -> Result<(), StoreError> {
        if size > self.max_value_bytes {
            warn!("Value for key '{}' is {} bytes, over the {} byte limit", key, size, self.max_value_bytes);
            return Err(StoreError::TooLarge {
                key: key.to_string(),
                size,
                limit: self.max_value_bytes,
            });
        }
        Ok(())
    }
}

impl KeyValueStore for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        // Check file size before reading it into memory
        let metadata = fs::metadata(&path)?;
        self.check_size(key, metadata.len())?;

        let mut content = String::with_capacity(metadata.len() as usize);
        File::open(&path)?.read_to_string(&mut content)?;
        Ok(Some(content))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_size(key, value.len() as u64)?;

        let path = self.path_for(key);
        let file = OpenOptions::new().write(true).create(true).truncate(true).open(&path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(value.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == VALUE_EXTENSION) {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

/// Maps an arbitrary key to a safe file stem. ASCII alphanumerics and `-`
/// pass through, every other byte becomes `_XX`.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("_{:02X}", byte));
        }
    }
    encoded
}
