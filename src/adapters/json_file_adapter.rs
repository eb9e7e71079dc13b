//! JSON file storage adapter.
//!
//! The file holds a JSON object; the layout record lives under the configured
//! key and every other top-level entry is preserved on write. Writes go to a
//! timestamped temp file which is synced and then renamed over the original.
//! A file or record that would not read back in full is copied aside before
//! it is replaced; if that copy fails the write is refused.

use crate::domain::error::TradeboardError;
use crate::domain::record::LayoutRecord;
use crate::ports::storage_port::LayoutStoragePort;
use chrono::Local;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_STORAGE_KEY: &str = "tradeboard.layouts";

pub struct JsonFileAdapter {
    path: PathBuf,
    key: String,
    pretty: bool,
}

impl JsonFileAdapter {
    pub fn new<P: AsRef<Path>>(path: P, key: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            key: key.to_string(),
            pretty: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Option<Map<String, Value>>, TradeboardError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(TradeboardError::Storage {
                    reason: format!("failed to read {}: {}", self.path.display(), e),
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(Some(map)),
            _ => Err(TradeboardError::Serialization {
                reason: format!("{} is not a JSON object", self.path.display()),
            }),
        }
    }

    fn write_atomic(&self, document: &Value) -> Result<(), TradeboardError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(document)?
        } else {
            serde_json::to_string(document)?
        };

        let temp_path = self.sibling("tmp");

        fs::write(&temp_path, json).map_err(|e| TradeboardError::Storage {
            reason: format!("failed to write {}: {}", temp_path.display(), e),
        })?;
        let file = fs::File::open(&temp_path)?;
        file.sync_all()?;

        fs::rename(&temp_path, &self.path).map_err(|e| TradeboardError::Storage {
            reason: format!(
                "failed to replace {} (safety copy at {}): {}",
                self.path.display(),
                temp_path.display(),
                e
            ),
        })
    }

    /// `<file>.<tag>.<timestamp>` next to the storage file.
    fn sibling(&self, tag: &str) -> PathBuf {
        let timestamp = Local::now().format("%Y%m%d-%H%M%S%.f").to_string();
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "layouts.json".to_string());
        self.path
            .with_file_name(format!("{}.{}.{}", file_name, tag, timestamp))
    }

    fn back_up(&self, reason: &str) -> Result<PathBuf, TradeboardError> {
        let backup = self.sibling("bak");
        fs::copy(&self.path, &backup).map_err(|e| TradeboardError::Storage {
            reason: format!(
                "not replacing unreadable {} ({}): copy to {} failed: {}",
                self.path.display(),
                reason,
                backup.display(),
                e
            ),
        })?;
        warn!(path = %backup.display(), reason, "kept a copy of unreadable layouts");
        Ok(backup)
    }
}

impl LayoutStoragePort for JsonFileAdapter {
    fn load(&self) -> Result<Option<LayoutRecord>, TradeboardError> {
        let Some(mut document) = self.read_document()? else {
            return Ok(None);
        };
        match document.remove(&self.key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    fn store(&self, record: &LayoutRecord) -> Result<(), TradeboardError> {
        let mut document = match self.read_document() {
            Ok(document) => document.unwrap_or_default(),
            Err(e) => {
                self.back_up(&e.to_string())?;
                Map::new()
            }
        };
        if let Some(reason) = document.get(&self.key).and_then(LayoutRecord::lossy_reason) {
            self.back_up(&reason)?;
        }
        document.insert(self.key.clone(), serde_json::to_value(record)?);
        self.write_atomic(&Value::Object(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn record(active: &str) -> LayoutRecord {
        LayoutRecord::new(active, BTreeMap::new())
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let adapter = JsonFileAdapter::new(dir.path().join("layouts.json"), DEFAULT_STORAGE_KEY);
        assert_eq!(adapter.load().unwrap(), None);
    }

    #[test]
    fn store_then_load() {
        let dir = TempDir::new().unwrap();
        let adapter = JsonFileAdapter::new(dir.path().join("layouts.json"), DEFAULT_STORAGE_KEY);
        adapter.store(&record("Scalping")).unwrap();
        assert_eq!(adapter.load().unwrap(), Some(record("Scalping")));
    }

    #[test]
    fn store_preserves_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, r#"{ "theme": "dark", "tradeboard.layouts": {"activeLayout": "Old"} }"#)
            .unwrap();
        let adapter = JsonFileAdapter::new(&path, DEFAULT_STORAGE_KEY);
        adapter.store(&record("New")).unwrap();

        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["theme"], "dark");
        assert_eq!(value[DEFAULT_STORAGE_KEY]["activeLayout"], "New");
    }

    #[test]
    fn other_key_is_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        let adapter = JsonFileAdapter::new(&path, "desk-a");
        adapter.store(&record("Default")).unwrap();
        let other = JsonFileAdapter::new(&path, "desk-b");
        assert_eq!(other.load().unwrap(), None);
    }

    #[test]
    fn malformed_file_is_a_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("layouts.json");
        fs::write(&path, "{ not json").unwrap();
        let adapter = JsonFileAdapter::new(&path, DEFAULT_STORAGE_KEY);
        assert!(matches!(
            adapter.load(),
            Err(TradeboardError::Serialization { .. })
        ));
    }

    fn backups(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| p.to_string_lossy().contains(".bak."))
            .collect()
    }

    #[test]
    fn malformed_file_is_copied_aside_before_replacing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("layouts.json");
        fs::write(&path, "{ not json").unwrap();
        let adapter = JsonFileAdapter::new(&path, DEFAULT_STORAGE_KEY);
        adapter.store(&record("Default")).unwrap();

        assert_eq!(adapter.load().unwrap(), Some(record("Default")));
        let backups = backups(dir.path());
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), "{ not json");
    }

    #[test]
    fn record_with_unreadable_layout_is_copied_aside() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("layouts.json");
        let stored = r#"{ "tradeboard.layouts": {
            "activeLayout": "Default",
            "layouts": { "Default": { "layouts": [] }, "Broken": { "layouts": 3 } }
        } }"#;
        fs::write(&path, stored).unwrap();
        let adapter = JsonFileAdapter::new(&path, DEFAULT_STORAGE_KEY);
        adapter.store(&record("Default")).unwrap();

        let backups = backups(dir.path());
        assert_eq!(backups.len(), 1);
        assert!(fs::read_to_string(&backups[0]).unwrap().contains("Broken"));

        // the replacement reads back in full, so later writes make no copies
        adapter.store(&record("Default")).unwrap();
        assert_eq!(self::backups(dir.path()).len(), 1);
    }

    #[test]
    fn readable_record_is_replaced_without_a_copy() {
        let dir = TempDir::new().unwrap();
        let adapter = JsonFileAdapter::new(dir.path().join("layouts.json"), DEFAULT_STORAGE_KEY);
        adapter.store(&record("Default")).unwrap();
        adapter.store(&record("Scalping")).unwrap();
        assert!(backups(dir.path()).is_empty());
    }

    #[test]
    fn leaves_no_temp_files_behind() {
        let dir = TempDir::new().unwrap();
        let adapter = JsonFileAdapter::new(dir.path().join("layouts.json"), DEFAULT_STORAGE_KEY)
            .with_pretty(false);
        adapter.store(&record("Default")).unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let adapter = JsonFileAdapter::new(
            dir.path().join("nope").join("layouts.json"),
            DEFAULT_STORAGE_KEY,
        );
        assert!(matches!(
            adapter.store(&record("Default")),
            Err(TradeboardError::Storage { .. })
        ));
    }
}
