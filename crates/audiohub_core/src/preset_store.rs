//! Preset Archives
//!
//! A preset is a full snapshot of the registry saved to its own file,
//! independent of the driver configuration document.
//!
//! # Format
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "created_at": "2026-10-16T09:30:00Z",
//!   "engines": {
//!     "4F1C…": { "identifier": "4F1C…", "description": "Podcast", "channel_count": 2 }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{HubError, HubResult};
use crate::fs_util::write_atomic;
use crate::record::EngineRecord;
use crate::registry::EngineRegistry;

/// File extension used for preset archives
pub const PRESET_EXTENSION: &str = "preset";

const FORMAT_VERSION: u32 = 1;

/// Serialized form of a preset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetArchive {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    pub engines: BTreeMap<String, EngineRecord>,
}

impl PresetArchive {
    fn from_registry(registry: &EngineRegistry) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            engines: registry.snapshot(),
        }
    }

    /// Validate the archive and return its records
    fn into_records(self) -> Result<Vec<EngineRecord>, String> {
        if self.format_version != FORMAT_VERSION {
            return Err(format!("unsupported format version {}", self.format_version));
        }

        let mut records = Vec::with_capacity(self.engines.len());
        for (key, record) in self.engines {
            if key != record.identifier() {
                return Err(format!(
                    "entry {} holds engine {}",
                    key,
                    record.identifier()
                ));
            }
            record.validate().map_err(|e| format!("entry {}: {}", key, e))?;
            records.push(record);
        }
        Ok(records)
    }
}

/// Saves and restores whole-registry presets
#[derive(Debug, Clone, Default)]
pub struct PresetStore;

impl PresetStore {
    pub fn new() -> Self {
        Self
    }

    /// Write a snapshot of `registry` to `path`
    pub fn save(&self, registry: &EngineRegistry, path: &Path) -> HubResult<()> {
        let archive = PresetArchive::from_registry(registry);
        let json = serde_json::to_vec_pretty(&archive).map_err(|e| {
            HubError::write(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        write_atomic(path, &json)?;

        info!("Saved preset with {} engines to {:?}", archive.engines.len(), path);
        Ok(())
    }

    /// Read the archive at `path` without applying it
    pub fn read(&self, path: &Path) -> HubResult<PresetArchive> {
        let content = fs::read_to_string(path).map_err(|source| HubError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| HubError::CorruptArchive {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Replace the registry with the preset at `path`
    ///
    /// Returns the number of engines restored. The registry is untouched on
    /// error.
    pub fn load(&self, registry: &mut EngineRegistry, path: &Path) -> HubResult<usize> {
        let records = self
            .read(path)?
            .into_records()
            .map_err(|reason| HubError::CorruptArchive {
                path: path.to_path_buf(),
                reason,
            })?;

        let count = records.len();
        registry.replace_all(records)?;
        info!("Loaded preset with {} engines from {:?}", count, path);
        Ok(count)
    }

    /// Start over with an empty registry
    pub fn new_preset(&self, registry: &mut EngineRegistry) {
        registry.clear();
    }
}

/// The user's documents directory, where presets are offered by default
pub fn default_preset_dir() -> Option<PathBuf> {
    UserDirs::new().and_then(|dirs| dirs.document_dir().map(Path::to_path_buf))
}

/// Preset files in `dir`, sorted by path
pub fn list_presets(dir: &Path) -> HubResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| HubError::read(dir, e))?;

    let mut presets: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().map_or(false, |ext| ext == PRESET_EXTENSION)
        })
        .collect();
    presets.sort();
    Ok(presets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn registry_with(records: &[(&str, u32, &str)]) -> EngineRegistry {
        let mut registry = EngineRegistry::new();
        for (description, channels, identifier) in records {
            registry
                .add(
                    EngineRecord::create(
                        Some(description.to_string()),
                        Some(*channels),
                        Some(identifier.to_string()),
                    )
                    .unwrap(),
                )
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_preset_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("studio.preset");
        let registry =
            registry_with(&[("Podcast", 2, "p"), ("Stream", 8, "s"), ("podcast", 1, "q")]);

        let store = PresetStore::new();
        store.save(&registry, &path).unwrap();

        let mut restored = EngineRegistry::new();
        assert_eq!(store.load(&mut restored, &path).unwrap(), 3);
        assert_eq!(restored.snapshot(), registry.snapshot());
    }

    #[test]
    fn test_load_missing_preset() {
        let dir = tempdir().unwrap();
        let mut registry = registry_with(&[("Keep", 2, "k")]);
        let err = PresetStore::new()
            .load(&mut registry, &dir.path().join("none.preset"))
            .unwrap_err();
        assert!(matches!(err, HubError::ReadFailed { .. }));
        assert!(registry.contains("k"));
    }

    #[test]
    fn test_load_corrupt_archives() {
        let dir = tempdir().unwrap();
        let cases = [
            ("garbage.preset", "not json at all".to_string()),
            (
                "version.preset",
                r#"{ "format_version": 99, "created_at": "2026-10-16T09:30:00Z", "engines": {} }"#
                    .to_string(),
            ),
            (
                "mismatch.preset",
                r#"{ "format_version": 1, "created_at": "2026-10-16T09:30:00Z",
                     "engines": {
                       "a": { "identifier": "b", "description": "B", "channel_count": 2 }
                     } }"#
                    .to_string(),
            ),
            (
                "zero.preset",
                r#"{ "format_version": 1, "created_at": "2026-10-16T09:30:00Z",
                     "engines": {
                       "a": { "identifier": "a", "description": "A", "channel_count": 0 }
                     } }"#
                    .to_string(),
            ),
        ];

        let store = PresetStore::new();
        let mut registry = registry_with(&[("Keep", 2, "k")]);
        for (name, content) in cases.iter() {
            let path = dir.path().join(name);
            fs::write(&path, content).unwrap();
            let err = store.load(&mut registry, &path).unwrap_err();
            assert!(
                matches!(err, HubError::CorruptArchive { .. }),
                "{} should be corrupt, got {}",
                name,
                err
            );
            assert_eq!(registry.len(), 1);
        }
    }

    #[test]
    fn test_new_preset_clears_registry() {
        let mut registry = registry_with(&[("A", 2, "a"), ("B", 2, "b")]);
        PresetStore::new().new_preset(&mut registry);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_list_presets() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.preset"), "{}").unwrap();
        fs::write(dir.path().join("a.preset"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("folder.preset")).unwrap();

        let presets = list_presets(dir.path()).unwrap();
        let names: Vec<_> = presets
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.preset", "b.preset"]);
    }
}
