//! Driver Configuration Store
//!
//! Loads the registry from the driver configuration document and writes it
//! back. Everything outside the engine list is carried over from the base
//! document untouched.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::codec::{default_engine_template, ConfigCodec};
use crate::error::{HubError, HubResult};
use crate::fs_util::write_atomic;
use crate::registry::EngineRegistry;

/// What to do when a configuration document holds no usable engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Treat an empty engine list as a failed load
    #[default]
    RequireEngines,
    /// Accept an empty engine list
    AllowEmpty,
}

/// Reads and writes the registry against the driver configuration document
#[derive(Debug, Clone)]
pub struct ConfigStore {
    codec: ConfigCodec,
    template: Value,
    policy: LoadPolicy,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(ConfigCodec::default())
    }
}

impl ConfigStore {
    /// Create a store using the built-in engine template
    pub fn new(codec: ConfigCodec) -> Self {
        Self {
            codec,
            template: default_engine_template(),
            policy: LoadPolicy::default(),
        }
    }

    /// Use `template` as the skeleton for every saved engine entry
    pub fn with_template(mut self, template: Value) -> Self {
        self.template = template;
        self
    }

    pub fn with_policy(mut self, policy: LoadPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn codec(&self) -> &ConfigCodec {
        &self.codec
    }

    pub fn template(&self) -> &Value {
        &self.template
    }

    pub fn policy(&self) -> LoadPolicy {
        self.policy
    }

    /// Replace the registry with the engines listed in the document at `path`
    ///
    /// Returns the number of engines loaded. The registry is left unchanged
    /// on any error.
    pub fn load(&self, registry: &mut EngineRegistry, path: &Path) -> HubResult<usize> {
        let content = fs::read_to_string(path).map_err(|e| HubError::read(path, e))?;
        let document: Value =
            serde_json::from_str(&content).map_err(|e| HubError::MalformedDocument {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let records = self
            .codec
            .decode_all(&document)
            .map_err(|e| HubError::MalformedDocument {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if records.is_empty() && self.policy == LoadPolicy::RequireEngines {
            return Err(HubError::NoEngines {
                path: path.to_path_buf(),
            });
        }

        let count = records.len();
        registry.replace_all(records)?;
        info!("Loaded {} audio engines from {:?}", count, path);
        Ok(count)
    }

    /// Write the registry into a copy of the document at `base_path`, saved to `path`
    ///
    /// `base_path` and `path` may be the same file.
    pub fn save(
        &self,
        registry: &mut EngineRegistry,
        path: &Path,
        base_path: &Path,
    ) -> HubResult<()> {
        let unavailable = |reason: String| {
            HubError::TemplateUnavailable(format!("{}: {}", base_path.display(), reason))
        };

        let content = fs::read_to_string(base_path).map_err(|e| unavailable(e.to_string()))?;
        let mut document: Value =
            serde_json::from_str(&content).map_err(|e| unavailable(e.to_string()))?;

        self.codec
            .replace_engines(&mut document, registry.sorted(), &self.template)?;

        let json = serde_json::to_vec_pretty(&document).map_err(|e| unavailable(e.to_string()))?;
        write_atomic(path, &json)?;

        registry.mark_saved();
        info!("Saved {} audio engines to {:?}", registry.len(), path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EngineRecord;
    use crate::registry::RegistryState;
    use serde_json::json;
    use tempfile::tempdir;

    fn write_document(dir: &Path, name: &str, engines: Value) -> std::path::PathBuf {
        let path = dir.join(name);
        let document = json!({
            "CFBundleVersion": "1.0",
            "IOKitPersonalities": {
                "PhantomAudioDriver": {
                    "IOProviderClass": "IOResources",
                    "AudioEngines": engines
                }
            }
        });
        fs::write(&path, serde_json::to_string_pretty(&document).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_load_two_engine_scenario() {
        let dir = tempdir().unwrap();
        let path = write_document(
            dir.path(),
            "Info.json",
            json!([
                { "Description": "Mix A", "Formats": [{ "IOAudioStreamNumChannels": 2 }] },
                {
                    "Description": "Mix B",
                    "Identifier": "fixed-1",
                    "Formats": [{ "IOAudioStreamNumChannels": 8 }]
                }
            ]),
        );

        let mut registry = EngineRegistry::new();
        let count = ConfigStore::default().load(&mut registry, &path).unwrap();
        assert_eq!(count, 2);

        let mix_a = registry.record_at(0).unwrap();
        let mix_b = registry.record_at(1).unwrap();
        assert_eq!(mix_a.description(), "Mix A");
        assert!(!mix_a.identifier().is_empty());
        assert_eq!(mix_b.identifier(), "fixed-1");
        assert_eq!(mix_b.channel_count(), 8);
        assert_eq!(registry.state(), RegistryState::Loaded);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let mut registry = EngineRegistry::new();
        let err = ConfigStore::default()
            .load(&mut registry, &dir.path().join("nope.json"))
            .unwrap_err();
        assert!(matches!(err, HubError::FileNotFound { .. }));
        assert_eq!(registry.state(), RegistryState::Uninitialized);
    }

    #[test]
    fn test_load_malformed_documents() {
        let dir = tempdir().unwrap();
        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "{ not json").unwrap();
        let wrong_shape = dir.path().join("shape.json");
        fs::write(&wrong_shape, r#"{ "IOKitPersonalities": {} }"#).unwrap();

        let store = ConfigStore::default();
        let mut registry = EngineRegistry::new();
        registry.add(EngineRecord::default()).unwrap();

        for path in [&garbage, &wrong_shape] {
            let err = store.load(&mut registry, path).unwrap_err();
            assert!(matches!(err, HubError::MalformedDocument { .. }));
            assert_eq!(registry.len(), 1);
        }
    }

    #[test]
    fn test_zero_engines_policy() {
        let dir = tempdir().unwrap();
        let path = write_document(
            dir.path(),
            "Info.json",
            json!([{ "Description": "Broken", "Formats": [] }]),
        );

        let mut registry = EngineRegistry::new();
        registry.add(EngineRecord::default()).unwrap();

        let err = ConfigStore::default().load(&mut registry, &path).unwrap_err();
        assert!(matches!(err, HubError::NoEngines { .. }));
        assert_eq!(registry.len(), 1);

        let store = ConfigStore::default().with_policy(LoadPolicy::AllowEmpty);
        assert_eq!(store.load(&mut registry, &path).unwrap(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_load_duplicate_identifiers_fails_whole_load() {
        let dir = tempdir().unwrap();
        let path = write_document(
            dir.path(),
            "Info.json",
            json!([
                {
                    "Description": "A",
                    "Identifier": "same",
                    "Formats": [{ "IOAudioStreamNumChannels": 2 }]
                },
                {
                    "Description": "B",
                    "Identifier": "same",
                    "Formats": [{ "IOAudioStreamNumChannels": 4 }]
                },
                { "Description": "C", "Formats": [{ "IOAudioStreamNumChannels": 6 }] }
            ]),
        );

        let mut registry = EngineRegistry::new();
        registry
            .add(EngineRecord::create(Some("Keep".into()), Some(2), Some("keep".into())).unwrap())
            .unwrap();
        let before = registry.snapshot();

        let err = ConfigStore::default().load(&mut registry, &path).unwrap_err();
        assert!(matches!(err, HubError::DuplicateIdentifier(ref id) if id == "same"));
        assert_eq!(registry.snapshot(), before);
        assert_eq!(registry.state(), RegistryState::Modified);
    }

    #[test]
    fn test_save_preserves_unrelated_keys() {
        let dir = tempdir().unwrap();
        let base = write_document(
            dir.path(),
            "Info.json",
            json!([{
                "Description": "Stale",
                "Identifier": "stale",
                "Formats": [{ "IOAudioStreamNumChannels": 2 }]
            }]),
        );
        let out = dir.path().join("Saved.json");

        let mut registry = EngineRegistry::new();
        registry
            .add(EngineRecord::create(Some("Fresh".into()), Some(4), Some("fresh".into())).unwrap())
            .unwrap();

        let store = ConfigStore::default();
        store.save(&mut registry, &out, &base).unwrap();
        assert_eq!(registry.state(), RegistryState::Saved);

        let saved: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(saved["CFBundleVersion"], "1.0");
        assert_eq!(
            saved["IOKitPersonalities"]["PhantomAudioDriver"]["IOProviderClass"],
            "IOResources"
        );
        let engines = saved["IOKitPersonalities"]["PhantomAudioDriver"]["AudioEngines"]
            .as_array()
            .unwrap();
        assert_eq!(engines.len(), 1);
        assert_eq!(engines[0]["Identifier"], "fresh");
        assert_eq!(engines[0]["Formats"][0]["IOAudioStreamNumChannels"], 4);
        assert_eq!(engines[0]["Formats"][0]["IOAudioStreamBitDepth"], 32);
    }

    #[test]
    fn test_save_without_base_document() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("Saved.json");
        let mut registry = EngineRegistry::new();
        registry.add(EngineRecord::default()).unwrap();

        let err = ConfigStore::default()
            .save(&mut registry, &out, &dir.path().join("missing.json"))
            .unwrap_err();
        assert!(matches!(err, HubError::TemplateUnavailable(_)));
        assert!(!out.exists());
        assert!(registry.has_unsaved_changes());
    }

    #[test]
    fn test_save_in_place_then_reload() {
        let dir = tempdir().unwrap();
        let path = write_document(
            dir.path(),
            "Info.json",
            json!([{
                "Description": "One",
                "Identifier": "one",
                "Formats": [{ "IOAudioStreamNumChannels": 2 }]
            }]),
        );

        let store = ConfigStore::default();
        let mut registry = EngineRegistry::new();
        store.load(&mut registry, &path).unwrap();
        registry.update("one", "One (renamed)", 16).unwrap();
        store.save(&mut registry, &path, &path).unwrap();

        let mut reloaded = EngineRegistry::new();
        store.load(&mut reloaded, &path).unwrap();
        assert_eq!(reloaded.snapshot(), registry.snapshot());
    }
}
