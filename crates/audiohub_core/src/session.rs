//! Hub Session - Main Entry Point
//!
//! The HubSession owns the registry and wires it to the configuration
//! document, preset archives and the driver. Front ends drive everything
//! through it.
//!
//! ```text
//!  settings ──▶ HubSession ──reload/save──▶ ConfigStore ──▶ driver config document
//!                  │    │
//!                  │    └──presets──▶ PresetStore ──▶ *.preset
//!                  │
//!                  └──apply──▶ DriverControl (unload + load)
//! ```

use std::path::Path;

use audiohub_driver::DriverControl;
use tracing::{info, warn};

use crate::codec::{load_engine_template, ConfigCodec};
use crate::config_store::ConfigStore;
use crate::error::HubResult;
use crate::preset_store::PresetStore;
use crate::registry::EngineRegistry;
use crate::settings::HubSettings;

/// Registry plus the stores and driver it is persisted through
pub struct HubSession {
    settings: HubSettings,
    registry: EngineRegistry,
    config_store: ConfigStore,
    preset_store: PresetStore,
    driver: Box<dyn DriverControl>,
}

impl HubSession {
    /// Create a session with an empty registry
    ///
    /// Fails only if a custom engine template is configured and cannot be
    /// read.
    pub fn new(settings: HubSettings, driver: Box<dyn DriverControl>) -> HubResult<Self> {
        let mut config_store = ConfigStore::new(ConfigCodec::new(settings.personality.clone()))
            .with_policy(settings.load_policy);
        if let Some(path) = &settings.engine_template_path {
            config_store = config_store.with_template(load_engine_template(path)?);
        }

        info!(
            "Session using {} driver control, personality {}",
            driver.name(),
            config_store.codec().personality()
        );

        Ok(Self {
            settings,
            registry: EngineRegistry::new(),
            config_store,
            preset_store: PresetStore::new(),
            driver,
        })
    }

    pub fn settings(&self) -> &HubSettings {
        &self.settings
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EngineRegistry {
        &mut self.registry
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.config_store
    }

    /// Reload the registry from the driver configuration document
    pub fn reload(&mut self) -> HubResult<usize> {
        let path = self.settings.config_path();
        self.config_store.load(&mut self.registry, &path)
    }

    /// Write the registry to the driver configuration document
    pub fn save(&mut self) -> HubResult<()> {
        let path = self.settings.config_path();
        let base = self.settings.base_path();
        self.config_store.save(&mut self.registry, &path, &base)
    }

    /// Save the configuration and restart the driver so it picks it up
    ///
    /// Returns whether the driver came back loaded.
    pub fn apply(&mut self) -> HubResult<bool> {
        self.save()?;
        let loaded = self
            .driver
            .activate(&self.settings.driver_path, &self.settings.bundle_id);
        if !loaded {
            warn!("Driver {:?} did not load after saving", self.settings.driver_path);
        }
        Ok(loaded)
    }

    pub fn driver_loaded(&self) -> bool {
        self.driver.is_loaded(&self.settings.bundle_id)
    }

    pub fn load_driver(&self) -> bool {
        self.driver.load(&self.settings.driver_path)
    }

    pub fn unload_driver(&self) -> bool {
        self.driver.unload(&self.settings.driver_path)
    }

    pub fn save_preset(&self, path: &Path) -> HubResult<()> {
        self.preset_store.save(&self.registry, path)
    }

    pub fn load_preset(&mut self, path: &Path) -> HubResult<usize> {
        self.preset_store.load(&mut self.registry, path)
    }

    pub fn new_preset(&mut self) {
        self.preset_store.new_preset(&mut self.registry);
    }
}
