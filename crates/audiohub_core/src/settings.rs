//! Persistent Settings Management
//!
//! Where the driver and its configuration live, and how loading behaves.
//!
//! # Storage Locations
//! - Linux: `~/.config/audiohub/settings.json`
//! - Windows: `%APPDATA%\audiohub\settings.json`
//! - macOS: `~/Library/Application Support/org.audiohub.audiohub/settings.json`

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::codec::DEFAULT_PERSONALITY;
use crate::config_store::LoadPolicy;
use crate::error::{HubError, HubResult};
use crate::fs_util::write_atomic;

pub const DEFAULT_DRIVER_PATH: &str = "/Library/Extensions/UltraschallHub.kext";
pub const DEFAULT_BUNDLE_ID: &str = "fm.ultraschall.audio.UltraschallHub";

/// Configuration document inside the driver bundle
const BUNDLE_CONFIG_PATH: &str = "Contents/Resources/AudioEngines.json";

/// Root settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubSettings {
    /// Driver personality holding the engine list
    pub personality: String,
    /// Kext bundle to load and unload
    pub driver_path: PathBuf,
    /// Bundle identifier reported by `kextstat`
    pub bundle_id: String,
    /// Driver configuration document; defaults to the one inside the bundle
    #[serde(default)]
    pub driver_config_path: Option<PathBuf>,
    /// Document whose non-engine keys are kept on save; defaults to the
    /// configuration document itself
    #[serde(default)]
    pub base_config_path: Option<PathBuf>,
    /// Custom engine entry template
    #[serde(default)]
    pub engine_template_path: Option<PathBuf>,
    #[serde(default)]
    pub load_policy: LoadPolicy,
    /// Where presets are offered; defaults to the documents directory
    #[serde(default)]
    pub preset_dir: Option<PathBuf>,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            personality: DEFAULT_PERSONALITY.to_string(),
            driver_path: PathBuf::from(DEFAULT_DRIVER_PATH),
            bundle_id: DEFAULT_BUNDLE_ID.to_string(),
            driver_config_path: None,
            base_config_path: None,
            engine_template_path: None,
            load_policy: LoadPolicy::default(),
            preset_dir: None,
        }
    }
}

impl HubSettings {
    /// Load settings from disk, or return default if missing/corrupt
    pub fn load() -> Self {
        match Self::get_config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from `path`, or return default if missing/corrupt
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(settings) => {
                        info!("Settings loaded from {:?}", path);
                        return settings;
                    }
                    Err(e) => {
                        error!("Failed to parse settings file: {}", e);
                    }
                },
                Err(e) => {
                    error!("Failed to open settings file: {}", e);
                }
            }
        }

        info!("Using default settings");
        Self::default()
    }

    /// Save settings to the platform configuration directory
    pub fn save(&self) -> HubResult<()> {
        let path = Self::get_config_path().ok_or_else(|| {
            HubError::write(
                "settings.json",
                std::io::Error::new(std::io::ErrorKind::NotFound, "no configuration directory"),
            )
        })?;
        self.save_to(&path)
    }

    /// Save settings to `path`, creating its directory
    pub fn save_to(&self, path: &Path) -> HubResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| HubError::write(parent, e))?;
        }

        let json = serde_json::to_vec_pretty(self).map_err(|e| {
            HubError::write(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        write_atomic(path, &json)?;

        info!("Settings saved to {:?}", path);
        Ok(())
    }

    /// Driver configuration document to load from and save to
    pub fn config_path(&self) -> PathBuf {
        self.driver_config_path
            .clone()
            .unwrap_or_else(|| self.driver_path.join(BUNDLE_CONFIG_PATH))
    }

    /// Document supplying everything outside the engine list on save
    pub fn base_path(&self) -> PathBuf {
        self.base_config_path
            .clone()
            .unwrap_or_else(|| self.config_path())
    }

    /// Directory offered for presets
    pub fn presets_path(&self) -> Option<PathBuf> {
        self.preset_dir
            .clone()
            .or_else(crate::preset_store::default_preset_dir)
    }

    /// Get the platform-specific settings file path
    fn get_config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "audiohub", "audiohub")
            .map(|proj| proj.config_dir().join("settings.json"))
    }
}
