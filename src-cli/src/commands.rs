//! CLI Commands - One function per subcommand
//!
//! Every editing command reloads the driver configuration first and saves
//! it afterwards, so each invocation starts from what is on disk.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use audiohub_core::{EngineRecord, HubError, HubSession, HubSettings, PRESET_EXTENSION};
use tracing::info;

use crate::{DriverStatus, EngineInfo};

fn engine_info(session: &HubSession, identifier: &str) -> Option<EngineInfo> {
    session
        .registry()
        .sorted()
        .into_iter()
        .enumerate()
        .find(|(_, record)| record.identifier() == identifier)
        .map(|(index, record)| EngineInfo::from_record(index, record))
}

/// Reload the driver configuration, reading a document without engines as empty
///
/// `preset new` leaves such a document behind, and adding engines or
/// snapshotting it must still work afterwards.
fn reload_allowing_empty(session: &mut HubSession) -> Result<()> {
    match session.reload() {
        Ok(_) => Ok(()),
        Err(HubError::NoEngines { path }) => {
            info!("No engines in {:?}, starting from an empty registry", path);
            session.new_preset();
            Ok(())
        }
        Err(e) => Err(e).context("Failed to load driver configuration"),
    }
}

/// All engines in the driver configuration, sorted by description
pub fn list_engines(session: &mut HubSession) -> Result<Vec<EngineInfo>> {
    session.reload().context("Failed to load driver configuration")?;
    Ok(session
        .registry()
        .sorted()
        .into_iter()
        .enumerate()
        .map(|(index, record)| EngineInfo::from_record(index, record))
        .collect())
}

/// The engine at `index` of the sorted listing
pub fn show_engine(session: &mut HubSession, index: usize) -> Result<EngineInfo> {
    session.reload().context("Failed to load driver configuration")?;
    let record = session.registry().record_at(index)?;
    Ok(EngineInfo::from_record(index, &record))
}

/// Add an engine, seeded from the engine template
pub fn add_engine(
    session: &mut HubSession,
    description: Option<String>,
    channels: Option<u32>,
) -> Result<EngineInfo> {
    reload_allowing_empty(session)?;

    let seed = EngineRecord::from_template(session.config_store().template()).unwrap_or_default();
    let record = EngineRecord::create(
        Some(description.unwrap_or_else(|| seed.description().to_string())),
        Some(channels.unwrap_or(seed.channel_count())),
        None,
    )?;
    let identifier = record.identifier().to_string();

    session.registry_mut().add(record)?;
    session.save().context("Failed to save driver configuration")?;
    info!("Added engine {}", identifier);

    engine_info(session, &identifier).context("Added engine missing from registry")
}

/// Change an engine's description and/or channel count
pub fn update_engine(
    session: &mut HubSession,
    identifier: &str,
    description: Option<String>,
    channels: Option<u32>,
) -> Result<EngineInfo> {
    if description.is_none() && channels.is_none() {
        bail!("Nothing to update: pass --description and/or --channels");
    }
    session.reload().context("Failed to load driver configuration")?;

    let current = session
        .registry()
        .get(identifier)
        .cloned()
        .with_context(|| format!("Engine not found: {}", identifier))?;
    session.registry_mut().update(
        identifier,
        description.unwrap_or_else(|| current.description().to_string()),
        channels.unwrap_or(current.channel_count()),
    )?;
    session.save().context("Failed to save driver configuration")?;

    engine_info(session, identifier).context("Updated engine missing from registry")
}

/// Remove an engine by identifier
pub fn remove_engine(session: &mut HubSession, identifier: &str) -> Result<EngineInfo> {
    session.reload().context("Failed to load driver configuration")?;
    let removed = session.registry_mut().remove(identifier)?;
    session.save().context("Failed to save driver configuration")?;
    Ok(EngineInfo::from_record(0, &removed))
}

/// Append the preset extension when a path has none
pub fn preset_path(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(PRESET_EXTENSION)
    }
}

/// Empty the driver configuration
pub fn new_preset(session: &mut HubSession) -> Result<()> {
    session.new_preset();
    session.save().context("Failed to save driver configuration")?;
    Ok(())
}

/// Snapshot the current driver configuration into a preset file
pub fn save_preset(session: &mut HubSession, path: &Path) -> Result<PathBuf> {
    reload_allowing_empty(session)?;
    let path = preset_path(path);
    session
        .save_preset(&path)
        .with_context(|| format!("Failed to save preset {:?}", path))?;
    Ok(path)
}

/// Replace the driver configuration with a preset, optionally restarting the driver
pub fn load_preset(session: &mut HubSession, path: &Path, apply: bool) -> Result<usize> {
    let path = preset_path(path);
    let count = session
        .load_preset(&path)
        .with_context(|| format!("Failed to load preset {:?}", path))?;

    if apply {
        apply_configuration(session)?;
    } else {
        session.save().context("Failed to save driver configuration")?;
    }
    Ok(count)
}

/// Preset files in `dir`, or in the configured preset directory
pub fn list_presets(session: &HubSession, dir: Option<PathBuf>) -> Result<Vec<PathBuf>> {
    let dir = match dir.or_else(|| session.settings().presets_path()) {
        Some(dir) => dir,
        None => bail!("No preset directory configured"),
    };
    Ok(audiohub_core::list_presets(&dir)?)
}

pub fn driver_status(session: &HubSession) -> DriverStatus {
    let settings = session.settings();
    DriverStatus {
        supported: audiohub_driver::supports_driver_control(),
        loaded: session.driver_loaded(),
        driver_path: settings.driver_path.clone(),
        bundle_id: settings.bundle_id.clone(),
        config_path: settings.config_path(),
    }
}

/// Persist `settings` to `path`, or to the platform settings file
pub fn save_settings(settings: &HubSettings, path: Option<&Path>) -> Result<()> {
    let result = match path {
        Some(path) => settings.save_to(path),
        None => settings.save(),
    };
    result.context("Failed to save settings")
}

/// Re-save the configuration on disk and restart the driver with it
pub fn apply_current(session: &mut HubSession) -> Result<()> {
    session.reload().context("Failed to load driver configuration")?;
    apply_configuration(session)
}

/// Save the registry and restart the driver with it
pub fn apply_configuration(session: &mut HubSession) -> Result<()> {
    if !session.apply()? {
        bail!("Driver {:?} failed to load", session.settings().driver_path);
    }
    Ok(())
}

pub fn load_driver(session: &HubSession) -> Result<()> {
    if !session.load_driver() {
        bail!("Failed to load driver {:?}", session.settings().driver_path);
    }
    Ok(())
}

pub fn unload_driver(session: &HubSession) -> Result<()> {
    if !session.unload_driver() {
        bail!("Failed to unload driver {:?}", session.settings().driver_path);
    }
    Ok(())
}
