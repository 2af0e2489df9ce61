//! Audio Hub CLI Library - Commands and Argument Parsing
//!
//! This module exposes the engine registry on the command line.

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use audiohub_core::{EngineRecord, HubSession, HubSettings, LoadPolicy};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "audiohub_core=info,audiohub_driver=info,audiohub_cli_lib=info";

/// Engine info for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineInfo {
    pub index: usize,
    pub identifier: String,
    pub description: String,
    pub channels: u32,
}

impl EngineInfo {
    pub fn from_record(index: usize, record: &EngineRecord) -> Self {
        Self {
            index,
            identifier: record.identifier().to_string(),
            description: record.description().to_string(),
            channels: record.channel_count(),
        }
    }
}

/// Driver state for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverStatus {
    /// Whether this platform can load the driver at all
    pub supported: bool,
    pub loaded: bool,
    pub driver_path: PathBuf,
    pub bundle_id: String,
    pub config_path: PathBuf,
}

#[derive(Parser)]
#[command(name = "audiohub")]
#[command(author, version, long_about = None)]
#[command(about = "Configure the Audio Hub virtual audio engines")]
pub struct Cli {
    /// Settings file (defaults to the platform configuration directory)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Driver configuration document
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Document whose other keys are kept when saving (defaults to --config)
    #[arg(long, global = true)]
    pub base: Option<PathBuf>,

    /// Accept a configuration document without engines
    #[arg(long, global = true)]
    pub allow_empty: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List engines sorted by description
    List,

    /// Show the engine at a position of the sorted list
    Show { index: usize },

    /// Add an engine
    Add {
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        channels: Option<u32>,
    },

    /// Change an engine's description or channel count
    Update {
        identifier: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        channels: Option<u32>,
    },

    /// Remove an engine
    Remove { identifier: String },

    /// Manage presets
    Preset(PresetArgs),

    /// Show whether the driver is loaded
    Status,

    /// Restart the driver with the saved configuration
    Apply,

    /// Load or unload the driver
    Driver {
        #[command(subcommand)]
        action: DriverAction,
    },

    /// Show the effective settings, optionally persisting them
    Config {
        /// Write the settings (including --config/--base/--allow-empty) back
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args)]
pub struct PresetArgs {
    #[command(subcommand)]
    pub action: PresetAction,
}

#[derive(Subcommand)]
pub enum PresetAction {
    /// Start over with no engines
    New,
    /// Save the current engines as a preset
    Save { path: PathBuf },
    /// Replace the current engines with a preset
    Load {
        path: PathBuf,
        /// Restart the driver afterwards
        #[arg(long)]
        apply: bool,
    },
    /// List presets in a directory (defaults to the preset directory)
    List { dir: Option<PathBuf> },
}

#[derive(Subcommand)]
pub enum DriverAction {
    Load,
    Unload,
}

/// Resolve settings from the settings file and command line overrides
pub fn resolve_settings(cli: &Cli) -> HubSettings {
    let mut settings = match &cli.settings {
        Some(path) => HubSettings::load_from(path),
        None => HubSettings::load(),
    };

    if let Some(config) = &cli.config {
        settings.driver_config_path = Some(config.clone());
    }
    if let Some(base) = &cli.base {
        settings.base_config_path = Some(base.clone());
    }
    if cli.allow_empty {
        settings.load_policy = LoadPolicy::AllowEmpty;
    }
    settings
}

fn print_engines(engines: &[EngineInfo]) {
    if engines.is_empty() {
        println!("No engines configured");
        return;
    }
    println!("{:>3}  {:<38} {:>8}  DESCRIPTION", "#", "IDENTIFIER", "CHANNELS");
    for engine in engines {
        println!(
            "{:>3}  {:<38} {:>8}  {}",
            engine.index, engine.identifier, engine.channels, engine.description
        );
    }
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text(value);
    }
    Ok(())
}

/// Parse arguments and run the requested command
pub fn run() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = resolve_settings(&cli);
    let mut session = HubSession::new(settings, audiohub_driver::get_control())?;
    info!("Using driver configuration {:?}", session.settings().config_path());

    let json = cli.json;
    match cli.command {
        Commands::List => {
            let engines = commands::list_engines(&mut session)?;
            emit(json, &engines, |e| print_engines(e))
        }
        Commands::Show { index } => {
            let engine = commands::show_engine(&mut session, index)?;
            emit(json, &engine, |e| print_engines(std::slice::from_ref(e)))
        }
        Commands::Add {
            description,
            channels,
        } => {
            let engine = commands::add_engine(&mut session, description, channels)?;
            emit(json, &engine, |e| println!("Added {} ({})", e.identifier, e.description))
        }
        Commands::Update {
            identifier,
            description,
            channels,
        } => {
            let engine = commands::update_engine(&mut session, &identifier, description, channels)?;
            emit(json, &engine, |e| {
                println!("Updated {}: {}, {} channels", e.identifier, e.description, e.channels)
            })
        }
        Commands::Remove { identifier } => {
            let engine = commands::remove_engine(&mut session, &identifier)?;
            emit(json, &engine, |e| println!("Removed {} ({})", e.identifier, e.description))
        }
        Commands::Preset(args) => match args.action {
            PresetAction::New => {
                commands::new_preset(&mut session)?;
                println!("Driver configuration cleared");
                Ok(())
            }
            PresetAction::Save { path } => {
                let path = commands::save_preset(&mut session, &path)?;
                println!("Saved preset {}", path.display());
                Ok(())
            }
            PresetAction::Load { path, apply } => {
                let count = commands::load_preset(&mut session, &path, apply)?;
                println!("Loaded {} engines", count);
                Ok(())
            }
            PresetAction::List { dir } => {
                let presets = commands::list_presets(&session, dir)?;
                emit(json, &presets, |presets| {
                    for preset in presets {
                        println!("{}", preset.display());
                    }
                })
            }
        },
        Commands::Status => {
            let status = commands::driver_status(&session);
            emit(json, &status, |s| {
                if !s.supported {
                    println!("Driver control is not supported on this platform");
                }
                println!("Status: {}", if s.loaded { "Loaded" } else { "Unloaded" });
                println!("Driver: {}", s.driver_path.display());
                println!("Configuration: {}", s.config_path.display());
            })
        }
        Commands::Apply => {
            commands::apply_current(&mut session)?;
            println!("Driver reloaded");
            Ok(())
        }
        Commands::Config { save } => {
            if save {
                commands::save_settings(session.settings(), cli.settings.as_deref())?;
            }
            emit(json, session.settings(), |s| {
                println!("Personality: {}", s.personality);
                println!("Driver: {}", s.driver_path.display());
                println!("Bundle: {}", s.bundle_id);
                println!("Configuration: {}", s.config_path().display());
                println!("Base document: {}", s.base_path().display());
                println!("Load policy: {:?}", s.load_policy);
            })
        }
        Commands::Driver { action } => match action {
            DriverAction::Load => {
                commands::load_driver(&session)?;
                println!("Driver loaded");
                Ok(())
            }
            DriverAction::Unload => {
                commands::unload_driver(&session)?;
                println!("Driver unloaded");
                Ok(())
            }
        },
    }
}
