//! Audio Hub Core - Audio Engine Registry
//!
//! This crate manages the audio engines exposed by the Audio Hub driver:
//! - Engine records with stable identifiers
//! - The in-memory registry with a description-sorted view
//! - Load/save against the driver configuration document
//! - Whole-registry presets stored independently of the driver
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  decode_all   ┌───────────────┐  replace_all  ┌────────────────┐
//! │ driver config│ ────────────▶ │  ConfigCodec  │ ────────────▶ │ EngineRegistry │
//! │  document    │ ◀──────────── │ (+ template)  │ ◀──────────── │  id → record   │
//! └──────────────┘  encode_all   └───────────────┘    sorted     └────────────────┘
//!                                                                   │      ▲
//!                                                          snapshot │      │ replace_all
//!                                                                   ▼      │
//!                                                              ┌────────────────┐
//!                                                              │  PresetStore   │
//!                                                              └────────────────┘
//! ```
//!
//! Everything here is synchronous and single-threaded.

mod codec;
mod config_store;
mod error;
mod fs_util;
mod preset_store;
mod record;
mod registry;
mod session;
mod settings;

pub use codec::{
    decode_entries, default_engine_template, load_engine_template, ConfigCodec, MissingSection,
    DEFAULT_PERSONALITY, ENGINES_KEY, PERSONALITIES_KEY,
};
pub use config_store::{ConfigStore, LoadPolicy};
pub use error::{HubError, HubResult};
pub use preset_store::{
    default_preset_dir, list_presets, PresetArchive, PresetStore, PRESET_EXTENSION,
};
pub use record::{
    generate_identifier, validate_channel_count, EngineRecord, DEFAULT_CHANNEL_COUNT,
    DEFAULT_DESCRIPTION,
};
pub use registry::{EngineRegistry, RegistryState};
pub use session::HubSession;
pub use settings::{HubSettings, DEFAULT_BUNDLE_ID, DEFAULT_DRIVER_PATH};

// Re-export driver control for convenience
pub use audiohub_driver::{get_control, DriverControl};
