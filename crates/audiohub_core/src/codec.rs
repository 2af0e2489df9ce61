//! Configuration Document Codec
//!
//! Converts between engine records and the driver configuration document:
//!
//! ```text
//! IOKitPersonalities
//!   └── <personality>
//!         └── AudioEngines: [ { Description, Identifier?, Formats: [ { IOAudioStreamNumChannels, .. } ] }, .. ]
//! ```
//!
//! The codec holds no state besides the personality name.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

use crate::error::{HubError, HubResult};
use crate::record::{EngineRecord, DEFAULT_CHANNEL_COUNT, DEFAULT_DESCRIPTION, FORMATS_KEY};

pub const PERSONALITIES_KEY: &str = "IOKitPersonalities";
pub const ENGINES_KEY: &str = "AudioEngines";

/// Personality section used when none is configured
pub const DEFAULT_PERSONALITY: &str = "PhantomAudioDriver";

/// The nested engine list could not be reached
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("missing section {0}")]
pub struct MissingSection(pub String);

/// Converts engine records to and from the driver configuration document
#[derive(Debug, Clone)]
pub struct ConfigCodec {
    personality: String,
}

impl Default for ConfigCodec {
    fn default() -> Self {
        Self::new(DEFAULT_PERSONALITY)
    }
}

impl ConfigCodec {
    pub fn new(personality: impl Into<String>) -> Self {
        Self {
            personality: personality.into(),
        }
    }

    pub fn personality(&self) -> &str {
        &self.personality
    }

    fn section_path(&self) -> String {
        format!("{}.{}.{}", PERSONALITIES_KEY, self.personality, ENGINES_KEY)
    }

    /// Borrow the engine list of `document`
    pub fn engine_list<'a>(&self, document: &'a Value) -> Result<&'a [Value], MissingSection> {
        document
            .get(PERSONALITIES_KEY)
            .and_then(|personalities| personalities.get(&self.personality))
            .and_then(|personality| personality.get(ENGINES_KEY))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .ok_or_else(|| MissingSection(self.section_path()))
    }

    fn engine_list_mut<'a>(
        &self,
        document: &'a mut Value,
    ) -> Result<&'a mut Vec<Value>, MissingSection> {
        let path = self.section_path();
        document
            .get_mut(PERSONALITIES_KEY)
            .and_then(|personalities| personalities.get_mut(&self.personality))
            .and_then(|personality| personality.get_mut(ENGINES_KEY))
            .and_then(Value::as_array_mut)
            .ok_or(MissingSection(path))
    }

    /// Decode every engine in `document`, in document order
    ///
    /// Entries that fail to decode are logged and skipped.
    pub fn decode_all(&self, document: &Value) -> Result<Vec<EngineRecord>, MissingSection> {
        let entries = self.engine_list(document)?;
        Ok(decode_entries(entries))
    }

    /// Encode one entry per record from `template`
    pub fn encode_all<'a>(
        records: impl IntoIterator<Item = &'a EngineRecord>,
        template: &Value,
    ) -> HubResult<Vec<Value>> {
        records
            .into_iter()
            .map(|record| record.encode(template))
            .collect()
    }

    /// Replace the engine list of `document` with `records`
    ///
    /// The previous list is discarded entirely. `document` is untouched on
    /// error.
    pub fn replace_engines<'a>(
        &self,
        document: &mut Value,
        records: impl IntoIterator<Item = &'a EngineRecord>,
        template: &Value,
    ) -> HubResult<()> {
        let entries = Self::encode_all(records, template)?;
        let list = self
            .engine_list_mut(document)
            .map_err(|e| HubError::TemplateUnavailable(e.to_string()))?;
        *list = entries;
        Ok(())
    }
}

/// Decode a list of engine entries, skipping the ones that fail
pub fn decode_entries(entries: &[Value]) -> Vec<EngineRecord> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match EngineRecord::decode(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping audio engine entry {}: {}", index, e);
                None
            }
        })
        .collect()
}

/// Built-in engine entry schema
///
/// One interleaved 32-bit signed linear PCM stream, with the buffer layout
/// the driver expects for every engine.
pub fn default_engine_template() -> Value {
    json!({
        "Description": DEFAULT_DESCRIPTION,
        "Identifier": "",
        "BlockSize": 512,
        "NumBlocks": 32,
        "NumStreams": 1,
        "SampleRates": [44100, 48000, 88200, 96000, 176400, 192000],
        "Formats": [{
            "IOAudioStreamNumChannels": DEFAULT_CHANNEL_COUNT,
            "IOAudioStreamSampleFormat": 0x6c70_636d_u32,          // 'lpcm'
            "IOAudioStreamNumericRepresentation": 0x7369_6e74_u32, // 'sint'
            "IOAudioStreamBitDepth": 32,
            "IOAudioStreamBitWidth": 32,
            "IOAudioStreamAlignment": 0,
            "IOAudioStreamByteOrder": 0,
            "IOAudioStreamIsMixable": 1,
            "IOAudioStreamDriverTag": 0
        }]
    })
}

/// Load a custom engine template from a JSON file
pub fn load_engine_template(path: &Path) -> HubResult<Value> {
    let unavailable = |reason: String| {
        HubError::TemplateUnavailable(format!("{}: {}", path.display(), reason))
    };

    let content = fs::read_to_string(path).map_err(|e| unavailable(e.to_string()))?;
    let template: Value = serde_json::from_str(&content).map_err(|e| unavailable(e.to_string()))?;

    let has_format = template
        .get(FORMATS_KEY)
        .and_then(Value::as_array)
        .and_then(|formats| formats.first())
        .map_or(false, Value::is_object);
    if !has_format {
        return Err(unavailable(format!("no {} entry", FORMATS_KEY)));
    }

    Ok(template)
}
