//! Audio Engine Records
//!
//! One record describes one virtual audio device exposed by the driver:
//! a stable identifier, a label and a channel count.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{HubError, HubResult};

/// Label given to engines created without one
pub const DEFAULT_DESCRIPTION: &str = "Audio Hub (Generic)";

/// Channel count given to engines created without one (stereo)
pub const DEFAULT_CHANNEL_COUNT: u32 = 2;

// Keys of a single engine entry in the driver configuration document
pub const DESCRIPTION_KEY: &str = "Description";
pub const IDENTIFIER_KEY: &str = "Identifier";
pub const FORMATS_KEY: &str = "Formats";
pub const NUM_CHANNELS_KEY: &str = "IOAudioStreamNumChannels";

/// Configuration of one audio engine
///
/// Fields are read-only outside this crate; changes go through
/// [`EngineRegistry::update`](crate::EngineRegistry::update) so the
/// identifier can never be rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineRecord {
    identifier: String,
    description: String,
    channel_count: u32,
}

impl Default for EngineRecord {
    fn default() -> Self {
        Self {
            identifier: generate_identifier(),
            description: DEFAULT_DESCRIPTION.to_string(),
            channel_count: DEFAULT_CHANNEL_COUNT,
        }
    }
}

impl EngineRecord {
    /// Create a record, filling in defaults for anything not supplied
    ///
    /// A missing or empty identifier is replaced with a freshly generated one.
    pub fn create(
        description: Option<String>,
        channel_count: Option<u32>,
        identifier: Option<String>,
    ) -> HubResult<Self> {
        let channel_count = validate_channel_count(channel_count.unwrap_or(DEFAULT_CHANNEL_COUNT))?;
        let identifier = identifier
            .filter(|id| !id.is_empty())
            .unwrap_or_else(generate_identifier);

        Ok(Self {
            identifier,
            description: description.unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            channel_count,
        })
    }

    /// Create a record with a generated identifier
    pub fn new(description: impl Into<String>, channel_count: u32) -> HubResult<Self> {
        Self::create(Some(description.into()), Some(channel_count), None)
    }

    /// Decode one engine entry of the driver configuration document
    ///
    /// Requires a string `Description`, a non-empty `Formats` list and an
    /// integer `IOAudioStreamNumChannels` in the first format. `Identifier`
    /// is optional.
    pub fn decode(entry: &Value) -> HubResult<Self> {
        let description = entry
            .get(DESCRIPTION_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                HubError::DecodeFailure(format!("{} is missing or not a string", DESCRIPTION_KEY))
            })?;

        let first_format = entry
            .get(FORMATS_KEY)
            .and_then(Value::as_array)
            .and_then(|formats| formats.first())
            .ok_or_else(|| {
                HubError::DecodeFailure(format!("{} is missing or empty", FORMATS_KEY))
            })?;

        let channels = first_format
            .get(NUM_CHANNELS_KEY)
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                HubError::DecodeFailure(format!(
                    "{} is missing or not an integer",
                    NUM_CHANNELS_KEY
                ))
            })?;

        let channel_count = u32::try_from(channels)
            .ok()
            .filter(|&count| count > 0)
            .ok_or_else(|| HubError::DecodeFailure(format!("invalid channel count {}", channels)))?;

        let identifier = entry
            .get(IDENTIFIER_KEY)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(generate_identifier);

        Ok(Self {
            identifier,
            description: description.to_string(),
            channel_count,
        })
    }

    /// Create a new engine seeded from a template entry
    ///
    /// The template's own identifier is ignored.
    pub fn from_template(template: &Value) -> HubResult<Self> {
        let mut record = Self::decode(template)?;
        record.identifier = generate_identifier();
        Ok(record)
    }

    /// Encode this record into a copy of `template`
    ///
    /// Every key of the template is kept; only `Description`, `Identifier`
    /// and the first format's channel count are overwritten.
    pub fn encode(&self, template: &Value) -> HubResult<Value> {
        let mut entry = template.clone();
        let object = entry
            .as_object_mut()
            .ok_or_else(|| {
                HubError::TemplateUnavailable("engine template is not an object".into())
            })?;

        let first_format = object
            .get_mut(FORMATS_KEY)
            .and_then(Value::as_array_mut)
            .and_then(|formats| formats.first_mut())
            .and_then(Value::as_object_mut)
            .ok_or_else(|| {
                HubError::TemplateUnavailable(format!(
                    "engine template has no {} entry",
                    FORMATS_KEY
                ))
            })?;
        first_format.insert(NUM_CHANNELS_KEY.to_string(), Value::from(self.channel_count));

        object.insert(
            DESCRIPTION_KEY.to_string(),
            Value::from(self.description.as_str()),
        );
        object.insert(
            IDENTIFIER_KEY.to_string(),
            Value::from(self.identifier.as_str()),
        );

        Ok(entry)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn channel_count(&self) -> u32 {
        self.channel_count
    }

    pub(crate) fn set_description(&mut self, description: String) {
        self.description = description;
    }

    pub(crate) fn set_channel_count(&mut self, channel_count: u32) {
        self.channel_count = channel_count;
    }

    /// Check a record that did not come through `create` (e.g. a preset)
    pub(crate) fn validate(&self) -> HubResult<()> {
        if self.identifier.is_empty() {
            return Err(HubError::Validation("identifier is empty".into()));
        }
        validate_channel_count(self.channel_count)?;
        Ok(())
    }
}

/// Reject channel counts the driver cannot expose
pub fn validate_channel_count(channel_count: u32) -> HubResult<u32> {
    if channel_count == 0 {
        return Err(HubError::Validation(
            "channel count must be a positive integer".into(),
        ));
    }
    Ok(channel_count)
}

/// Generate a fresh random engine identifier
pub fn generate_identifier() -> String {
    Uuid::new_v4().to_string().to_uppercase()
}
