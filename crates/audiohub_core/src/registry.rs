//! Engine Registry
//!
//! The in-memory, authoritative set of engine records for a session.
//!
//! The registry assumes exclusive access: every method runs to completion
//! on the caller's thread. Wrap it in a `Mutex` before sharing it, since
//! `record_at` sorts and indexes in one call and is only consistent with
//! the registry contents at that moment.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use crate::error::{HubError, HubResult};
use crate::record::{validate_channel_count, EngineRecord};

/// Where the registry is in its load/edit/save cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistryState {
    /// Nothing loaded yet
    #[default]
    Uninitialized,
    /// Contents replaced from a document, preset or new preset
    Loaded,
    /// Edited since the last load or save
    Modified,
    /// Written back to the driver configuration
    Saved,
}

/// Collection of engine records keyed by identifier
#[derive(Debug, Default)]
pub struct EngineRegistry {
    engines: HashMap<String, EngineRecord>,
    state: RegistryState,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record whose identifier is not registered yet
    pub fn add(&mut self, record: EngineRecord) -> HubResult<()> {
        record.validate()?;
        if self.engines.contains_key(record.identifier()) {
            return Err(HubError::DuplicateIdentifier(record.identifier().to_string()));
        }

        debug!(
            "Adding engine {} ({}, {} channels)",
            record.identifier(),
            record.description(),
            record.channel_count()
        );
        self.engines.insert(record.identifier().to_string(), record);
        self.state = RegistryState::Modified;
        Ok(())
    }

    /// Change the description and channel count of an existing record
    pub fn update(
        &mut self,
        identifier: &str,
        description: impl Into<String>,
        channel_count: u32,
    ) -> HubResult<()> {
        let record = self
            .engines
            .get_mut(identifier)
            .ok_or_else(|| HubError::NotFound(identifier.to_string()))?;
        let channel_count = validate_channel_count(channel_count)?;

        record.set_description(description.into());
        record.set_channel_count(channel_count);
        debug!("Updated engine {}", identifier);
        self.state = RegistryState::Modified;
        Ok(())
    }

    /// Remove a record, returning it
    pub fn remove(&mut self, identifier: &str) -> HubResult<EngineRecord> {
        let record = self
            .engines
            .remove(identifier)
            .ok_or_else(|| HubError::NotFound(identifier.to_string()))?;

        debug!("Removed engine {}", identifier);
        self.state = RegistryState::Modified;
        Ok(record)
    }

    /// Records ordered by description, ignoring case
    ///
    /// Equal descriptions fall back to identifier order so the view is
    /// deterministic.
    pub fn sorted(&self) -> Vec<&EngineRecord> {
        let mut records: Vec<&EngineRecord> = self.engines.values().collect();
        records.sort_by_cached_key(|record| {
            (
                record.description().to_lowercase(),
                record.identifier().to_string(),
            )
        });
        records
    }

    /// Record at `index` of the sorted view
    ///
    /// Sorts on every call; an index is only meaningful until the next
    /// mutation.
    pub fn record_at(&self, index: usize) -> HubResult<EngineRecord> {
        let sorted = self.sorted();
        sorted
            .get(index)
            .map(|record| (*record).clone())
            .ok_or(HubError::IndexOutOfRange {
                index,
                len: sorted.len(),
            })
    }

    /// Replace every record at once
    ///
    /// Fails without touching the registry if `records` repeats an
    /// identifier or holds an invalid record.
    pub fn replace_all(
        &mut self,
        records: impl IntoIterator<Item = EngineRecord>,
    ) -> HubResult<()> {
        let mut engines = HashMap::new();
        for record in records {
            record.validate()?;
            if engines.contains_key(record.identifier()) {
                return Err(HubError::DuplicateIdentifier(record.identifier().to_string()));
            }
            engines.insert(record.identifier().to_string(), record);
        }

        info!("Registry replaced with {} engines", engines.len());
        self.engines = engines;
        self.state = RegistryState::Loaded;
        Ok(())
    }

    /// Drop every record, leaving an empty loaded registry
    pub fn clear(&mut self) {
        self.engines.clear();
        self.state = RegistryState::Loaded;
        info!("Registry cleared");
    }

    /// Owned copy of the full identifier → record mapping
    pub fn snapshot(&self) -> BTreeMap<String, EngineRecord> {
        self.engines
            .iter()
            .map(|(identifier, record)| (identifier.clone(), record.clone()))
            .collect()
    }

    pub fn get(&self, identifier: &str) -> Option<&EngineRecord> {
        self.engines.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.engines.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    /// Whether there are edits not yet written to the driver configuration
    pub fn has_unsaved_changes(&self) -> bool {
        self.state == RegistryState::Modified
    }

    pub(crate) fn mark_saved(&mut self) {
        self.state = RegistryState::Saved;
    }
}
