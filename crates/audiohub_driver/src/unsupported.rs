//! Fallback for platforms without a kext loader

use std::path::Path;

use tracing::warn;

use crate::error::DriverError;
use crate::traits::DriverControl;

/// Driver control that refuses every request
#[derive(Debug, Clone, Default)]
pub struct UnsupportedControl;

impl UnsupportedControl {
    pub fn new() -> Self {
        Self
    }
}

impl DriverControl for UnsupportedControl {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn load(&self, path: &Path) -> bool {
        warn!("Cannot load {:?}: {}", path, DriverError::UnsupportedPlatform);
        false
    }

    fn unload(&self, path: &Path) -> bool {
        warn!("Cannot unload {:?}: {}", path, DriverError::UnsupportedPlatform);
        false
    }

    fn is_loaded(&self, _bundle_id: &str) -> bool {
        false
    }
}
