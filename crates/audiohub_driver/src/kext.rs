//! Kernel extension control via the macOS kext tools
//!
//! Wraps `kextload`, `kextunload` and `kextstat`. Loading a kext requires
//! root, so callers normally run the front end with elevated privileges.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use crate::error::{DriverError, DriverResult};
use crate::traits::DriverControl;

/// Driver control backed by the kext command line tools
#[derive(Debug, Clone, Default)]
pub struct KextControl;

impl KextControl {
    pub fn new() -> Self {
        Self
    }

    fn run(program: &'static str, args: &[&OsStr]) -> DriverResult<String> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| DriverError::Spawn { program, source })?;

        if !output.status.success() {
            return Err(DriverError::CommandFailed {
                program,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Load the kext bundle at `path`
    pub fn try_load(&self, path: &Path) -> DriverResult<()> {
        check_path(path)?;
        debug!("Loading driver {:?}", path);
        Self::run("kextload", &[path.as_os_str()])?;
        Ok(())
    }

    /// Unload the kext bundle at `path`
    pub fn try_unload(&self, path: &Path) -> DriverResult<()> {
        check_path(path)?;
        debug!("Unloading driver {:?}", path);
        Self::run("kextunload", &[path.as_os_str()])?;
        Ok(())
    }

    /// Query whether a kext with `bundle_id` is loaded
    pub fn try_is_loaded(&self, bundle_id: &str) -> DriverResult<bool> {
        if bundle_id.is_empty() {
            return Err(DriverError::InvalidArgument("empty bundle identifier".into()));
        }
        let stdout = Self::run(
            "kextstat",
            &[OsStr::new("-l"), OsStr::new("-b"), OsStr::new(bundle_id)],
        )?;
        Ok(kextstat_lists(&stdout, bundle_id))
    }
}

fn check_path(path: &Path) -> DriverResult<()> {
    if path.as_os_str().is_empty() {
        return Err(DriverError::InvalidArgument("empty driver path".into()));
    }
    Ok(())
}

/// Check `kextstat -l -b <id>` output for a row naming `bundle_id`
///
/// Rows look like:
/// `  153    0 0xffffff7f83a5e000 0x5000  0x5000  fm.ultraschall.audio.UltraschallHub (1.0) <7 5 4 3 1>`
pub(crate) fn kextstat_lists(stdout: &str, bundle_id: &str) -> bool {
    stdout
        .lines()
        .any(|line| line.split_whitespace().any(|field| field == bundle_id))
}

impl DriverControl for KextControl {
    fn name(&self) -> &'static str {
        "kext"
    }

    fn load(&self, path: &Path) -> bool {
        match self.try_load(path) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to load driver {:?}: {}", path, e);
                false
            }
        }
    }

    fn unload(&self, path: &Path) -> bool {
        match self.try_unload(path) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to unload driver {:?}: {}", path, e);
                false
            }
        }
    }

    fn is_loaded(&self, bundle_id: &str) -> bool {
        match self.try_is_loaded(bundle_id) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("Failed to query driver status for {}: {}", bundle_id, e);
                false
            }
        }
    }
}
