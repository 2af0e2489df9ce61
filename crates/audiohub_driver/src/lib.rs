//! Audio Hub Driver - Kernel Driver Control
//!
//! This crate provides the three operations the engine registry needs from
//! the virtual audio driver:
//! - Load a driver bundle
//! - Unload a driver bundle
//! - Query whether a driver is loaded
//!
//! # Platform Support
//!
//! | Platform | Control     | Mechanism                          |
//! |----------|-------------|------------------------------------|
//! | macOS    | KextControl | `kextload` / `kextunload` / `kextstat` |
//! | Others   | Unsupported | Every call reports failure         |

mod error;
mod kext;
mod traits;
mod unsupported;

pub use error::{DriverError, DriverResult};
pub use kext::KextControl;
pub use traits::DriverControl;
pub use unsupported::UnsupportedControl;

/// Get the driver control for the current OS
pub fn get_control() -> Box<dyn DriverControl> {
    #[cfg(target_os = "macos")]
    {
        Box::new(KextControl::new())
    }

    #[cfg(not(target_os = "macos"))]
    {
        Box::new(UnsupportedControl::new())
    }
}

/// Check if the current platform can load kernel drivers
pub fn supports_driver_control() -> bool {
    cfg!(target_os = "macos")
}
