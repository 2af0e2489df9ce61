//! Driver Control Trait
//!
//! The registry core only needs boolean answers from the driver; how a
//! driver gets loaded is left to the implementation.

use std::path::Path;

/// Capability to load, unload and query the virtual audio driver
///
/// Implementations report failure as `false` and log the cause.
pub trait DriverControl {
    /// Name of this implementation (e.g. "kext", "unsupported")
    fn name(&self) -> &'static str;

    /// Load the driver bundle at `path`
    fn load(&self, path: &Path) -> bool;

    /// Unload the driver bundle at `path`
    fn unload(&self, path: &Path) -> bool;

    /// Check whether the driver with `bundle_id` is currently loaded
    fn is_loaded(&self, bundle_id: &str) -> bool;

    /// Unload the driver if it is running, then load it again
    ///
    /// Used after the configuration document changed so the driver picks
    /// up the new engine list. The result of the unload step is ignored;
    /// only the final load decides the outcome.
    fn activate(&self, path: &Path, bundle_id: &str) -> bool {
        if self.is_loaded(bundle_id) {
            let _ = self.unload(path);
        }
        self.load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    struct FakeDriver {
        loaded: Cell<bool>,
        calls: RefCell<Vec<&'static str>>,
    }

    impl DriverControl for FakeDriver {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn load(&self, _path: &Path) -> bool {
            self.calls.borrow_mut().push("load");
            self.loaded.set(true);
            true
        }

        fn unload(&self, _path: &Path) -> bool {
            self.calls.borrow_mut().push("unload");
            self.loaded.set(false);
            true
        }

        fn is_loaded(&self, _bundle_id: &str) -> bool {
            self.loaded.get()
        }
    }

    #[test]
    fn test_activate_reloads_running_driver() {
        let driver = FakeDriver {
            loaded: Cell::new(true),
            calls: RefCell::new(Vec::new()),
        };
        assert!(driver.activate(Path::new("/tmp/Hub.kext"), "hub"));
        assert_eq!(*driver.calls.borrow(), vec!["unload", "load"]);
    }

    #[test]
    fn test_activate_loads_stopped_driver() {
        let driver = FakeDriver {
            loaded: Cell::new(false),
            calls: RefCell::new(Vec::new()),
        };
        assert!(driver.activate(Path::new("/tmp/Hub.kext"), "hub"));
        assert_eq!(*driver.calls.borrow(), vec!["load"]);
        assert!(driver.is_loaded("hub"));
    }

    #[test]
    fn test_boxed_driver_is_usable() {
        let driver: Box<dyn DriverControl> = Box::new(FakeDriver {
            loaded: Cell::new(false),
            calls: RefCell::new(Vec::new()),
        });
        assert_eq!(driver.name(), "fake");
        assert!(!driver.is_loaded("hub"));
        assert!(driver.load(Path::new("/tmp/Hub.kext")));
        assert!(driver.is_loaded("hub"));
    }
}
