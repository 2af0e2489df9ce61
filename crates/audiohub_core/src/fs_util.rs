//! File helpers shared by the stores

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{HubError, HubResult};

/// Write `bytes` to `path` through a temporary sibling and a rename
///
/// Readers see either the old file or the complete new one.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> HubResult<()> {
    let tmp_path = temp_sibling(path);

    let result = (|| {
        let mut file = File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp_path, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(HubError::write(path, e));
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_atomic_replaces_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engines.json");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!dir.path().join(".engines.json.tmp").exists());
    }

    #[test]
    fn test_write_atomic_reports_write_failed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("engines.json");

        let err = write_atomic(&path, b"data").unwrap_err();
        assert!(matches!(err, HubError::WriteFailed { .. }));
    }
}
