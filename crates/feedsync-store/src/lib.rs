//! Flat-file handoff between sync stages.
//!
//! Every stage communicates through files in the data directory: the SKU
//! cache, the delta file, the price snapshot, and per-run update reports.
//! Writes go to a sibling `.tmp` file first and are renamed into place, so a
//! reader never sees a half-written file.

pub mod delta_file;
pub mod error;
pub mod report;
pub mod sku_cache;
pub mod snapshot;

use std::fs::File;
use std::path::{Path, PathBuf};

pub use delta_file::{
    read_delta_file, write_delta_file, write_empty_delta_file, DELTA_FILE_HEADERS,
};
pub use error::StoreError;
pub use report::{write_report, ReportPaths};
pub use sku_cache::{read_sku_cache, write_sku_cache, SkuCache};
pub use snapshot::{read_snapshot, write_snapshot, SNAPSHOT_HEADERS};

/// Writes `path` by handing `write` a temporary sibling file, then renaming
/// it over the destination. Parent directories are created as needed.
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut File) -> Result<(), StoreError>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let tmp = tmp_path(path);
    let mut file = File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
    if let Err(err) = write(&mut file) {
        drop(file);
        let _ = std::fs::remove_file(&tmp);
        return Err(err);
    }
    file.sync_all().map_err(|e| StoreError::io(&tmp, e))?;
    drop(file);

    std::fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Opens a file for reading, mapping `NotFound` to `Ok(None)`.
pub(crate) fn open_if_exists(path: &Path) -> Result<Option<File>, StoreError> {
    match File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("/data/last_prices.csv")),
            PathBuf::from("/data/last_prices.csv.tmp")
        );
    }

    #[test]
    fn failed_write_leaves_no_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let result = write_atomically(&path, |_| {
            Err(StoreError::InvalidRow {
                path: PathBuf::from("out.csv"),
                line: 1,
                reason: "boom".to_string(),
            })
        });
        assert!(result.is_err());
        assert!(!path.exists());
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.txt");
        write_atomically(&path, |f| {
            use std::io::Write;
            f.write_all(b"ok").map_err(|e| StoreError::io(Path::new("x"), e))
        })
        .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ok");
    }

    #[test]
    fn open_if_exists_returns_none_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open_if_exists(&dir.path().join("missing.csv"))
            .unwrap()
            .is_none());
    }
}
