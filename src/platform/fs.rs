// SyncBridge - platform/fs.rs
//
// Filesystem helpers shared by the storage slot and the state file.
//
// Writes are atomic (write temp -> rename) so a crash mid-save never leaves
// a partially written value observable. The temp file is owned by a scope
// guard and removed on every exit path that did not commit it.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Removes the temp file on drop unless `commit` succeeded.
#[derive(Debug)]
pub struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    pub fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rename the temp file over `target`, disarming the guard on success.
    pub fn commit(mut self, target: &Path) -> io::Result<()> {
        std::fs::rename(&self.path, target)?;
        self.armed = false;
        Ok(())
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.armed {
            // Ignore secondary errors; the temp file may never have been created.
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Write `bytes` to `path` atomically, creating parent directories.
///
/// `temp_extension` names the sibling temp file (e.g. `json.tmp`). A stale
/// temp file left by an earlier crash is simply overwritten.
pub fn write_atomic(path: &Path, temp_extension: &str, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let guard = TempFileGuard::new(path.with_extension(temp_extension));
    std::fs::write(guard.path(), bytes)?;
    guard.commit(path)
}

/// Read a file as UTF-8, refusing files larger than `max_bytes`.
///
/// A missing file is `ReadLimited::Missing`, not an error. An oversize file
/// is reported as `ReadLimited::TooLarge` without reading its content.
pub fn read_limited(path: &Path, max_bytes: u64) -> io::Result<ReadLimited> {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ReadLimited::Missing),
        Err(e) => return Err(e),
    };

    let size = file.metadata()?.len();
    if size > max_bytes {
        return Ok(ReadLimited::TooLarge { size });
    }

    let mut content = String::with_capacity(size as usize);
    file.take(max_bytes).read_to_string(&mut content)?;
    Ok(ReadLimited::Content(content))
}

/// Result of `read_limited`.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadLimited {
    Missing,
    TooLarge { size: u64 },
    Content(String),
}

/// Remove a file, treating "not found" as success.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_parents_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("slot.json");

        write_atomic(&path, "json.tmp", b"{}").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
        assert!(!path.with_extension("json.tmp").exists());
    }

    /// A leftover temp file from a crash must not block the next save.
    #[test]
    fn test_write_atomic_overwrites_stale_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("slot.json");
        std::fs::write(path.with_extension("json.tmp"), b"garbage").unwrap();

        write_atomic(&path, "json.tmp", b"[1]").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[1]");
    }

    #[test]
    fn test_guard_removes_uncommitted_temp() {
        let dir = TempDir::new().unwrap();
        let tmp = dir.path().join("x.tmp");
        {
            let guard = TempFileGuard::new(tmp.clone());
            std::fs::write(guard.path(), b"partial").unwrap();
        }
        assert!(!tmp.exists());
    }

    #[test]
    fn test_read_limited_variants() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.json");

        assert_eq!(read_limited(&path, 16).unwrap(), ReadLimited::Missing);

        std::fs::write(&path, b"0123456789").unwrap();
        assert_eq!(
            read_limited(&path, 4).unwrap(),
            ReadLimited::TooLarge { size: 10 }
        );
        assert_eq!(
            read_limited(&path, 16).unwrap(),
            ReadLimited::Content("0123456789".to_string())
        );
    }

    #[test]
    fn test_remove_if_exists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.json");
        assert!(!remove_if_exists(&path).unwrap());
        std::fs::write(&path, b"1").unwrap();
        assert!(remove_if_exists(&path).unwrap());
        assert!(!path.exists());
    }
}
