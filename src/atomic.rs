//! Staged file writes
//!
//! Record files are never written in place. Data goes to a temp file in the
//! destination directory, is flushed, and is then renamed over the target,
//! so readers see either the old file or the new one.
//!
//! Relocation between directories (active to archive) is a staged write of
//! the destination followed by removal of the source. The two steps are not
//! one atomic operation; a source that has already disappeared after the
//! destination was written counts as a completed relocation.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::Result;

/// Atomically write data to a file, creating parent directories as needed.
pub fn write_atomic(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    // Temp file must live in the same directory for the rename to be atomic
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;

    Ok(())
}

/// Atomically write string data to a file
pub fn write_atomic_str(path: impl AsRef<Path>, data: &str) -> Result<()> {
    write_atomic(path, data.as_bytes())
}

/// Write `data` to `dest`, then remove `source`.
///
/// When `source` and `dest` are the same path this is a plain rewrite.
pub fn relocate(source: impl AsRef<Path>, dest: impl AsRef<Path>, data: &str) -> Result<()> {
    let source = source.as_ref();
    let dest = dest.as_ref();

    write_atomic_str(dest, data)?;
    if source == dest {
        return Ok(());
    }

    match fs::remove_file(source) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(source = %source.display(), "source already removed after relocation");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nested").join("test.md");

        write_atomic_str(&file_path, "hello").unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "hello");

        write_atomic_str(&file_path, "world").unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "world");

        // No stray temp files left behind
        let entries: Vec<_> = fs::read_dir(file_path.parent().unwrap())
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn relocate_moves_file() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("board").join("task-1.md");
        let dest = temp_dir.path().join("logs").join("task-1.md");
        write_atomic_str(&source, "old").unwrap();

        relocate(&source, &dest, "new").unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
    }

    #[test]
    fn relocate_tolerates_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("gone.md");
        let dest = temp_dir.path().join("logs").join("gone.md");

        relocate(&source, &dest, "data").unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "data");
    }

    #[test]
    fn relocate_same_path_is_rewrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("task-1.md");
        write_atomic_str(&path, "v1").unwrap();

        relocate(&path, &path, "v2").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "v2");
    }
}
