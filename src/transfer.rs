// Local transfer layer: the only place that touches the local filesystem
// on behalf of a download. Every failure is a `LocalWriteError`.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::CliError;

/// Fail when something already exists at `path` and overwriting is off.
/// Presence is all that matters; contents are never compared.
pub fn ensure_writable(path: &Path, overwrite: bool) -> Result<(), CliError> {
    if !overwrite && fs::symlink_metadata(path).is_ok() {
        return Err(CliError::local_write(format!(
            "file already exists: {} (use --overwrite to replace)",
            path.display()
        )));
    }
    Ok(())
}

/// Local path for a remote file `rel` inside the download root `out`.
/// Only plain name components are accepted, so nothing lands outside `out`.
pub fn local_target(out: &Path, rel: &str) -> Result<PathBuf, CliError> {
    let rel = Path::new(rel);
    let contained = rel.components().next().is_some()
        && rel.components().all(|c| matches!(c, Component::Normal(_)));
    if !contained {
        return Err(CliError::local_write(format!(
            "refusing to write {} outside {}",
            rel.display(),
            out.display()
        )));
    }
    Ok(out.join(rel))
}

/// Write `data` to `path`, creating missing parent directories.
pub fn write_file(path: &Path, data: &[u8]) -> Result<(), CliError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| {
            CliError::local_write(format!("failed to create directory: {}", dir.display())).with_source(e)
        })?;
    }
    fs::write(path, data)
        .map_err(|e| CliError::local_write(format!("failed to write file: {}", path.display())).with_source(e))?;
    debug!(path = %path.display(), bytes = data.len(), "wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Category;

    #[test]
    fn existing_file_blocks_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a.txt");
        fs::write(&target, "old").unwrap();

        let err = ensure_writable(&target, false).unwrap_err();
        assert_eq!(err.category, Category::LocalWriteError);
        assert!(ensure_writable(&target, true).is_ok());
        assert!(ensure_writable(&dir.path().join("missing.txt"), false).is_ok());
    }

    #[test]
    fn write_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/deeper/a.txt");
        write_file(&target, b"hello").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"hello");

        // Idempotent directory creation.
        write_file(&target, b"again").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"again");
    }

    #[test]
    fn targets_stay_under_the_download_root() {
        let out = Path::new("out");
        assert_eq!(local_target(out, "a/b.md").unwrap(), out.join("a/b.md"));

        for rel in ["../escape.md", "a/../../escape.md", "/etc/passwd", "./a.md", ""] {
            let err = local_target(out, rel).unwrap_err();
            assert_eq!(err.category, Category::LocalWriteError, "{rel:?}");
        }
    }

    #[test]
    fn write_into_a_file_parent_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let err = write_file(&blocker.join("child.txt"), b"data").unwrap_err();
        assert_eq!(err.category, Category::LocalWriteError);
    }
}
