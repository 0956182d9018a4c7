// Filesystem helpers.
// Atomic writes so readers never observe a half-written file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{FollowError, Result};

/// Write `contents` to `path` via a temporary sibling and a rename.
///
/// Parent directories are created as needed. On failure the temporary file is
/// removed and any previous file at `path` is left untouched.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| FollowError::write_failed(parent, e))?;
    }

    let temp_path = temp_sibling(path);
    let written = write_and_rename(&temp_path, path, contents);
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(FollowError::write_failed(path, e));
    }

    Ok(())
}

fn write_and_rename(temp_path: &Path, path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    fs::rename(temp_path, path)
}

/// Hidden, process-unique temp name in the same directory as `path`.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}
