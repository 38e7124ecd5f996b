use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

/// Moves `path` into `dir` and returns the new location.
///
/// `dir` is created when missing. The base name is kept when it is free;
/// otherwise the file lands under `{stem}.{n}.{ext}` with the smallest free
/// `n`, so earlier files in `dir` are never replaced.
pub fn move_into_dir(path: &Path, dir: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("path '{}' has no file name", path.display()))?;
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let destination = free_destination(dir, Path::new(file_name));
    std::fs::rename(path, &destination).with_context(|| {
        format!(
            "failed to move {} to {}",
            path.display(),
            destination.display()
        )
    })?;
    Ok(destination)
}

fn free_destination(dir: &Path, file_name: &Path) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }
    let stem = file_name.file_stem().unwrap_or(file_name.as_os_str());
    let extension = file_name.extension();
    (1u64..)
        .map(|n| {
            let mut name = OsString::from(stem);
            name.push(format!(".{n}"));
            if let Some(extension) = extension {
                name.push(".");
                name.push(extension);
            }
            dir.join(name)
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or(candidate)
}
