use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Returns the staging path used while `path` is being written: the same
/// file stem with a `.tmp` extension, in the same directory.
pub fn temp_path_for(path: &Path) -> PathBuf {
    path.with_extension("tmp")
}

/// Writes text using a temp file + rename so readers never observe partial data.
///
/// The temporary file lives next to the destination (see [`temp_path_for`]) so
/// the final rename never crosses a filesystem boundary.
pub fn write_text_atomic(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        bail!("destination path cannot be empty");
    }
    if path.is_dir() {
        bail!("destination path '{}' is a directory", path.display());
    }
    if path.extension().and_then(|ext| ext.to_str()) == Some("tmp") {
        bail!(
            "destination path '{}' collides with its own staging file",
            path.display()
        );
    }

    let parent_dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent_dir)
        .with_context(|| format!("failed to create {}", parent_dir.display()))?;

    let temp_path = temp_path_for(path);
    std::fs::write(&temp_path, content)
        .with_context(|| format!("failed to write temporary file {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path).with_context(|| {
        format!(
            "failed to rename temporary file {} to {}",
            temp_path.display(),
            path.display()
        )
    })?;
    Ok(())
}
