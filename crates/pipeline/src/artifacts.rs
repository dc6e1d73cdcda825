//! Writes run artifacts to disk.

use crate::preset::Artifacts;
use newsdesk_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

pub const BRIEF_FILE: &str = "brief.md";
pub const POST_FILE: &str = "linkedin_post.md";
pub const IMAGE_ALT_FILE: &str = "image_alt.txt";

/// Write artifacts into `dir`, overwriting previous files. An `image_alt.txt`
/// left by an earlier run is removed when this run has no alt text. Returns
/// the paths written.
pub fn save_artifacts(dir: &Path, artifacts: &Artifacts) -> AppResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| {
        AppError::Other(format!(
            "Failed to create artifacts directory {:?}: {}",
            dir, e
        ))
    })?;

    let mut files = vec![
        (dir.join(BRIEF_FILE), artifacts.brief.as_str()),
        (dir.join(POST_FILE), artifacts.social_post.as_str()),
    ];
    if let Some(alt) = &artifacts.image_alt {
        files.push((dir.join(IMAGE_ALT_FILE), alt.as_str()));
    }

    if artifacts.image_alt.is_none() {
        let stale = dir.join(IMAGE_ALT_FILE);
        if stale.exists() {
            std::fs::remove_file(&stale)
                .map_err(|e| AppError::Other(format!("Failed to remove {:?}: {}", stale, e)))?;
            tracing::debug!("Removed stale artifact {:?}", stale);
        }
    }

    let mut written = Vec::with_capacity(files.len());
    for (path, contents) in files {
        std::fs::write(&path, contents)
            .map_err(|e| AppError::Other(format!("Failed to write {:?}: {}", path, e)))?;
        tracing::debug!("Wrote artifact {:?}", path);
        written.push(path);
    }

    Ok(written)
}
