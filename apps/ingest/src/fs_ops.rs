//! File helpers shared by every stage. All errors carry the offending path.

use std::path::Path;

use serde::Serialize;
use tokio::fs;
use tracing::debug;

use crate::errors::PipelineError;

pub async fn ensure_dir(path: &Path) -> Result<(), PipelineError> {
    if !path.exists() {
        fs::create_dir_all(path)
            .await
            .map_err(|e| PipelineError::io(path, e))?;
        debug!("Created directory: {}", path.display());
    }
    Ok(())
}

pub async fn write_text(path: &Path, content: &str) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }
    fs::write(path, content)
        .await
        .map_err(|e| PipelineError::io(path, e))?;
    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Pretty-printed with two-space indentation, matching the files the site
/// already consumes.
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PipelineError> {
    let body = serde_json::to_string_pretty(value)?;
    write_text(path, &body).await
}

pub async fn read_text(path: &Path) -> Result<String, PipelineError> {
    fs::read_to_string(path)
        .await
        .map_err(|e| PipelineError::io(path, e))
}

/// Size in bytes, or `None` when the file does not exist.
pub async fn file_size(path: &Path) -> Option<u64> {
    match fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Some(meta.len()),
        _ => None,
    }
}
