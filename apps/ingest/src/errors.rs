use std::path::{Path, PathBuf};

use thiserror::Error;

/// Pipeline-level error type.
/// Only fatal conditions surface here; recoverable stage failures become
/// `Provenance::Fallback` on the stage result instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Analysis failed: {0}")]
    Analysis(String),
}

impl PipelineError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Short machine-readable code, logged alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::MissingInput(_) => "MISSING_INPUT",
            PipelineError::Io { .. } => "IO_ERROR",
            PipelineError::Json(_) => "JSON_ERROR",
            PipelineError::Analysis(_) => "ANALYSIS_ERROR",
        }
    }
}
