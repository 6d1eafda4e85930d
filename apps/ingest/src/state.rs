use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::errors::PipelineError;
use crate::fs_ops;
use crate::llm_client::{ChatModel, OpenAiClient};

pub const DEFAULT_RESUME_PDF: &str = "default_resume.pdf";

/// Every path the pipeline reads or writes, derived from the public dir.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub public_dir: PathBuf,
    pub extracted_dir: PathBuf,
    pub downloads_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        let public_dir = public_dir.into();
        OutputLayout {
            extracted_dir: public_dir.join("extracted"),
            downloads_dir: public_dir.join("downloads"),
            public_dir,
        }
    }

    pub fn default_pdf(&self) -> PathBuf {
        self.public_dir.join(DEFAULT_RESUME_PDF)
    }

    pub fn download(&self, file_name: &str) -> PathBuf {
        self.downloads_dir.join(file_name)
    }

    pub fn extracted(&self, file_name: &str) -> PathBuf {
        self.extracted_dir.join(file_name)
    }

    pub fn test_report(&self) -> PathBuf {
        self.public_dir.join("download_test_report.json")
    }

    pub fn content_manifest(&self) -> PathBuf {
        self.public_dir.join("content_manifest.json")
    }

    pub fn preview_content(&self) -> PathBuf {
        self.download("preview_content.json")
    }

    /// Site-relative URL path for a file under the public dir, e.g.
    /// `/downloads/resume.txt`. Files outside it keep their path as given.
    pub fn public_url(&self, path: &Path) -> String {
        let Ok(relative) = path.strip_prefix(&self.public_dir) else {
            return path.display().to_string();
        };
        let joined = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        format!("/{joined}")
    }

    pub async fn ensure_dirs(&self) -> Result<(), PipelineError> {
        for dir in [&self.public_dir, &self.extracted_dir, &self.downloads_dir] {
            fs_ops::ensure_dir(dir).await?;
        }
        Ok(())
    }
}

/// Shared handles injected into each stage.
#[derive(Clone)]
pub struct PipelineState {
    pub config: Config,
    pub layout: OutputLayout,
    /// `None` when no credential is configured; analysis is then simulated.
    pub llm: Option<Arc<dyn ChatModel>>,
}

impl PipelineState {
    pub fn from_config(config: Config) -> Result<Self, PipelineError> {
        let llm: Option<Arc<dyn ChatModel>> = match &config.openai_api_key {
            Some(key) => Some(Arc::new(OpenAiClient::new(
                key.clone(),
                config.openai_model.clone(),
                config.openai_base_url.clone(),
                std::time::Duration::from_secs(config.llm_timeout_secs),
            )
            .map_err(|e| PipelineError::Analysis(format!("Failed to build LLM client: {e}")))?)),
            None => None,
        };

        Ok(PipelineState {
            layout: OutputLayout::new(&config.public_dir),
            config,
            llm,
        })
    }
}
