//! Extraction stage: PDF bytes to raw text, keyed by content fingerprint.
//!
//! Flow: read bytes → fingerprint → (cache hit? return stored text) →
//!       pdf-extract on a blocking thread → sample text on failure →
//!       write raw text, metadata, fingerprint and compatibility copies.

pub mod fingerprint;
pub mod pdf;
pub mod sample;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::PipelineError;
use crate::fs_ops;
use crate::models::{FallbackReason, Provenance};

pub use fingerprint::fingerprint;

pub const RAW_TEXT_FILE: &str = "extracted_raw_text.txt";
pub const METADATA_FILE: &str = "extraction_metadata.json";
pub const FINGERPRINT_FILE: &str = "content_fingerprint.txt";
const COMPAT_TEXT_FILE: &str = "resume_content.txt";
const COMPAT_MARKDOWN_FILE: &str = "resume_content.md";

/// Output of the extraction stage. Persisted only through the metadata file.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub text: String,
    pub content_fingerprint: String,
    /// Where the raw text was written.
    pub path: PathBuf,
    pub cached: bool,
    pub provenance: Provenance,
    pub extracted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionMethod {
    #[serde(rename = "pdf-extract")]
    PdfExtract,
    #[serde(rename = "simulated")]
    Simulated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMetadata {
    pub source: String,
    pub extraction_date: DateTime<Utc>,
    pub content_fingerprint: String,
    pub raw_text_length: usize,
    pub extraction_method: ExtractionMethod,
    pub provenance: Provenance,
}

#[derive(Debug, Serialize, Deserialize)]
struct MetadataFile {
    metadata: ExtractionMetadata,
}

pub struct PdfExtractor {
    output_dir: PathBuf,
}

impl PdfExtractor {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn out(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    pub async fn extract_text(
        &self,
        pdf_path: &Path,
        force_refresh: bool,
    ) -> Result<ExtractionResult, PipelineError> {
        info!("Extracting text from PDF: {}", display_name(pdf_path));

        if !pdf_path.is_file() {
            return Err(PipelineError::MissingInput(pdf_path.to_path_buf()));
        }

        let bytes = tokio::fs::read(pdf_path)
            .await
            .map_err(|e| PipelineError::io(pdf_path, e))?;
        let content_fingerprint = fingerprint(&bytes);
        info!(
            "Generated content fingerprint: {}",
            fingerprint::short(&content_fingerprint)
        );

        if !force_refresh {
            if let Some(cached) = self.cached_extraction(&content_fingerprint).await {
                info!("PDF content unchanged, using existing extraction");
                return Ok(cached);
            }
        }

        let extracted = tokio::task::spawn_blocking(move || pdf::extract_text(&bytes))
            .await
            .map_err(|e| pdf::ExtractError::Panicked(e.to_string()))
            .and_then(|r| r);

        let (text, method, provenance) = match extracted {
            Ok(text) => {
                info!("Extracted {} bytes of text with pdf-extract", text.len());
                (text, ExtractionMethod::PdfExtract, Provenance::Real)
            }
            Err(e) => {
                warn!("PDF text extraction failed: {e}. Using sample resume text.");
                (
                    sample::SAMPLE_RESUME_TEXT.to_string(),
                    ExtractionMethod::Simulated,
                    Provenance::fallback(FallbackReason::PdfLibraryFailed(e.to_string())),
                )
            }
        };

        let extracted_at = Utc::now();
        let metadata = ExtractionMetadata {
            source: display_name(pdf_path),
            extraction_date: extracted_at,
            content_fingerprint: content_fingerprint.clone(),
            raw_text_length: text.len(),
            extraction_method: method,
            provenance: provenance.clone(),
        };

        let raw_text_path = self.out(RAW_TEXT_FILE);
        fs_ops::write_text(&raw_text_path, &text).await?;
        fs_ops::write_json(&self.out(METADATA_FILE), &MetadataFile { metadata }).await?;
        fs_ops::write_text(&self.out(FINGERPRINT_FILE), &content_fingerprint).await?;
        fs_ops::write_text(&self.out(COMPAT_TEXT_FILE), &text).await?;
        fs_ops::write_text(&self.out(COMPAT_MARKDOWN_FILE), &compat_markdown(&text)).await?;

        info!("Text extraction completed ({})", provenance);

        Ok(ExtractionResult {
            text,
            content_fingerprint,
            path: raw_text_path,
            cached: false,
            provenance,
            extracted_at,
        })
    }

    /// Returns the stored extraction when the fingerprint file matches and
    /// the raw text and metadata are both readable. Anything else is a miss.
    async fn cached_extraction(&self, content_fingerprint: &str) -> Option<ExtractionResult> {
        let stored = fs_ops::read_text(&self.out(FINGERPRINT_FILE)).await.ok()?;
        if stored.trim() != content_fingerprint {
            debug!("Fingerprint changed, re-extracting");
            return None;
        }

        let raw_text_path = self.out(RAW_TEXT_FILE);
        let text = fs_ops::read_text(&raw_text_path).await.ok()?;
        let metadata: MetadataFile = fs_ops::read_text(&self.out(METADATA_FILE))
            .await
            .ok()
            .and_then(|body| serde_json::from_str(&body).ok())?;

        Some(ExtractionResult {
            text,
            content_fingerprint: content_fingerprint.to_string(),
            path: raw_text_path,
            cached: true,
            provenance: metadata.metadata.provenance,
            extracted_at: metadata.metadata.extraction_date,
        })
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `# <first line>` followed by the remaining lines.
fn compat_markdown(text: &str) -> String {
    let mut lines = text.split('\n');
    let first = lines.next().unwrap_or_default();
    let rest = lines.collect::<Vec<_>>().join("\n");
    format!("# {first}\n\n{rest}\n")
}
