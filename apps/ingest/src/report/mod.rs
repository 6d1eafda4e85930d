//! Report stage: stats every artifact and writes `download_test_report.json`.

pub mod manifest;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analyze::schema::ValidationOutcome;
use crate::analyze::AnalysisResult;
use crate::errors::PipelineError;
use crate::extract::{ExtractionResult, METADATA_FILE};
use crate::fs_ops;
use crate::models::Provenance;
use crate::render::{self, GenerationResult, PreviewContent};
use crate::state::OutputLayout;

/// `{path, size}` for one artifact, `path` being site-relative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub size: u64,
}

/// Stats `path`, returning `None` when it does not exist.
pub async fn stat_entry(layout: &OutputLayout, path: &Path) -> Option<FileEntry> {
    fs_ops::file_size(path).await.map(|size| FileEntry {
        path: layout.public_url(path),
        size,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatStatus {
    pub available: bool,
    pub path: String,
    pub size: u64,
}

impl FormatStatus {
    async fn probe(layout: &OutputLayout, path: &Path) -> Self {
        match stat_entry(layout, path).await {
            Some(entry) => FormatStatus {
                available: true,
                path: entry.path,
                size: entry.size,
            },
            None => FormatStatus {
                available: false,
                path: layout.public_url(path),
                size: 0,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFormats {
    pub pdf: FormatStatus,
    pub text: FormatStatus,
    pub markdown: FormatStatus,
    pub json: FormatStatus,
    pub html: FormatStatus,
    pub cover_letter: FormatStatus,
    pub cover_letter_html: FormatStatus,
}

impl ReportFormats {
    fn all(&self) -> [&FormatStatus; 7] {
        [
            &self.pdf,
            &self.text,
            &self.markdown,
            &self.json,
            &self.html,
            &self.cover_letter,
            &self.cover_letter_html,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTests {
    pub all_formats_available: bool,
    pub total_size: u64,
    pub format_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionSummary {
    pub performed: bool,
    pub timestamp: DateTime<Utc>,
    pub cached: bool,
    pub content_fingerprint: String,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub performed: bool,
    pub timestamp: DateTime<Utc>,
    pub model: String,
    pub cached: bool,
    pub simulated: bool,
    pub fallback: bool,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    pub timestamp: DateTime<Utc>,
    pub formats: ReportFormats,
    pub tests: ReportTests,
    pub extraction: ExtractionSummary,
    pub analysis: AnalysisSummary,
    pub validation: ValidationOutcome,
}

#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub report_path: PathBuf,
    pub preview_path: PathBuf,
    pub report: TestReport,
}

pub struct ReportGenerator {
    layout: OutputLayout,
    pdf_path: PathBuf,
}

impl ReportGenerator {
    pub fn new(layout: OutputLayout, pdf_path: impl Into<PathBuf>) -> Self {
        Self {
            layout,
            pdf_path: pdf_path.into(),
        }
    }

    async fn formats(&self) -> ReportFormats {
        let l = &self.layout;
        ReportFormats {
            pdf: FormatStatus::probe(l, &self.pdf_path).await,
            text: FormatStatus::probe(l, &l.download(render::TEXT_FILE)).await,
            markdown: FormatStatus::probe(l, &l.download(render::MARKDOWN_FILE)).await,
            json: FormatStatus::probe(l, &l.download(render::JSON_FILE)).await,
            html: FormatStatus::probe(l, &l.download(render::HTML_FILE)).await,
            cover_letter: FormatStatus::probe(l, &l.download(render::COVER_LETTER_FILE)).await,
            cover_letter_html: FormatStatus::probe(l, &l.download(render::COVER_LETTER_HTML_FILE))
                .await,
        }
    }

    /// mtime of the extraction metadata, or the in-memory timestamp when the
    /// file cannot be stat'ed.
    async fn extraction_time(&self, extraction: &ExtractionResult) -> DateTime<Utc> {
        let path = self.layout.extracted(METADATA_FILE);
        match tokio::fs::metadata(&path).await.and_then(|m| m.modified()) {
            Ok(mtime) => DateTime::<Utc>::from(mtime),
            Err(e) => {
                warn!("Could not stat {}: {e}", path.display());
                extraction.extracted_at
            }
        }
    }

    pub async fn generate_report(
        &self,
        extraction: &ExtractionResult,
        analysis: &AnalysisResult,
        generation: &GenerationResult,
    ) -> Result<ReportOutcome, PipelineError> {
        info!("Generating download test report");

        let formats = self.formats().await;
        let available: Vec<&FormatStatus> =
            formats.all().into_iter().filter(|f| f.available).collect();
        let tests = ReportTests {
            all_formats_available: available.len() == formats.all().len(),
            total_size: available.iter().map(|f| f.size).sum(),
            format_count: available.len(),
        };

        if !generation.failed_formats.is_empty() {
            warn!(
                "Formats rendered as error placeholders: {}",
                generation.failed_formats.join(", ")
            );
        }

        let report = TestReport {
            timestamp: Utc::now(),
            tests,
            extraction: ExtractionSummary {
                performed: true,
                timestamp: self.extraction_time(extraction).await,
                cached: extraction.cached,
                content_fingerprint: extraction.content_fingerprint.clone(),
                provenance: extraction.provenance.clone(),
            },
            analysis: AnalysisSummary {
                performed: analysis.success,
                timestamp: analysis.validation_result.timestamp,
                model: analysis.model.clone(),
                cached: analysis.cached,
                simulated: analysis.simulated(),
                fallback: analysis.fallback(),
                provenance: analysis.provenance.clone(),
            },
            validation: analysis.validation_result.clone(),
            formats,
        };

        let report_path = self.layout.test_report();
        fs_ops::write_json(&report_path, &report).await?;
        info!("Download test report saved to {}", report_path.display());

        let preview_path = self.layout.preview_content();
        if !preview_path.exists() {
            warn!("Preview content missing, writing placeholder");
            fs_ops::write_json(&preview_path, &PreviewContent::placeholder()).await?;
        }

        Ok(ReportOutcome {
            report_path,
            preview_path,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FallbackReason;
    use crate::render::ContentGenerator;
    use tempfile::TempDir;

    fn extraction(layout: &OutputLayout) -> ExtractionResult {
        ExtractionResult {
            text: "JOHN DOE".into(),
            content_fingerprint: "abc".into(),
            path: layout.extracted("extracted_raw_text.txt"),
            cached: false,
            provenance: Provenance::Real,
            extracted_at: Utc::now(),
        }
    }

    fn analysis() -> AnalysisResult {
        AnalysisResult::sample(
            "abc".into(),
            "gpt-4o".into(),
            FallbackReason::MissingCredential,
            Provenance::Real,
        )
    }

    #[tokio::test]
    async fn test_report_counts_every_artifact() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path());
        layout.ensure_dirs().await.unwrap();
        tokio::fs::write(layout.default_pdf(), b"%PDF").await.unwrap();

        let analysis = analysis();
        let generation = ContentGenerator::new(&layout.downloads_dir, layout.preview_content())
            .generate_content(&analysis)
            .await
            .unwrap();

        let outcome = ReportGenerator::new(layout.clone(), layout.default_pdf())
            .generate_report(&extraction(&layout), &analysis, &generation)
            .await
            .unwrap();

        let report = &outcome.report;
        assert!(report.tests.all_formats_available);
        assert_eq!(report.tests.format_count, 7);
        assert_eq!(report.tests.total_size, generation.total_size + 4);
        assert_eq!(report.formats.pdf.path, "/default_resume.pdf");
        assert_eq!(report.formats.cover_letter_html.path, "/downloads/cover_letter.html");
        assert!(report.analysis.simulated);
        assert!(!report.analysis.fallback);
        assert!(report.analysis.provenance.is_fallback());

        let on_disk: serde_json::Value =
            serde_json::from_str(&tokio::fs::read_to_string(&outcome.report_path).await.unwrap())
                .unwrap();
        assert_eq!(on_disk["tests"]["allFormatsAvailable"], true);
        assert_eq!(on_disk["formats"]["coverLetterHtml"]["available"], true);
        assert_eq!(on_disk["extraction"]["contentFingerprint"], "abc");
        assert_eq!(on_disk["analysis"]["provenance"]["kind"], "fallback");
    }

    #[tokio::test]
    async fn test_missing_artifacts_are_reported() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path());
        layout.ensure_dirs().await.unwrap();

        let analysis = analysis();
        let generation = ContentGenerator::new(dir.path().join("elsewhere"), dir.path().join("p.json"))
            .generate_content(&analysis)
            .await
            .unwrap();

        let outcome = ReportGenerator::new(layout.clone(), layout.default_pdf())
            .generate_report(&extraction(&layout), &analysis, &generation)
            .await
            .unwrap();

        assert!(!outcome.report.tests.all_formats_available);
        assert_eq!(outcome.report.tests.format_count, 0);
        assert!(!outcome.report.formats.pdf.available);
        // No metadata file on disk, so the in-memory time is used.
        assert!(outcome.report.extraction.timestamp <= Utc::now());

        let preview: serde_json::Value =
            serde_json::from_str(&tokio::fs::read_to_string(&outcome.preview_path).await.unwrap())
                .unwrap();
        assert_eq!(preview["formats"]["text"], "Preview content not available");
    }
}
