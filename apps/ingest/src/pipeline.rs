//! Runs Extract → Analyze → Generate → Report → Manifest strictly in order,
//! handing typed results from one stage to the next in memory.

use std::path::PathBuf;

use tracing::{info, info_span, Instrument};

use crate::analyze::cache::AnalysisCache;
use crate::analyze::{AnalysisResult, Analyzer};
use crate::errors::PipelineError;
use crate::extract::{ExtractionResult, PdfExtractor};
use crate::render::{ContentGenerator, GenerationResult};
use crate::report::manifest::{write_content_manifest, ContentManifest};
use crate::report::{ReportGenerator, ReportOutcome};
use crate::state::PipelineState;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Overrides `<public>/default_resume.pdf`.
    pub pdf: Option<PathBuf>,
    pub force_refresh: bool,
}

#[derive(Debug)]
pub struct PipelineSummary {
    pub extraction: ExtractionResult,
    pub analysis: AnalysisResult,
    pub generation: GenerationResult,
    pub report: ReportOutcome,
    pub manifest: ContentManifest,
}

pub struct Pipeline {
    state: PipelineState,
}

impl Pipeline {
    pub fn new(state: PipelineState) -> Self {
        Self { state }
    }

    fn pdf_path(&self, opts: &RunOptions) -> PathBuf {
        opts.pdf
            .clone()
            .unwrap_or_else(|| self.state.layout.default_pdf())
    }

    fn analyzer(&self) -> Analyzer {
        let config = &self.state.config;
        Analyzer::new(
            self.state.llm.clone(),
            AnalysisCache::new(&config.cache_dir, config.cache_enabled),
            &self.state.layout.extracted_dir,
            &config.openai_model,
        )
    }

    /// Extraction stage on its own.
    pub async fn extract(&self, opts: &RunOptions) -> Result<ExtractionResult, PipelineError> {
        let layout = &self.state.layout;
        layout.ensure_dirs().await?;
        let pdf = self.pdf_path(opts);
        PdfExtractor::new(&layout.extracted_dir)
            .extract_text(&pdf, opts.force_refresh)
            .instrument(info_span!("extract"))
            .await
    }

    pub async fn run(&self, opts: &RunOptions) -> Result<PipelineSummary, PipelineError> {
        let layout = &self.state.layout;
        layout.ensure_dirs().await?;

        let pdf = self.pdf_path(opts);
        if !pdf.is_file() {
            return Err(PipelineError::MissingInput(pdf));
        }
        info!("Processing {}", pdf.display());

        let extraction = PdfExtractor::new(&layout.extracted_dir)
            .extract_text(&pdf, opts.force_refresh)
            .instrument(info_span!("extract"))
            .await?;

        let analysis = self
            .analyzer()
            .analyze_content(&extraction)
            .instrument(info_span!("analyze"))
            .await?;

        let generation = ContentGenerator::new(&layout.downloads_dir, layout.preview_content())
            .generate_content(&analysis)
            .instrument(info_span!("generate"))
            .await?;

        let report = ReportGenerator::new(layout.clone(), &pdf)
            .generate_report(&extraction, &analysis, &generation)
            .instrument(info_span!("report"))
            .await?;

        let manifest = write_content_manifest(layout, &pdf)
            .instrument(info_span!("manifest"))
            .await?;

        let summary = PipelineSummary {
            extraction,
            analysis,
            generation,
            report,
            manifest,
        };
        summary.log();
        Ok(summary)
    }
}

impl PipelineSummary {
    fn log(&self) {
        info!("Generated download formats: {}", self.generation.format_count);
        info!("Total size: {} bytes", self.generation.total_size);
        info!(
            "All formats available: {}",
            if self.report.report.tests.all_formats_available { "Yes" } else { "No" }
        );
        info!("Download test report saved to: {}", self.report.report_path.display());
        info!("Preview content saved to: {}", self.report.preview_path.display());
        info!("Extraction: {}", self.extraction.provenance);
        info!("Analysis: {}", self.analysis.provenance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::render;
    use tempfile::TempDir;

    fn state(dir: &TempDir) -> PipelineState {
        let config = Config {
            public_dir: dir.path().join("public"),
            cache_dir: dir.path().join("cache"),
            ..Config::default()
        };
        PipelineState::from_config(config).unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_without_credential() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);
        let layout = state.layout.clone();
        tokio::fs::create_dir_all(&layout.public_dir).await.unwrap();
        tokio::fs::write(layout.default_pdf(), b"not really a pdf").await.unwrap();

        let summary = Pipeline::new(state).run(&RunOptions::default()).await.unwrap();

        assert!(summary.analysis.simulated());
        assert_eq!(summary.analysis.data.name, "John Doe");
        for name in [
            render::TEXT_FILE,
            render::MARKDOWN_FILE,
            render::JSON_FILE,
            render::HTML_FILE,
            render::COVER_LETTER_FILE,
            render::COVER_LETTER_HTML_FILE,
        ] {
            assert!(layout.download(name).is_file(), "{name} missing");
        }
        assert!(layout.test_report().is_file());
        assert!(layout.content_manifest().is_file());

        let report: serde_json::Value = serde_json::from_str(
            &tokio::fs::read_to_string(layout.test_report()).await.unwrap(),
        )
        .unwrap();
        assert_eq!(report["tests"]["allFormatsAvailable"], true);
        assert_eq!(report["tests"]["formatCount"], 7);
        assert_eq!(summary.manifest.downloads.len(), 6);
    }

    #[tokio::test]
    async fn test_rerun_reuses_extraction() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);
        tokio::fs::create_dir_all(&state.layout.public_dir).await.unwrap();
        tokio::fs::write(state.layout.default_pdf(), b"same bytes").await.unwrap();
        let pipeline = Pipeline::new(state);

        let first = pipeline.run(&RunOptions::default()).await.unwrap();
        let second = pipeline.run(&RunOptions::default()).await.unwrap();

        assert!(!first.extraction.cached);
        assert!(second.extraction.cached);
        assert_eq!(first.extraction.content_fingerprint, second.extraction.content_fingerprint);
        // Simulated analysis is never cached.
        assert!(!second.analysis.cached);
        assert_ne!(first.manifest.run_id, second.manifest.run_id);
    }

    #[tokio::test]
    async fn test_missing_pdf_fails_before_any_artifact() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);
        let layout = state.layout.clone();

        let err = Pipeline::new(state)
            .run(&RunOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::MissingInput(_)));
        assert!(!layout.test_report().exists());
        assert!(!layout.download(render::TEXT_FILE).exists());
        assert!(!layout.extracted(crate::extract::RAW_TEXT_FILE).exists());
    }

    #[tokio::test]
    async fn test_explicit_pdf_path_is_used() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);
        let pdf = dir.path().join("elsewhere.pdf");
        tokio::fs::write(&pdf, b"other bytes").await.unwrap();

        let extraction = Pipeline::new(state)
            .extract(&RunOptions {
                pdf: Some(pdf),
                force_refresh: false,
            })
            .await
            .unwrap();
        assert_eq!(extraction.content_fingerprint, crate::extract::fingerprint(b"other bytes"));
    }
}
