//! Analysis stage: raw resume text to validated `StructuredResume`.
//!
//! Flow: cache lookup → LLM call (or simulated profile when no credential)
//!       → JSON parse → strict schema check with one repair → cache write
//!       → `resume_content_analyzed.json`.

pub mod cache;
pub mod insights;
pub mod prompts;
pub mod schema;
pub mod simulated;

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::PipelineError;
use crate::extract::ExtractionResult;
use crate::fs_ops;
use crate::llm_client::ChatModel;
use crate::models::{FallbackReason, Provenance, StructuredResume};

use cache::AnalysisCache;
use schema::ValidationOutcome;

// ────────────────────────────────────────────────────────────────────────────
// Result model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Mirrors `validation_result.success`.
    pub success: bool,
    pub data: StructuredResume,
    pub validation_result: ValidationOutcome,
    pub content_fingerprint: String,
    pub model: String,
    #[serde(default)]
    pub cached: bool,
    pub provenance: Provenance,
    /// Provenance of the text this analysis was run on.
    #[serde(default = "real")]
    pub source_provenance: Provenance,
}

fn real() -> Provenance {
    Provenance::Real
}

impl AnalysisResult {
    /// The canned profile, tagged with why it was used.
    pub fn sample(
        content_fingerprint: String,
        model: String,
        reason: FallbackReason,
        source_provenance: Provenance,
    ) -> Self {
        let check = schema::validate_resume(&simulated::simulated_resume());
        let data = check.data.unwrap_or_else(simulated::simulated_resume);
        AnalysisResult {
            success: check.outcome.success,
            data,
            validation_result: check.outcome,
            content_fingerprint,
            model,
            cached: false,
            provenance: Provenance::fallback(reason),
            source_provenance,
        }
    }

    /// True when the data is the canned profile rather than model output.
    pub fn simulated(&self) -> bool {
        self.provenance.is_fallback()
    }

    /// True when the data did not pass strict validation.
    pub fn fallback(&self) -> bool {
        !self.success
    }

    /// First fallback in the chain, extraction before analysis.
    pub fn notice(&self) -> Option<&FallbackReason> {
        self.source_provenance
            .reason()
            .or_else(|| self.provenance.reason())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Analyzer
// ────────────────────────────────────────────────────────────────────────────

pub struct Analyzer {
    llm: Option<Arc<dyn ChatModel>>,
    cache: AnalysisCache,
    output_dir: PathBuf,
    model: String,
}

impl Analyzer {
    /// `llm` is `None` when no credential is configured; `model` is the name
    /// recorded in results in that case.
    pub fn new(
        llm: Option<Arc<dyn ChatModel>>,
        cache: AnalysisCache,
        output_dir: impl Into<PathBuf>,
        model: impl Into<String>,
    ) -> Self {
        let model = llm
            .as_ref()
            .map(|l| l.model().to_string())
            .unwrap_or_else(|| model.into());
        Self {
            llm,
            cache,
            output_dir: output_dir.into(),
            model,
        }
    }

    pub async fn analyze_content(
        &self,
        extraction: &ExtractionResult,
    ) -> Result<AnalysisResult, PipelineError> {
        if extraction.text.trim().is_empty() {
            return Err(PipelineError::Analysis(
                "extracted text is empty; nothing to analyze".to_string(),
            ));
        }

        let fp = &extraction.content_fingerprint;
        info!("Analyzing content with fingerprint: {}", crate::extract::fingerprint::short(fp));

        let result = match self.cache.get(fp).await {
            Some(mut hit) => {
                info!("Using cached analysis result");
                hit.cached = true;
                hit.source_provenance = extraction.provenance.clone();
                hit
            }
            None => self.fresh_analysis(extraction).await,
        };

        let analyzed_path = self.output_dir.join(insights::ANALYZED_FILE);
        fs_ops::write_json(
            &analyzed_path,
            &insights::analyzed_document(&result, &extraction.text),
        )
        .await?;
        info!("Saved analyzed content to {}", analyzed_path.display());

        Ok(result)
    }

    async fn fresh_analysis(&self, extraction: &ExtractionResult) -> AnalysisResult {
        let fp = extraction.content_fingerprint.clone();
        let source = extraction.provenance.clone();
        let fall_back = |reason: FallbackReason| {
            warn!("Using simulated analysis: {reason}");
            AnalysisResult::sample(fp.clone(), self.model.clone(), reason, source.clone())
        };

        let Some(llm) = &self.llm else {
            return fall_back(FallbackReason::MissingCredential);
        };

        info!("Sending content to {} for analysis", llm.model());
        let reply = match llm
            .complete_json(&prompts::analysis_system(), &prompts::analysis_prompt(&extraction.text))
            .await
        {
            Ok(reply) => reply,
            Err(e) => return fall_back(FallbackReason::LlmRequestFailed(e.to_string())),
        };

        let value: Value = match serde_json::from_str(&reply) {
            Ok(v) => v,
            Err(e) => return fall_back(FallbackReason::UnparseableResponse(e.to_string())),
        };

        let check = schema::validate(&value);
        let data = match check.data {
            Some(data) => {
                info!("Content validation successful");
                data
            }
            None => {
                warn!(
                    "Content validation failed: {}",
                    check.outcome.error.as_deref().unwrap_or("unknown")
                );
                match serde_json::from_value::<StructuredResume>(value) {
                    Ok(data) => data,
                    Err(e) => return fall_back(FallbackReason::UnusableResponse(e.to_string())),
                }
            }
        };

        debug!("Structured content: {:#?}", data);

        let result = AnalysisResult {
            success: check.outcome.success,
            data,
            validation_result: check.outcome,
            content_fingerprint: fp.clone(),
            model: self.model.clone(),
            cached: false,
            provenance: Provenance::Real,
            source_provenance: source.clone(),
        };
        self.cache.put(&fp, &result).await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct FakeModel {
        reply: Result<String, u16>,
        calls: AtomicUsize,
    }

    impl FakeModel {
        fn replying(body: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(body.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ChatModel for FakeModel {
        fn model(&self) -> &str {
            "fake-model"
        }

        async fn complete_json(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(body) => Ok(body.clone()),
                Err(status) => Err(LlmError::Api {
                    status: *status,
                    message: "boom".into(),
                }),
            }
        }
    }

    const VALID_REPLY: &str = r#"{
        "name": "Jane Roe",
        "summary": "Platform engineer",
        "skills": ["Rust", "Kubernetes"],
        "experience": [{"title": "Engineer", "company": "Acme", "period": "2019 - 2024",
                        "responsibilities": ["Ran the build farm"]}],
        "education": [{"degree": "BSc Physics", "institution": "State U", "period": "2015 - 2019"}],
        "contact": {"email": "jane@example.com"}
    }"#;

    fn extraction(text: &str) -> ExtractionResult {
        ExtractionResult {
            text: text.to_string(),
            content_fingerprint: crate::extract::fingerprint(text.as_bytes()),
            path: PathBuf::from("extracted_raw_text.txt"),
            cached: false,
            provenance: Provenance::Real,
            extracted_at: Utc::now(),
        }
    }

    fn analyzer(dir: &TempDir, llm: Option<Arc<dyn ChatModel>>) -> Analyzer {
        Analyzer::new(
            llm,
            AnalysisCache::new(dir.path().join("cache"), true),
            dir.path().join("extracted"),
            "gpt-4o",
        )
    }

    #[tokio::test]
    async fn test_no_credential_gives_simulated_profile() {
        let dir = TempDir::new().unwrap();
        let result = analyzer(&dir, None)
            .analyze_content(&extraction("JANE ROE\nEngineer"))
            .await
            .unwrap();

        assert!(result.simulated());
        assert!(result.success);
        assert_eq!(result.data.name, simulated::SIMULATED_NAME);
        assert_eq!(result.model, "gpt-4o");
        assert_eq!(
            result.provenance.reason(),
            Some(&FallbackReason::MissingCredential)
        );
        assert!(dir.path().join("extracted").join(insights::ANALYZED_FILE).exists());
        // Simulated output is never cached.
        assert!(!dir.path().join("cache").exists());
    }

    #[tokio::test]
    async fn test_valid_reply_is_cached_and_reused() {
        let dir = TempDir::new().unwrap();
        let model = FakeModel::replying(VALID_REPLY);
        let analyzer = analyzer(&dir, Some(model.clone()));
        let input = extraction("JANE ROE\nEngineer");

        let first = analyzer.analyze_content(&input).await.unwrap();
        assert!(first.success);
        assert!(!first.cached);
        assert!(!first.simulated());
        assert_eq!(first.data.name, "Jane Roe");
        assert_eq!(first.model, "fake-model");

        let second = analyzer.analyze_content(&input).await.unwrap();
        assert!(second.cached);
        assert_eq!(second.data, first.data);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_request_failure_falls_back() {
        let dir = TempDir::new().unwrap();
        let result = analyzer(&dir, Some(FakeModel::failing(400)))
            .analyze_content(&extraction("text"))
            .await
            .unwrap();
        assert!(matches!(
            result.provenance.reason(),
            Some(FallbackReason::LlmRequestFailed(_))
        ));
        assert_eq!(result.data.name, simulated::SIMULATED_NAME);
    }

    #[tokio::test]
    async fn test_non_json_reply_falls_back() {
        let dir = TempDir::new().unwrap();
        let result = analyzer(&dir, Some(FakeModel::replying("Sure! Here is the resume")))
            .analyze_content(&extraction("text"))
            .await
            .unwrap();
        assert!(matches!(
            result.provenance.reason(),
            Some(FallbackReason::UnparseableResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_but_decodable_reply_passes_through() {
        let dir = TempDir::new().unwrap();
        let result = analyzer(
            &dir,
            Some(FakeModel::replying(r#"{"name": "Jane Roe", "skills": []}"#)),
        )
        .analyze_content(&extraction("text"))
        .await
        .unwrap();

        assert!(!result.success);
        assert!(result.fallback());
        assert!(!result.simulated());
        assert_eq!(result.data.name, "Jane Roe");
        assert!(result.validation_result.error.is_some());
        assert!(dir.path().join("cache").join(format!("{}.json", result.content_fingerprint)).exists());
    }

    #[tokio::test]
    async fn test_undecodable_reply_falls_back() {
        let dir = TempDir::new().unwrap();
        let result = analyzer(&dir, Some(FakeModel::replying("42")))
            .analyze_content(&extraction("text"))
            .await
            .unwrap();
        assert!(matches!(
            result.provenance.reason(),
            Some(FallbackReason::UnusableResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_skills_object_is_repaired() {
        let dir = TempDir::new().unwrap();
        let mut value: Value = serde_json::from_str(VALID_REPLY).unwrap();
        value["skills"] = serde_json::json!({"technical": ["Rust"], "soft": ["Patience"]});
        let result = analyzer(&dir, Some(FakeModel::replying(&value.to_string())))
            .analyze_content(&extraction("text"))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.validation_result.repaired);
        assert_eq!(result.data.skills, ["Rust"]);
    }

    #[tokio::test]
    async fn test_empty_text_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = analyzer(&dir, None)
            .analyze_content(&extraction("   \n"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Analysis(_)));
    }

    #[test]
    fn test_notice_prefers_extraction_fallback() {
        let result = AnalysisResult::sample(
            "fp".into(),
            "gpt-4o".into(),
            FallbackReason::MissingCredential,
            Provenance::fallback(FallbackReason::PdfLibraryFailed("bad xref".into())),
        );
        assert!(matches!(result.notice(), Some(FallbackReason::PdfLibraryFailed(_))));
    }
}
