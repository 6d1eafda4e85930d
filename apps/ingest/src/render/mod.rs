//! Generation stage: `StructuredResume` to six download formats.
//!
//! Each format renders independently; a failure in one becomes a visible
//! placeholder for that format and never aborts the others.

pub mod cover_letter;
pub mod html;
pub mod markdown;
pub mod text;

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::analyze::AnalysisResult;
use crate::errors::PipelineError;
use crate::fs_ops;
use crate::models::FallbackReason;

pub const TEXT_FILE: &str = "resume.txt";
pub const MARKDOWN_FILE: &str = "resume.md";
pub const JSON_FILE: &str = "resume.json";
pub const HTML_FILE: &str = "resume.html";
pub const COVER_LETTER_FILE: &str = "cover_letter.md";
pub const COVER_LETTER_HTML_FILE: &str = "cover_letter.html";
pub const PREVIEW_FILE: &str = "preview_content.json";
const PREVIEW_UNAVAILABLE: &str = "Preview content not available";

/// Text shown in every human-readable artifact built from fallback data.
pub fn notice_text(reason: &FallbackReason) -> String {
    format!("This document was generated from fallback data: {reason}.")
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFormats {
    pub text: String,
    pub markdown: String,
    pub json: String,
    pub html: String,
    pub cover_letter: String,
    pub cover_letter_html: String,
}

impl ContentFormats {
    /// `(file name, content)` in generation order.
    pub fn files(&self) -> [(&'static str, &str); 6] {
        [
            (TEXT_FILE, self.text.as_str()),
            (MARKDOWN_FILE, self.markdown.as_str()),
            (JSON_FILE, self.json.as_str()),
            (HTML_FILE, self.html.as_str()),
            (COVER_LETTER_FILE, self.cover_letter.as_str()),
            (COVER_LETTER_HTML_FILE, self.cover_letter_html.as_str()),
        ]
    }

    /// Sum of UTF-8 byte lengths, which is also the size written to disk.
    pub fn total_size(&self) -> u64 {
        self.files().iter().map(|(_, c)| c.len() as u64).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub formats: ContentFormats,
    pub format_count: usize,
    pub all_formats_available: bool,
    pub total_size: u64,
    /// Formats that fell back to an error placeholder.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_formats: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewContent<'a> {
    pub timestamp: DateTime<Utc>,
    pub formats: PreviewFormats<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewFormats<'a> {
    pub text: &'a str,
    pub markdown: &'a str,
    pub json: &'a str,
    pub cover_letter: &'a str,
}

impl<'a> PreviewContent<'a> {
    pub fn from_formats(formats: &'a ContentFormats) -> Self {
        PreviewContent {
            timestamp: Utc::now(),
            formats: PreviewFormats {
                text: &formats.text,
                markdown: &formats.markdown,
                json: &formats.json,
                cover_letter: &formats.cover_letter,
            },
        }
    }

    /// Written by the report stage when generation left no preview behind.
    pub fn placeholder() -> Self {
        PreviewContent {
            timestamp: Utc::now(),
            formats: PreviewFormats {
                text: PREVIEW_UNAVAILABLE,
                markdown: PREVIEW_UNAVAILABLE,
                json: "{}",
                cover_letter: PREVIEW_UNAVAILABLE,
            },
        }
    }
}

pub struct ContentGenerator {
    downloads_dir: PathBuf,
    preview_path: PathBuf,
}

impl ContentGenerator {
    pub fn new(downloads_dir: impl Into<PathBuf>, preview_path: impl Into<PathBuf>) -> Self {
        Self {
            downloads_dir: downloads_dir.into(),
            preview_path: preview_path.into(),
        }
    }

    pub async fn generate_content(
        &self,
        analysis: &AnalysisResult,
    ) -> Result<GenerationResult, PipelineError> {
        info!("Generating content formats");
        let resume = &analysis.data;
        let notice = analysis.notice();
        let mut failed = Vec::new();

        let text = isolate("text resume", text::render(resume, notice), &mut failed, |m| m);
        let markdown = isolate("markdown resume", markdown::render(resume, notice), &mut failed, |m| {
            format!("# Error Generating Resume\n\n{m}")
        });
        let json = isolate(
            "JSON resume",
            serde_json::to_string_pretty(resume),
            &mut failed,
            |m| format!("{{\"error\": {}}}", serde_json::Value::String(m)),
        );
        let html = isolate("HTML resume", html::render(resume, notice), &mut failed, |m| {
            html::error_page("Resume", &m)
        });
        let cover_letter = isolate(
            "cover letter",
            cover_letter::render(resume, notice),
            &mut failed,
            |m| format!("# Error Generating Cover Letter\n\n{m}"),
        );
        let cover_letter_html = cover_letter::to_html(&cover_letter);

        let formats = ContentFormats {
            text,
            markdown,
            json,
            html,
            cover_letter,
            cover_letter_html,
        };

        for (name, content) in formats.files() {
            fs_ops::write_text(&self.downloads_dir.join(name), content).await?;
        }
        fs_ops::write_json(&self.preview_path, &PreviewContent::from_formats(&formats)).await?;

        let format_count = formats.files().len();
        let total_size = formats.total_size();
        info!(
            "Content generation completed: {} formats, {} bytes",
            format_count, total_size
        );

        Ok(GenerationResult {
            all_formats_available: formats.files().iter().all(|(_, c)| !c.is_empty()),
            format_count,
            total_size,
            failed_formats: failed,
            formats,
        })
    }
}

/// Turns a failed render into an "Error generating X" placeholder.
fn isolate<E: fmt::Display>(
    label: &str,
    rendered: Result<String, E>,
    failed: &mut Vec<String>,
    placeholder: impl FnOnce(String) -> String,
) -> String {
    match rendered {
        Ok(content) => content,
        Err(e) => {
            let message = format!("Error generating {label}: {e}");
            error!("{message}");
            failed.push(label.to_string());
            placeholder(message)
        }
    }
}
