use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a stage's output came from. Every result carries one, and every
/// human-readable artifact renders a notice when it is `Fallback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    Real,
    Fallback { reason: FallbackReason },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    /// The PDF text library errored or produced no text; sample text used.
    PdfLibraryFailed(String),
    /// No LLM credential configured; simulated analysis used.
    MissingCredential,
    LlmRequestFailed(String),
    /// The model replied with something that is not JSON.
    UnparseableResponse(String),
    /// The reply was JSON but could not be read as a resume at all.
    UnusableResponse(String),
}

impl Provenance {
    pub fn fallback(reason: FallbackReason) -> Self {
        Provenance::Fallback { reason }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Provenance::Fallback { .. })
    }

    pub fn reason(&self) -> Option<&FallbackReason> {
        match self {
            Provenance::Real => None,
            Provenance::Fallback { reason } => Some(reason),
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::PdfLibraryFailed(e) => {
                write!(f, "PDF text extraction failed ({e}); sample resume text was used")
            }
            FallbackReason::MissingCredential => {
                write!(f, "no LLM credential configured; a sample profile was used")
            }
            FallbackReason::LlmRequestFailed(e) => {
                write!(f, "LLM request failed ({e}); a sample profile was used")
            }
            FallbackReason::UnparseableResponse(e) => {
                write!(f, "LLM reply was not valid JSON ({e}); a sample profile was used")
            }
            FallbackReason::UnusableResponse(e) => {
                write!(f, "LLM reply did not describe a resume ({e}); a sample profile was used")
            }
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Real => f.write_str("real"),
            Provenance::Fallback { reason } => write!(f, "fallback: {reason}"),
        }
    }
}
