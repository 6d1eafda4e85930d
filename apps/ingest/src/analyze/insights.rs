//! Builds `resume_content_analyzed.json`, the enriched analysis document
//! kept next to the extracted text.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyze::schema::ValidationOutcome;
use crate::analyze::AnalysisResult;
use crate::models::{Provenance, StructuredResume};

pub const ANALYZED_FILE: &str = "resume_content_analyzed.json";

const TECHNICAL_KEYWORDS: &[&str] = &["javascript", "react", "aws", "node"];
const DOMAINS: &[&str] = &["Web Development", "Cloud Computing"];
const YEARS_PER_ROLE: usize = 2;
const HIGHLIGHT_COUNT: usize = 3;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedDocument<'a> {
    pub metadata: AnalyzedMetadata<'a>,
    pub analysis: Insights,
    pub structured_content: &'a StructuredResume,
    pub validation: &'a ValidationOutcome,
    pub raw_text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedMetadata<'a> {
    pub analysis_date: DateTime<Utc>,
    pub content_fingerprint: &'a str,
    pub openai_model: &'a str,
    pub cached: bool,
    pub simulated: bool,
    pub fallback: bool,
    pub provenance: &'a Provenance,
}

#[derive(Debug, Serialize)]
pub struct Insights {
    pub skills: SkillSplit,
    pub experience: ExperienceInsights,
    pub education: EducationInsights,
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct SkillSplit {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ExperienceInsights {
    /// Rough estimate: two years per listed role.
    pub years: usize,
    pub domains: Vec<String>,
    pub highlights: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EducationInsights {
    pub level: String,
    pub field: String,
    pub relevance: String,
}

fn is_technical(skill: &str) -> bool {
    let lower = skill.to_lowercase();
    TECHNICAL_KEYWORDS.iter().any(|k| lower.contains(k))
}

pub fn insights(resume: &StructuredResume) -> Insights {
    let (technical, soft) = resume
        .skills
        .iter()
        .cloned()
        .partition(|s| is_technical(s));

    let degree = resume
        .education
        .first()
        .map(|e| e.degree.as_str())
        .filter(|d| !d.is_empty())
        .unwrap_or("Unknown");

    Insights {
        skills: SkillSplit { technical, soft },
        experience: ExperienceInsights {
            years: resume.experience.len() * YEARS_PER_ROLE,
            domains: DOMAINS.iter().map(|d| d.to_string()).collect(),
            highlights: resume
                .all_responsibilities()
                .take(HIGHLIGHT_COUNT)
                .map(String::from)
                .collect(),
        },
        education: EducationInsights {
            level: degree.to_string(),
            field: degree.to_string(),
            relevance: "High".to_string(),
        },
        summary: resume.summary.clone(),
    }
}

pub fn analyzed_document<'a>(result: &'a AnalysisResult, raw_text: &'a str) -> AnalyzedDocument<'a> {
    AnalyzedDocument {
        metadata: AnalyzedMetadata {
            analysis_date: Utc::now(),
            content_fingerprint: &result.content_fingerprint,
            openai_model: &result.model,
            cached: result.cached,
            simulated: result.simulated(),
            fallback: result.fallback(),
            provenance: &result.provenance,
        },
        analysis: insights(&result.data),
        structured_content: &result.data,
        validation: &result.validation_result,
        raw_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::simulated::simulated_resume;
    use crate::models::FallbackReason;

    #[test]
    fn test_skills_split_on_keywords() {
        let resume = simulated_resume();
        let out = insights(&resume);
        assert_eq!(
            out.skills.technical,
            ["JavaScript/TypeScript", "React", "Node.js", "AWS"]
        );
        assert!(out.skills.soft.contains(&"Teamwork".to_string()));
        assert_eq!(out.skills.technical.len() + out.skills.soft.len(), 13);
    }

    #[test]
    fn test_experience_and_education_estimates() {
        let out = insights(&simulated_resume());
        assert_eq!(out.experience.years, 4);
        assert_eq!(out.experience.highlights.len(), 3);
        assert_eq!(out.education.level, "Bachelor of Science in Computer Science");

        let empty = insights(&StructuredResume::default());
        assert_eq!(empty.experience.years, 0);
        assert!(empty.experience.highlights.is_empty());
        assert_eq!(empty.education.level, "Unknown");
    }

    #[test]
    fn test_document_shape() {
        let result = AnalysisResult::sample(
            "fp".into(),
            "gpt-4o".into(),
            FallbackReason::MissingCredential,
            Provenance::Real,
        );
        let value = serde_json::to_value(analyzed_document(&result, "raw")).unwrap();
        assert_eq!(value["metadata"]["contentFingerprint"], "fp");
        assert_eq!(value["metadata"]["simulated"], true);
        assert_eq!(value["metadata"]["fallback"], false);
        assert_eq!(value["structuredContent"]["name"], "John Doe");
        assert_eq!(value["validation"]["success"], true);
        assert_eq!(value["rawText"], "raw");
    }
}
