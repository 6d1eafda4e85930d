//! Strict resume schema check over raw JSON.
//!
//! Required: `name`, `summary`, ≥1 non-empty skill, ≥1 experience entry with
//! title/company/period and ≥1 responsibility, ≥1 education entry with
//! degree/institution/period. `contact` and its fields are optional, but
//! present fields must be strings and `contact.email` must look like an email.
//!
//! One repair is attempted on failure: `skills: {"technical": [...]}` is
//! flattened to the `technical` array and re-checked once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::models::StructuredResume;

const CONTACT_FIELDS: &[&str] = &[
    "email", "phone", "linkedin", "website", "github", "twitter", "location",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dotted path of the offending field, e.g. `experience[0].title`.
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ValidationIssue>,
    #[serde(default)]
    pub repaired: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ValidationOutcome {
    fn from_issues(issues: Vec<ValidationIssue>, repaired: bool) -> Self {
        let error = (!issues.is_empty()).then(|| summarize(&issues));
        ValidationOutcome {
            success: issues.is_empty(),
            issues,
            repaired,
            error,
            timestamp: Utc::now(),
        }
    }
}

/// Result of checking one JSON value.
#[derive(Debug, Clone)]
pub struct SchemaCheck {
    pub outcome: ValidationOutcome,
    /// Present only when the (possibly repaired) value passed.
    pub data: Option<StructuredResume>,
}

pub fn validate(value: &Value) -> SchemaCheck {
    let issues = check(value);
    if issues.is_empty() {
        return passed(value, false);
    }

    debug!("Validation issues: {:?}", issues);

    if let Some(repaired) = repair_skills(value) {
        warn!("skills field is not an array; retrying with skills.technical");
        if check(&repaired).is_empty() {
            info!("Fixed skills field and validation succeeded");
            return passed(&repaired, true);
        }
    }

    SchemaCheck {
        outcome: ValidationOutcome::from_issues(issues, false),
        data: None,
    }
}

/// Convenience for already-typed data, e.g. the simulated profile.
pub fn validate_resume(resume: &StructuredResume) -> SchemaCheck {
    match serde_json::to_value(resume) {
        Ok(value) => validate(&value),
        Err(e) => SchemaCheck {
            outcome: ValidationOutcome::from_issues(
                vec![issue("", format!("resume could not be serialized: {e}"))],
                false,
            ),
            data: None,
        },
    }
}

fn passed(value: &Value, repaired: bool) -> SchemaCheck {
    match serde_json::from_value::<StructuredResume>(value.clone()) {
        Ok(data) => SchemaCheck {
            outcome: ValidationOutcome::from_issues(vec![], repaired),
            data: Some(data),
        },
        Err(e) => SchemaCheck {
            outcome: ValidationOutcome::from_issues(
                vec![issue("", format!("valid shape but undecodable: {e}"))],
                repaired,
            ),
            data: None,
        },
    }
}

fn repair_skills(value: &Value) -> Option<Value> {
    let technical = value.get("skills")?.as_object()?.get("technical")?;
    if !technical.is_array() {
        return None;
    }
    let mut fixed = value.clone();
    fixed["skills"] = technical.clone();
    Some(fixed)
}

fn check(value: &Value) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let Some(root) = value.as_object() else {
        issues.push(issue("", "expected a JSON object"));
        return issues;
    };

    require_string(root, "name", "", "Name is required", &mut issues);
    require_string(root, "summary", "", "Summary is required", &mut issues);
    require_string_list(root, "skills", "", "At least one skill is required", &mut issues);

    match root.get("experience").and_then(Value::as_array) {
        Some(jobs) if !jobs.is_empty() => {
            for (i, job) in jobs.iter().enumerate() {
                let prefix = format!("experience[{i}].");
                let Some(job) = job.as_object() else {
                    issues.push(issue(&format!("experience[{i}]"), "expected an object"));
                    continue;
                };
                require_string(job, "title", &prefix, "Job title is required", &mut issues);
                require_string(job, "company", &prefix, "Company name is required", &mut issues);
                require_string(job, "period", &prefix, "Employment period is required", &mut issues);
                require_string_list(
                    job,
                    "responsibilities",
                    &prefix,
                    "At least one responsibility is required",
                    &mut issues,
                );
            }
        }
        _ => issues.push(issue("experience", "At least one experience entry is required")),
    }

    match root.get("education").and_then(Value::as_array) {
        Some(entries) if !entries.is_empty() => {
            for (i, entry) in entries.iter().enumerate() {
                let prefix = format!("education[{i}].");
                let Some(entry) = entry.as_object() else {
                    issues.push(issue(&format!("education[{i}]"), "expected an object"));
                    continue;
                };
                require_string(entry, "degree", &prefix, "Degree is required", &mut issues);
                require_string(entry, "institution", &prefix, "Institution is required", &mut issues);
                require_string(entry, "period", &prefix, "Education period is required", &mut issues);
            }
        }
        _ => issues.push(issue("education", "At least one education entry is required")),
    }

    match root.get("contact") {
        None | Some(Value::Null) => {}
        Some(Value::Object(contact)) => {
            for field in CONTACT_FIELDS {
                match contact.get(*field) {
                    None | Some(Value::Null) => {}
                    Some(Value::String(s)) => {
                        if *field == "email" && !looks_like_email(s) {
                            issues.push(issue("contact.email", "Invalid email address"));
                        }
                    }
                    Some(_) => issues.push(issue(&format!("contact.{field}"), "expected a string")),
                }
            }
        }
        Some(_) => issues.push(issue("contact", "expected an object")),
    }

    issues
}

fn require_string(
    obj: &Map<String, Value>,
    key: &str,
    prefix: &str,
    message: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    match obj.get(key).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => {}
        _ => issues.push(issue(&format!("{prefix}{key}"), message)),
    }
}

fn require_string_list(
    obj: &Map<String, Value>,
    key: &str,
    prefix: &str,
    message: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    let path = format!("{prefix}{key}");
    let Some(items) = obj.get(key).and_then(Value::as_array) else {
        issues.push(issue(&path, message));
        return;
    };
    if items.is_empty() {
        issues.push(issue(&path, message));
        return;
    }
    for (i, item) in items.iter().enumerate() {
        match item.as_str() {
            Some(s) if !s.trim().is_empty() => {}
            _ => issues.push(issue(&format!("{path}[{i}]"), "expected a non-empty string")),
        }
    }
}

fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn issue(path: &str, message: impl Into<String>) -> ValidationIssue {
    ValidationIssue {
        path: path.to_string(),
        message: message.into(),
    }
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| {
            if i.path.is_empty() {
                i.message.clone()
            } else {
                format!("{}: {}", i.path, i.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}
