use std::fmt::{self, Write};

use crate::models::{Contact, FallbackReason, StructuredResume};

fn contact_line(contact: &Contact) -> Vec<String> {
    let labelled = [
        ("Email", &contact.email),
        ("Phone", &contact.phone),
        ("LinkedIn", &contact.linkedin),
        ("Website", &contact.website),
        ("GitHub", &contact.github),
        ("Location", &contact.location),
    ];
    labelled
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| format!("{label}: {v}")))
        .collect()
}

fn section(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out, "\n{title}\n{}", "=".repeat(title.len()))
}

/// Plain-text resume with `=`-underlined section headers.
pub fn render(resume: &StructuredResume, notice: Option<&FallbackReason>) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{}", resume.name.to_uppercase())?;

    let contact = contact_line(&resume.contact);
    if !contact.is_empty() {
        writeln!(out, "\n{}", contact.join(" | "))?;
    }

    if let Some(reason) = notice {
        writeln!(out, "\nNOTICE: {}", super::notice_text(reason))?;
    }

    section(&mut out, "SUMMARY")?;
    writeln!(out, "{}", resume.summary)?;

    if !resume.skills.is_empty() {
        section(&mut out, "SKILLS")?;
        writeln!(out, "{}", resume.skills.join(", "))?;
    }

    if !resume.experience.is_empty() {
        section(&mut out, "EXPERIENCE")?;
        for job in &resume.experience {
            writeln!(out, "\n{} | {} | {}", job.title, job.company, job.period)?;
            for item in &job.responsibilities {
                writeln!(out, "- {item}")?;
            }
        }
    }

    if !resume.education.is_empty() {
        section(&mut out, "EDUCATION")?;
        for edu in &resume.education {
            writeln!(out, "\n{} | {} | {}", edu.degree, edu.institution, edu.period)?;
        }
    }

    Ok(out)
}
