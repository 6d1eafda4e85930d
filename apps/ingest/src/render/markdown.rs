use std::fmt::{self, Write};

use crate::models::{Contact, FallbackReason, StructuredResume};

fn contact_line(contact: &Contact) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(email) = &contact.email {
        parts.push(format!("[{email}](mailto:{email})"));
    }
    if let Some(phone) = &contact.phone {
        parts.push(phone.clone());
    }
    for (label, link) in [
        ("LinkedIn", &contact.linkedin),
        ("Website", &contact.website),
        ("GitHub", &contact.github),
    ] {
        if let Some(link) = link {
            parts.push(format!("[{label}]({link})"));
        }
    }
    if let Some(location) = &contact.location {
        parts.push(location.clone());
    }
    parts
}

pub fn render(resume: &StructuredResume, notice: Option<&FallbackReason>) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write!(out, "# {}\n\n", resume.name)?;

    let contact = contact_line(&resume.contact);
    if !contact.is_empty() {
        write!(out, "{}\n\n", contact.join(" | "))?;
    }

    if let Some(reason) = notice {
        write!(out, "> **Notice:** {}\n\n", super::notice_text(reason))?;
    }

    write!(out, "## Summary\n\n{}\n\n", resume.summary)?;

    if !resume.skills.is_empty() {
        out.push_str("## Skills\n\n");
        for skill in &resume.skills {
            writeln!(out, "- {skill}")?;
        }
        out.push('\n');
    }

    if !resume.experience.is_empty() {
        out.push_str("## Experience\n\n");
        for job in &resume.experience {
            writeln!(out, "### {}", job.title)?;
            write!(out, "**{}** | {}\n\n", job.company, job.period)?;
            if !job.responsibilities.is_empty() {
                for item in &job.responsibilities {
                    writeln!(out, "- {item}")?;
                }
                out.push('\n');
            }
        }
    }

    if !resume.education.is_empty() {
        out.push_str("## Education\n\n");
        for edu in &resume.education {
            writeln!(out, "### {}", edu.degree)?;
            write!(out, "**{}** | {}\n\n", edu.institution, edu.period)?;
        }
    }

    Ok(out)
}
