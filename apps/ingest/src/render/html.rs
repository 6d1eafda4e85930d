//! Standalone HTML resume. Every interpolated value is escaped.

use std::fmt::{self, Write};

use crate::models::{Contact, FallbackReason, StructuredResume};

/// Escape HTML special characters for safe rendering in text and
/// attribute positions.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const RESUME_STYLE: &str = r#"    body {
      font-family: 'Helvetica Neue', Arial, sans-serif;
      line-height: 1.6;
      max-width: 800px;
      margin: 0 auto;
      padding: 20px;
      color: #333;
    }
    header {
      margin-bottom: 30px;
    }
    h1 {
      color: #2c3e50;
      margin-bottom: 10px;
      font-size: 36px;
    }
    h2 {
      color: #3498db;
      border-bottom: 2px solid #3498db;
      padding-bottom: 5px;
      margin-top: 25px;
      margin-bottom: 15px;
    }
    h3 {
      color: #2c3e50;
      margin-bottom: 5px;
    }
    .contact-info ul {
      list-style-type: none;
      padding: 0;
      display: flex;
      flex-wrap: wrap;
      gap: 15px;
    }
    .contact-info li {
      margin-bottom: 5px;
    }
    .notice {
      background: #fff4e5;
      border-left: 4px solid #e67e22;
      padding: 10px 15px;
    }
    a {
      color: #3498db;
      text-decoration: none;
    }
    a:hover {
      text-decoration: underline;
    }
    section {
      margin-bottom: 30px;
    }
    .job, .education-item {
      margin-bottom: 20px;
    }
    .job-meta {
      font-style: italic;
      margin-top: 0;
      margin-bottom: 10px;
    }
    ul {
      padding-left: 20px;
    }
    li {
      margin-bottom: 5px;
    }
    @media print {
      body {
        padding: 0;
      }
      a {
        color: #333;
        text-decoration: none;
      }
    }
"#;

fn contact_items(contact: &Contact) -> Vec<String> {
    let mut items = Vec::new();
    if let Some(email) = &contact.email {
        let e = html_escape(email);
        items.push(format!(
            r#"<li><strong>Email:</strong> <a href="mailto:{e}">{e}</a></li>"#
        ));
    }
    if let Some(phone) = &contact.phone {
        items.push(format!("<li><strong>Phone:</strong> {}</li>", html_escape(phone)));
    }
    for (label, link) in [
        ("LinkedIn", &contact.linkedin),
        ("Website", &contact.website),
        ("GitHub", &contact.github),
    ] {
        if let Some(link) = link {
            let l = html_escape(link);
            items.push(format!(
                r#"<li><strong>{label}:</strong> <a href="{l}" target="_blank">{l}</a></li>"#
            ));
        }
    }
    if let Some(location) = &contact.location {
        items.push(format!(
            "<li><strong>Location:</strong> {}</li>",
            html_escape(location)
        ));
    }
    items
}

pub fn render(resume: &StructuredResume, notice: Option<&FallbackReason>) -> Result<String, fmt::Error> {
    let name = html_escape(&resume.name);
    let mut out = String::new();

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, r#"<html lang="en">"#)?;
    writeln!(out, "<head>")?;
    writeln!(out, r#"  <meta charset="UTF-8">"#)?;
    writeln!(
        out,
        r#"  <meta name="viewport" content="width=device-width, initial-scale=1.0">"#
    )?;
    writeln!(out, "  <title>{name} - Resume</title>")?;
    write!(out, "  <style>\n{RESUME_STYLE}  </style>\n")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;

    writeln!(out, "  <header>")?;
    writeln!(out, "    <h1>{name}</h1>")?;
    let contact = contact_items(&resume.contact);
    if !contact.is_empty() {
        writeln!(out, r#"    <div class="contact-info">"#)?;
        writeln!(out, "      <ul>")?;
        for item in &contact {
            writeln!(out, "        {item}")?;
        }
        writeln!(out, "      </ul>")?;
        writeln!(out, "    </div>")?;
    }
    writeln!(out, "  </header>")?;

    if let Some(reason) = notice {
        writeln!(
            out,
            r#"  <p class="notice"><strong>Notice:</strong> {}</p>"#,
            html_escape(&super::notice_text(reason))
        )?;
    }

    writeln!(out, r#"  <section id="summary">"#)?;
    writeln!(out, "    <h2>Summary</h2>")?;
    writeln!(out, "    <p>{}</p>", html_escape(&resume.summary))?;
    writeln!(out, "  </section>")?;

    if !resume.skills.is_empty() {
        writeln!(out, r#"  <section id="skills">"#)?;
        writeln!(out, "    <h2>Skills</h2>")?;
        writeln!(out, "    <ul>")?;
        for skill in &resume.skills {
            writeln!(out, "      <li>{}</li>", html_escape(skill))?;
        }
        writeln!(out, "    </ul>")?;
        writeln!(out, "  </section>")?;
    }

    if !resume.experience.is_empty() {
        writeln!(out, r#"  <section id="experience">"#)?;
        writeln!(out, "    <h2>Experience</h2>")?;
        for job in &resume.experience {
            writeln!(out, r#"    <div class="job">"#)?;
            writeln!(out, "      <h3>{}</h3>", html_escape(&job.title))?;
            writeln!(
                out,
                r#"      <p class="job-meta"><strong>{}</strong> | {}</p>"#,
                html_escape(&job.company),
                html_escape(&job.period)
            )?;
            if !job.responsibilities.is_empty() {
                writeln!(out, "      <ul>")?;
                for item in &job.responsibilities {
                    writeln!(out, "        <li>{}</li>", html_escape(item))?;
                }
                writeln!(out, "      </ul>")?;
            }
            writeln!(out, "    </div>")?;
        }
        writeln!(out, "  </section>")?;
    }

    if !resume.education.is_empty() {
        writeln!(out, r#"  <section id="education">"#)?;
        writeln!(out, "    <h2>Education</h2>")?;
        for edu in &resume.education {
            writeln!(out, r#"    <div class="education-item">"#)?;
            writeln!(out, "      <h3>{}</h3>", html_escape(&edu.degree))?;
            writeln!(
                out,
                "      <p><strong>{}</strong> | {}</p>",
                html_escape(&edu.institution),
                html_escape(&edu.period)
            )?;
            writeln!(out, "    </div>")?;
        }
        writeln!(out, "  </section>")?;
    }

    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;
    Ok(out)
}

/// Minimal page shown in place of a document that failed to render.
pub fn error_page(title: &str, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"UTF-8\">\n  \
         <title>Error - {title}</title>\n</head>\n<body>\n  <h1>Error Generating {title}</h1>\n  \
         <p>{}</p>\n</body>\n</html>\n",
        html_escape(message)
    )
}
