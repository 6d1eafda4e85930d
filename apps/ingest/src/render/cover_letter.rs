//! Templated cover letter plus a small line-based Markdown → HTML converter.

use std::fmt::{self, Write};

use crate::models::{FallbackReason, StructuredResume};
use crate::render::html::html_escape;

const COMPANY: &str = "Your Company";

const LETTER_STYLE: &str = r#"    body {
      font-family: 'Georgia', serif;
      line-height: 1.6;
      max-width: 800px;
      margin: 0 auto;
      padding: 40px 20px;
      color: #333;
    }
    h1 {
      text-align: center;
      color: #2c3e50;
      margin-bottom: 30px;
      font-size: 28px;
    }
    h2 {
      color: #3498db;
      margin-top: 25px;
      margin-bottom: 15px;
      font-size: 20px;
    }
    p {
      margin-bottom: 15px;
      text-align: justify;
    }
    blockquote {
      border-left: 4px solid #e67e22;
      margin: 0 0 20px 0;
      padding: 5px 15px;
      background: #fff4e5;
    }
    ul {
      padding-left: 20px;
      margin-bottom: 20px;
    }
    li {
      margin-bottom: 10px;
    }
    @media print {
      body {
        padding: 0;
      }
    }
"#;

pub fn render(resume: &StructuredResume, notice: Option<&FallbackReason>) -> Result<String, fmt::Error> {
    let first_job = resume.experience.first();
    let position = first_job
        .map(|j| j.title.as_str())
        .filter(|t| !t.is_empty())
        .unwrap_or("the open position");
    let key_skills = if resume.skills.is_empty() {
        "my professional skills".to_string()
    } else {
        resume.skills.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
    };
    let achievement = first_job
        .and_then(|j| j.responsibilities.first())
        .map(|r| r.to_lowercase())
        .unwrap_or_else(|| "my professional achievements".to_string());
    let skill = |i: usize, default: &'static str| {
        resume.skills.get(i).map(String::as_str).unwrap_or(default)
    };

    let mut out = String::new();
    out.push_str("# Cover Letter\n\n");
    if let Some(reason) = notice {
        write!(out, "> Notice: {}\n\n", super::notice_text(reason))?;
    }
    out.push_str("Dear Hiring Manager,\n\n");

    out.push_str("## Introduction\n\n");
    write!(
        out,
        "I am writing to express my interest in {position} at {COMPANY}. With my background in \
         {key_skills}, I am confident that I would be a valuable addition to your team.\n\n"
    )?;

    write!(out, "## Professional Background\n\n{}\n\n", resume.summary)?;

    out.push_str("## Why I'm a Great Fit\n\n");
    write!(
        out,
        "Throughout my career, I have demonstrated {achievement}. I am particularly drawn to \
         {COMPANY} because of your reputation for innovation and excellence in the industry.\n\n"
    )?;

    out.push_str("## Skills and Qualifications\n\n");
    out.push_str("My key qualifications that align with this role include:\n\n");
    writeln!(out, "- {}", skill(0, "Professional expertise"))?;
    writeln!(out, "- {}", skill(1, "Technical knowledge"))?;
    write!(out, "- {}\n\n", skill(2, "Strong communication skills"))?;

    out.push_str("## Closing\n\n");
    write!(
        out,
        "I am excited about the opportunity to bring my unique skills and experience to \
         {COMPANY}. I would welcome the chance to discuss how my background and qualifications \
         would be a good match for this position.\n\n"
    )?;
    out.push_str("Thank you for your time and consideration.\n\n");
    write!(out, "Sincerely,\n\n{}\n", resume.name)?;

    Ok(out)
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    line[level..].strip_prefix(' ').map(|rest| (level, rest))
}

fn list_item(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let rest = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('*'))
        .or_else(|| trimmed.strip_prefix('+'))?;
    rest.starts_with(char::is_whitespace).then(|| rest.trim_start())
}

/// Converts the cover letter Markdown to HTML body markup, one line at a
/// time. Headings, `-`/`*`/`+` lists and `>` quotes are recognised; every
/// other non-empty line becomes a paragraph.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut blocks: Vec<String> = Vec::new();
    let mut list: Vec<String> = Vec::new();

    let flush = |list: &mut Vec<String>, blocks: &mut Vec<String>| {
        if !list.is_empty() {
            blocks.push(format!("<ul>\n{}\n</ul>", list.join("\n")));
            list.clear();
        }
    };

    for line in markdown.lines() {
        if let Some(item) = list_item(line) {
            list.push(format!("<li>{}</li>", html_escape(item)));
            continue;
        }
        flush(&mut list, &mut blocks);

        if let Some((level, text)) = heading(line) {
            blocks.push(format!("<h{level}>{}</h{level}>", html_escape(text)));
        } else if let Some(quote) = line.strip_prefix('>') {
            blocks.push(format!("<blockquote>{}</blockquote>", html_escape(quote.trim_start())));
        } else if !line.trim().is_empty() {
            blocks.push(format!("<p>{}</p>", html_escape(line)));
        }
    }
    flush(&mut list, &mut blocks);

    blocks.join("\n")
}

pub fn to_html(markdown: &str) -> String {
    let body = markdown_to_html(markdown);
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"UTF-8\">\n  \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n  \
         <title>Cover Letter</title>\n  <style>\n{LETTER_STYLE}  </style>\n</head>\n<body>\n\
         {body}\n</body>\n</html>\n"
    )
}
