// Resume analysis prompt templates.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

pub const ANALYSIS_SYSTEM_BASE: &str =
    "You are a helpful assistant that analyzes resume content and returns structured data.";

pub fn analysis_system() -> String {
    format!("{ANALYSIS_SYSTEM_BASE} {JSON_ONLY_SYSTEM}")
}

pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Please analyze the following resume content and extract structured information according to the schema.

CONTENT:
{content}

SCHEMA:
{
  "name": "string (required)",
  "summary": "string (required)",
  "skills": ["string (at least one required)"],
  "experience": [
    {
      "title": "string (required)",
      "company": "string (required)",
      "period": "string (required)",
      "responsibilities": ["string (at least one required)"]
    }
  ],
  "education": [
    {
      "degree": "string (required)",
      "institution": "string (required)",
      "period": "string (required)"
    }
  ],
  "contact": {
    "email": "string (optional)",
    "phone": "string (optional)",
    "linkedin": "string (optional)",
    "website": "string (optional)",
    "github": "string (optional)",
    "twitter": "string (optional)",
    "location": "string (optional)"
  }
}

INSTRUCTIONS:
1. Extract the person's name, summary, skills, experience, education, and contact information.
2. For skills, include both technical and soft skills as an array of strings.
3. For experience, include job title, company name, period, and responsibilities.
4. For education, include degree, institution, and period.
5. For contact information, extract as many details as available.
6. Ensure all required fields are filled.
7. If information is not available, make a reasonable inference based on the content.
8. IMPORTANT: Make sure the skills field is an array of strings, not an array of objects.
9. IMPORTANT: Make sure the output JSON exactly matches the schema structure.

Return the result as a valid JSON object that conforms to the schema."#;

pub fn analysis_prompt(content: &str) -> String {
    ANALYSIS_PROMPT_TEMPLATE.replace("{content}", content)
}
