// Resume parsing prompt template.

/// The single placeholder in [`RESUME_PARSE_PROMPT_TEMPLATE`].
pub const RESUME_TEXT_PLACEHOLDER: &str = "{text}";

/// Resume parsing prompt. The JSON skeleton's braces are literal; only
/// `{text}` is substituted.
pub const RESUME_PARSE_PROMPT_TEMPLATE: &str = r#"
You are an expert resume parser. Given the resume text, extract the following fields and return a single valid JSON object:

{"Name": "...",
  "LinkedIn": "...",
  "Skills": [...],
  "Education": [...],
  "Experience": [...],
  "Projects": [...],
}

Rules:
- If a field cannot be found, set its value to "No idea".
- Return ONLY valid JSON (no extra commentary).
- Keep lists as arrays, and keep Experience/Projects as arrays of short strings.

Resume text:
{text}
"#;

/// Renders the parse prompt for `full_text`. The text is inserted as-is, never truncated,
/// and is not rescanned for placeholders.
pub fn build_resume_prompt(full_text: &str) -> String {
    RESUME_PARSE_PROMPT_TEMPLATE.replacen(RESUME_TEXT_PLACEHOLDER, full_text, 1)
}
