// Prompts for the outreach intelligence calls.

/// System prompt for likely-title generation.
pub const LIKELY_TITLES_SYSTEM: &str = "You are a B2B sales researcher who knows how \
    technology companies structure their engineering and leadership teams. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Prompt for the job titles most likely to own hiring decisions at a company.
///
/// Placeholders: `{company_name}`, `{person_hint}`, `{max_titles}`.
pub const LIKELY_TITLES_PROMPT_TEMPLATE: &str = r#"
List the job titles of the people most likely to make or influence engineering hiring
decisions at "{company_name}".
{person_hint}
Rules:
- Return at most {max_titles} titles, most likely first.
- Use the exact wording the company would put on a profile (e.g. "VP of Engineering").
- Titles only: no names, no seniority adjectives on their own, no departments.

Return exactly this JSON shape:
{"titles": ["<title>", "..."]}
"#;
