//! Intelligence source: asks the LLM which job titles to search a company for.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::llm_client::{LlmClient, LlmError};
use crate::outreach::prompts::{LIKELY_TITLES_PROMPT_TEMPLATE, LIKELY_TITLES_SYSTEM};

/// Senior titles searched when the intelligence source is unavailable.
pub const FALLBACK_TITLES: &[&str] = &[
    "CEO",
    "CTO",
    "VP of Engineering",
    "Engineering Manager",
    "Head of Engineering",
];

/// Upper bound on the number of titles taken from the intelligence source.
pub const MAX_LIKELY_TITLES: usize = 5;

pub fn fallback_titles() -> Vec<String> {
    FALLBACK_TITLES.iter().map(|t| t.to_string()).collect()
}

#[derive(Debug, Error)]
pub enum IntelligenceError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("no titles returned")]
    NoTitles,
}

/// Supplies likely decision-maker titles for a company.
#[async_trait]
pub trait TitleSource: Send + Sync {
    async fn likely_titles(
        &self,
        person_name: Option<&str>,
        company_name: &str,
    ) -> Result<Vec<String>, IntelligenceError>;
}

#[derive(Debug, Deserialize)]
struct LikelyTitles {
    #[serde(default)]
    titles: Vec<String>,
}

/// `TitleSource` backed by the shared LLM client.
#[derive(Clone)]
pub struct LlmTitleSource {
    llm: LlmClient,
}

impl LlmTitleSource {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl TitleSource for LlmTitleSource {
    async fn likely_titles(
        &self,
        person_name: Option<&str>,
        company_name: &str,
    ) -> Result<Vec<String>, IntelligenceError> {
        let prompt = build_prompt(person_name, company_name);
        let response: LikelyTitles = self.llm.call_json(&prompt, LIKELY_TITLES_SYSTEM).await?;

        let titles = normalize_titles(response.titles, MAX_LIKELY_TITLES);
        if titles.is_empty() {
            return Err(IntelligenceError::NoTitles);
        }
        Ok(titles)
    }
}

fn build_prompt(person_name: Option<&str>, company_name: &str) -> String {
    let person_hint = match person_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("We are also trying to reach {name}; include their likely title."),
        None => String::new(),
    };

    LIKELY_TITLES_PROMPT_TEMPLATE
        .replace("{company_name}", company_name.trim())
        .replace("{person_hint}", &person_hint)
        .replace("{max_titles}", &MAX_LIKELY_TITLES.to_string())
}

/// Trims titles, drops blanks and case-insensitive duplicates, and keeps at most `limit`.
pub fn normalize_titles(titles: Vec<String>, limit: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    titles
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .take(limit)
        .collect()
}
