//! Junk-record heuristics for people-search results.
//!
//! The detector counts independent suspicion indicators. It does not weigh them; the
//! scorer multiplies the count by its per-indicator penalty.

use crate::outreach::models::Candidate;

/// Name fragments that mark a placeholder record.
pub const PLACEHOLDER_NAME_KEYWORDS: &[&str] = &["test", "sample", "demo", "fake", "example"];

/// Fragments of unreachable mailbox addresses.
const NO_REPLY_MARKERS: &[&str] = &["noreply", "no-reply"];

/// Minimum length for the title-equals-organization indicator.
const MIN_ECHOED_TITLE_LEN: usize = 5;

/// Which indicators fired for a candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpamSignals {
    pub title_echoes_organization: bool,
    pub zero_employees: bool,
    pub placeholder_name: bool,
    pub no_reply_email: bool,
    pub missing_fields: bool,
}

impl SpamSignals {
    pub fn count(&self) -> u32 {
        [
            self.title_echoes_organization,
            self.zero_employees,
            self.placeholder_name,
            self.no_reply_email,
            self.missing_fields,
        ]
        .iter()
        .filter(|fired| **fired)
        .count() as u32
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpamDetector;

impl SpamDetector {
    pub fn signals(&self, candidate: &Candidate) -> SpamSignals {
        let name = present(&candidate.name);
        let title = present(&candidate.title);
        let organization = present(&candidate.organization_name);

        let title_echoes_organization = match (title, organization) {
            (Some(t), Some(o)) => {
                let t = t.to_lowercase();
                t.chars().count() > MIN_ECHOED_TITLE_LEN && t == o.to_lowercase()
            }
            _ => false,
        };

        let placeholder_name = name
            .map(|n| {
                let n = n.to_lowercase();
                PLACEHOLDER_NAME_KEYWORDS.iter().any(|kw| n.contains(kw))
            })
            .unwrap_or(false);

        let no_reply_email = candidate
            .email
            .as_deref()
            .map(|e| {
                let e = e.to_lowercase();
                NO_REPLY_MARKERS.iter().any(|m| e.contains(m))
            })
            .unwrap_or(false);

        SpamSignals {
            title_echoes_organization,
            zero_employees: candidate.organization_employees == Some(0),
            placeholder_name,
            no_reply_email,
            missing_fields: name.is_none() || title.is_none() || organization.is_none(),
        }
    }

    /// Number of independent indicators that fired.
    pub fn indicator_count(&self, candidate: &Candidate) -> u32 {
        self.signals(candidate).count()
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
