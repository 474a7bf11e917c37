//! Data model for contact acquisition.
//!
//! `Candidate` is the raw record the people-search provider returns. It is never mutated
//! after construction; scoring reads it and `Contact` is derived from it.

use serde::{Deserialize, Serialize};

/// Email value the provider returns when the address exists but has not been unlocked.
pub const LOCKED_EMAIL_SENTINEL: &str = "email_not_unlocked@domain.com";

/// Deliverability status the provider attaches to an email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    Verified,
    Guessed,
    #[serde(alias = "likely_to_engage")]
    Likely,
    Unavailable,
    #[serde(other)]
    Other,
}

/// A raw person record returned by a search call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: Option<String>,
    pub title: Option<String>,
    pub organization_name: Option<String>,
    /// `None` means unknown; `Some(0)` is an explicit zero.
    pub organization_employees: Option<u64>,
    pub email: Option<String>,
    pub email_status: Option<EmailStatus>,
}

impl Candidate {
    /// The email if it is present, non-blank and not the locked sentinel.
    pub fn usable_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty() && !is_locked_email(e))
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

pub fn is_locked_email(email: &str) -> bool {
    email.trim().eq_ignore_ascii_case(LOCKED_EMAIL_SENTINEL)
}

/// An organization returned by the company search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: Option<String>,
    pub name: String,
    pub primary_domain: Option<String>,
    pub employee_count: Option<u64>,
}

/// What a single acquisition run is looking for.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSpec {
    pub person_name: Option<String>,
    pub company_name: String,
    pub company_domain: String,
    pub likely_titles: Vec<String>,
}

impl TargetSpec {
    /// Person name, if one was supplied and is not blank.
    pub fn person(&self) -> Option<&str> {
        self.person_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

/// A candidate together with the score it was ranked by.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: i64,
}

/// A slot in the ranking pool.
///
/// `Scored` entries were promoted from the person-centric phase and keep their score;
/// `Pending` entries are scored once when the pool is ranked.
#[derive(Debug, Clone, PartialEq)]
pub enum PoolEntry {
    Scored(ScoredCandidate),
    Pending(Candidate),
}

/// The result of a successful acquisition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: Option<String>,
    pub title: Option<String>,
    pub email: String,
    pub email_status: Option<EmailStatus>,
    pub organization_name: Option<String>,
}

impl Contact {
    /// Builds a contact from a candidate that already carries a usable email.
    pub fn from_candidate(candidate: &Candidate) -> Option<Contact> {
        let email = candidate.usable_email()?.to_string();
        Some(Contact {
            id: candidate.id.clone(),
            name: candidate.name.clone(),
            title: candidate.title.clone(),
            email,
            email_status: candidate.email_status,
            organization_name: candidate.organization_name.clone(),
        })
    }

    /// Builds a contact from an enrichment response. The enriched record must carry a
    /// usable email; any other field it lacks is taken from the pooled candidate.
    pub fn from_enrichment(pooled: &Candidate, enriched: Candidate) -> Option<Contact> {
        let email = enriched.usable_email()?.to_string();
        Some(Contact {
            id: if enriched.id.is_empty() {
                pooled.id.clone()
            } else {
                enriched.id
            },
            name: enriched.name.or_else(|| pooled.name.clone()),
            title: enriched.title.or_else(|| pooled.title.clone()),
            email,
            email_status: enriched.email_status.or(pooled.email_status),
            organization_name: enriched
                .organization_name
                .or_else(|| pooled.organization_name.clone()),
        })
    }
}
