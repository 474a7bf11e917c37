//! Progress reporting for acquisition runs.
//!
//! The controller never writes to global output. It emits `ProgressEvent`s to a
//! caller-supplied `ProgressSink`, which may forward them to `tracing`, record them for a
//! response body, or assert on them in tests.

use std::fmt;
use std::sync::Mutex;

use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionPhase {
    IntelligenceGathering,
    PersonCentricSearch,
    HighConfidenceFound,
    RoleCentricSearch,
    Scoring,
    IterativeEnrichment,
    Done,
}

/// Which search phase a page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    PersonCentric,
    RoleCentric,
}

impl fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchPhase::PersonCentric => write!(f, "person-centric"),
            SearchPhase::RoleCentric => write!(f, "role-centric"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Hard precondition failure; nothing else runs.
    MissingDomain { company: String },
    PhaseEntered { phase: AcquisitionPhase },
    TitlesResolved { titles: Vec<String>, fallback: bool },
    IntelligenceFailed { reason: String },
    PageFetched { phase: SearchPhase, page: u32, count: usize },
    PageFailed { phase: SearchPhase, page: u32, reason: String },
    HighConfidence { name: String, score: i64 },
    PoolRanked { size: usize, top_score: Option<i64> },
    AlreadyUnlocked { name: String, score: i64 },
    Enriching { name: String, id: String, score: i64 },
    EnrichmentEmpty { name: String },
    EnrichmentSkipped { name: String },
    EnrichmentFailed { name: String, reason: String },
    ContactFound { name: String, email: String },
    Exhausted { attempted: usize },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::MissingDomain { company } => write!(
                f,
                "No verified domain for {company}; skipping contact search"
            ),
            ProgressEvent::PhaseEntered { phase } => write!(f, "Phase: {phase:?}"),
            ProgressEvent::TitlesResolved { titles, fallback } => write!(
                f,
                "Target titles{}: {}",
                if *fallback { " (fallback)" } else { "" },
                titles.join(", ")
            ),
            ProgressEvent::IntelligenceFailed { reason } => {
                write!(f, "Title research failed ({reason}); using fallback titles")
            }
            ProgressEvent::PageFetched { phase, page, count } => {
                write!(f, "{phase} search page {page}: {count} candidates")
            }
            ProgressEvent::PageFailed {
                phase,
                page,
                reason,
            } => write!(f, "{phase} search page {page} failed: {reason}"),
            ProgressEvent::HighConfidence { name, score } => write!(
                f,
                "High-confidence match {name} (score {score}); skipping role search"
            ),
            ProgressEvent::PoolRanked { size, top_score } => match top_score {
                Some(top) => write!(f, "Ranked {size} candidates (top score {top})"),
                None => write!(f, "No candidates found"),
            },
            ProgressEvent::AlreadyUnlocked { name, score } => {
                write!(f, "{name} (score {score}) already has an email; no enrichment needed")
            }
            ProgressEvent::Enriching { name, id, score } => {
                write!(f, "Enriching {name} [{id}] (score {score})")
            }
            ProgressEvent::EnrichmentEmpty { name } => {
                write!(f, "Enrichment returned no email for {name}")
            }
            ProgressEvent::EnrichmentSkipped { name } => {
                write!(f, "Skipping {name}: no provider id to enrich")
            }
            ProgressEvent::EnrichmentFailed { name, reason } => {
                write!(f, "Enrichment failed for {name}: {reason}")
            }
            ProgressEvent::ContactFound { name, email } => {
                write!(f, "Found contact {name} <{email}>")
            }
            ProgressEvent::Exhausted { attempted } => write!(
                f,
                "No usable email after {attempted} enrichment attempts"
            ),
        }
    }
}

/// Receives progress events from an acquisition run.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn emit(&self, event: ProgressEvent) {
        self(&event)
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn emit(&self, event: ProgressEvent) {
        match &event {
            ProgressEvent::MissingDomain { .. }
            | ProgressEvent::IntelligenceFailed { .. }
            | ProgressEvent::PageFailed { .. }
            | ProgressEvent::EnrichmentFailed { .. } => warn!("{event}"),
            _ => info!("{event}"),
        }
    }
}

/// Keeps every event, forwarding each to `tracing` as well.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Human-readable log lines, in emission order.
    pub fn lines(&self) -> Vec<String> {
        self.events().iter().map(ToString::to_string).collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn emit(&self, event: ProgressEvent) {
        TracingProgress.emit(event.clone());
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
