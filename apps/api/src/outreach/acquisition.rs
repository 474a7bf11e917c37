//! Contact acquisition: finds one reachable decision-maker for a company while spending
//! as few enrichment credits as possible.
//!
//! Flow: domain precondition → likely titles → person-centric search →
//!       (high-confidence short-circuit | role-centric search) → rank → enrich in order.
//!
//! Everything runs sequentially. Enrichment is billed per call, so candidates are enriched
//! one at a time in descending score order and the run stops at the first usable email.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::outreach::intelligence::{fallback_titles, TitleSource};
use crate::outreach::models::{Candidate, Contact, PoolEntry, ScoredCandidate, TargetSpec};
use crate::outreach::people_search::{PageRequest, PeopleSearch};
use crate::outreach::progress::{AcquisitionPhase, ProgressEvent, ProgressSink, SearchPhase};
use crate::outreach::scoring::{CandidateScorer, ScoringWeights};

/// Search tunables. These trade cost against recall; none of them affects correctness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    pub seniorities: Vec<String>,
    pub max_pages: u32,
    pub per_page: u32,
    pub fallback_titles: Vec<String>,
    pub weights: ScoringWeights,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            seniorities: default_seniorities(),
            max_pages: 1,
            per_page: 25,
            fallback_titles: fallback_titles(),
            weights: ScoringWeights::default(),
        }
    }
}

pub fn default_seniorities() -> Vec<String> {
    ["c_suite", "vp", "head", "director"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Orchestrates one acquisition run per `find_contact` call. Holds no per-run state.
#[derive(Clone)]
pub struct AcquisitionController {
    search: Arc<dyn PeopleSearch>,
    titles: Arc<dyn TitleSource>,
    config: AcquisitionConfig,
}

impl AcquisitionController {
    pub fn new(
        search: Arc<dyn PeopleSearch>,
        titles: Arc<dyn TitleSource>,
        config: AcquisitionConfig,
    ) -> Self {
        let w = &config.weights;
        if w.spam_penalty <= w.max_bonus() {
            warn!("Spam penalty {} does not outweigh a perfect match", w.spam_penalty);
        }
        if w.high_confidence_threshold() <= w.max_without_company() {
            warn!(
                "High-confidence threshold {} is reachable without a company match",
                w.high_confidence_threshold()
            );
        }
        Self {
            search,
            titles,
            config,
        }
    }

    /// Finds a contact at `company_name`. Returns `None` when no usable email was found,
    /// and immediately (without any provider call) when `company_domain` is missing.
    pub async fn find_contact(
        &self,
        person_name: Option<&str>,
        company_name: &str,
        company_domain: Option<&str>,
        progress: &dyn ProgressSink,
    ) -> Option<Contact> {
        let domain = match company_domain.map(str::trim).filter(|d| !d.is_empty()) {
            Some(domain) => domain.to_string(),
            None => {
                progress.emit(ProgressEvent::MissingDomain {
                    company: company_name.to_string(),
                });
                return None;
            }
        };

        progress.emit(ProgressEvent::PhaseEntered {
            phase: AcquisitionPhase::IntelligenceGathering,
        });
        let likely_titles = self.gather_titles(person_name, company_name, progress).await;

        let target = TargetSpec {
            person_name: person_name.map(str::to_string),
            company_name: company_name.to_string(),
            company_domain: domain,
            likely_titles,
        };
        let scorer = CandidateScorer::new(self.config.weights, &target);

        let mut pool: Vec<PoolEntry> = Vec::new();

        if let Some(person) = target.person() {
            progress.emit(ProgressEvent::PhaseEntered {
                phase: AcquisitionPhase::PersonCentricSearch,
            });
            let found = self
                .collect_pages(SearchPhase::PersonCentric, &target, person, progress)
                .await;

            let confident = found
                .into_iter()
                .filter(|c| scorer.is_high_confidence(c))
                .collect();
            if let Some(best) = best_candidate(&scorer, confident) {
                progress.emit(ProgressEvent::PhaseEntered {
                    phase: AcquisitionPhase::HighConfidenceFound,
                });
                progress.emit(ProgressEvent::HighConfidence {
                    name: best.candidate.display_name().to_string(),
                    score: best.score,
                });
                pool.push(PoolEntry::Scored(best));
            }
        }

        if pool.is_empty() {
            progress.emit(ProgressEvent::PhaseEntered {
                phase: AcquisitionPhase::RoleCentricSearch,
            });
            let found = self
                .collect_pages(SearchPhase::RoleCentric, &target, &target.company_domain, progress)
                .await;
            pool.extend(found.into_iter().map(PoolEntry::Pending));
        }

        progress.emit(ProgressEvent::PhaseEntered {
            phase: AcquisitionPhase::Scoring,
        });
        let ranked = rank_pool(&scorer, pool);
        progress.emit(ProgressEvent::PoolRanked {
            size: ranked.len(),
            top_score: ranked.first().map(|c| c.score),
        });

        progress.emit(ProgressEvent::PhaseEntered {
            phase: AcquisitionPhase::IterativeEnrichment,
        });
        let contact = self.enrich_in_order(&ranked, progress).await;

        progress.emit(ProgressEvent::PhaseEntered {
            phase: AcquisitionPhase::Done,
        });
        contact
    }

    async fn gather_titles(
        &self,
        person_name: Option<&str>,
        company_name: &str,
        progress: &dyn ProgressSink,
    ) -> Vec<String> {
        let (titles, fallback) = match self.titles.likely_titles(person_name, company_name).await {
            Ok(titles) if !titles.is_empty() => (titles, false),
            Ok(_) => {
                progress.emit(ProgressEvent::IntelligenceFailed {
                    reason: "no titles returned".to_string(),
                });
                (self.config.fallback_titles.clone(), true)
            }
            Err(e) => {
                progress.emit(ProgressEvent::IntelligenceFailed {
                    reason: e.to_string(),
                });
                (self.config.fallback_titles.clone(), true)
            }
        };

        progress.emit(ProgressEvent::TitlesResolved {
            titles: titles.clone(),
            fallback,
        });
        titles
    }

    /// Pages through one search phase. Stops at the page limit, at the first empty page,
    /// or at the first failed page (which contributes nothing). Duplicate ids are dropped.
    async fn collect_pages(
        &self,
        phase: SearchPhase,
        target: &TargetSpec,
        query: &str,
        progress: &dyn ProgressSink,
    ) -> Vec<Candidate> {
        let mut seen = HashSet::new();
        let mut collected = Vec::new();

        for page in 1..=self.config.max_pages {
            let request = PageRequest {
                seniorities: &self.config.seniorities,
                page,
                per_page: self.config.per_page,
            };

            let result = match phase {
                SearchPhase::PersonCentric => {
                    self.search.search_people_by_keyword(query, request).await
                }
                SearchPhase::RoleCentric => {
                    self.search
                        .search_people_by_organization(query, &target.likely_titles, request)
                        .await
                }
            };

            let candidates = match result {
                Ok(candidates) => candidates,
                Err(e) => {
                    progress.emit(ProgressEvent::PageFailed {
                        phase,
                        page,
                        reason: e.to_string(),
                    });
                    break;
                }
            };

            progress.emit(ProgressEvent::PageFetched {
                phase,
                page,
                count: candidates.len(),
            });

            if candidates.is_empty() {
                break;
            }

            collected.extend(
                candidates
                    .into_iter()
                    .filter(|c| c.id.is_empty() || seen.insert(c.id.clone())),
            );
        }

        collected
    }

    async fn enrich_in_order(
        &self,
        ranked: &[ScoredCandidate],
        progress: &dyn ProgressSink,
    ) -> Option<Contact> {
        let mut attempted = 0;

        for scored in ranked {
            let candidate = &scored.candidate;
            let name = candidate.display_name().to_string();

            if let Some(contact) = Contact::from_candidate(candidate) {
                progress.emit(ProgressEvent::AlreadyUnlocked {
                    name: name.clone(),
                    score: scored.score,
                });
                progress.emit(ProgressEvent::ContactFound {
                    name,
                    email: contact.email.clone(),
                });
                return Some(contact);
            }

            if candidate.id.is_empty() {
                progress.emit(ProgressEvent::EnrichmentSkipped { name });
                continue;
            }

            progress.emit(ProgressEvent::Enriching {
                name: name.clone(),
                id: candidate.id.clone(),
                score: scored.score,
            });
            attempted += 1;

            match self.search.enrich_person(&candidate.id).await {
                Ok(Some(enriched)) => match Contact::from_enrichment(candidate, enriched) {
                    Some(contact) => {
                        progress.emit(ProgressEvent::ContactFound {
                            name,
                            email: contact.email.clone(),
                        });
                        return Some(contact);
                    }
                    None => progress.emit(ProgressEvent::EnrichmentEmpty { name }),
                },
                Ok(None) => progress.emit(ProgressEvent::EnrichmentEmpty { name }),
                Err(e) => progress.emit(ProgressEvent::EnrichmentFailed {
                    name,
                    reason: e.to_string(),
                }),
            }
        }

        progress.emit(ProgressEvent::Exhausted { attempted });
        None
    }
}

/// Highest-scoring candidate; the earliest one wins ties.
fn best_candidate(scorer: &CandidateScorer, candidates: Vec<Candidate>) -> Option<ScoredCandidate> {
    candidates
        .into_iter()
        .map(|candidate| ScoredCandidate {
            score: scorer.score(&candidate),
            candidate,
        })
        .fold(None, |best: Option<ScoredCandidate>, next| match best {
            Some(b) if b.score >= next.score => Some(b),
            _ => Some(next),
        })
}

/// Scores pending entries, keeps promoted scores, and sorts descending. The sort is
/// stable, so equal scores keep discovery order.
pub fn rank_pool(scorer: &CandidateScorer, pool: Vec<PoolEntry>) -> Vec<ScoredCandidate> {
    let mut ranked: Vec<ScoredCandidate> = pool
        .into_iter()
        .map(|entry| match entry {
            PoolEntry::Scored(scored) => scored,
            PoolEntry::Pending(candidate) => ScoredCandidate {
                score: scorer.score(&candidate),
                candidate,
            },
        })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}
