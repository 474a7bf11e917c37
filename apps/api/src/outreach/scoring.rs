//! Candidate scoring: ranks raw search results before any credit is spent.
//!
//! The score is a pure function of the candidate and the target: no state survives between
//! calls, so scoring the same candidate twice always yields the same value.

use serde::{Deserialize, Serialize};

use crate::outreach::models::{Candidate, EmailStatus, TargetSpec};
use crate::outreach::spam::SpamDetector;
use crate::outreach::title_matcher::TitleMatcher;

/// Fixed scoring weights. Passed to the scorer at construction and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub exact_name: i64,
    pub company_exact: i64,
    pub company_partial: i64,
    pub title_match: i64,
    pub email_verified: i64,
    pub email_guessed: i64,
    pub spam_penalty: i64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            exact_name: 1000,
            company_exact: 100,
            company_partial: 60,
            title_match: 40,
            email_verified: 10,
            email_guessed: 5,
            spam_penalty: 2000,
        }
    }
}

impl ScoringWeights {
    /// Score at or above which a person-centric hit ends the search.
    pub fn high_confidence_threshold(&self) -> i64 {
        self.exact_name + self.company_partial
    }

    /// Largest score a name match can reach without any company bonus.
    pub fn max_without_company(&self) -> i64 {
        self.exact_name + self.title_match + self.email_verified.max(self.email_guessed)
    }

    /// Largest score a candidate can reach with zero spam indicators.
    pub fn max_bonus(&self) -> i64 {
        self.exact_name
            + self.company_exact.max(self.company_partial)
            + self.title_match
            + self.email_verified.max(self.email_guessed)
    }
}

/// Per-signal contributions to a candidate's score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub name: i64,
    pub company: i64,
    pub title: i64,
    pub email: i64,
    pub spam_indicators: u32,
    pub spam_penalty: i64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> i64 {
        self.name + self.company + self.title + self.email - self.spam_penalty
    }
}

/// Scores candidates against one target. Builds the title matcher once per target.
#[derive(Debug, Clone)]
pub struct CandidateScorer {
    weights: ScoringWeights,
    company_name: String,
    person_name: Option<String>,
    titles: TitleMatcher,
    spam: SpamDetector,
}

impl CandidateScorer {
    pub fn new(weights: ScoringWeights, target: &TargetSpec) -> Self {
        Self::for_parts(
            weights,
            &target.company_name,
            &target.likely_titles,
            target.person(),
        )
    }

    pub fn for_parts<S: AsRef<str>>(
        weights: ScoringWeights,
        company_name: &str,
        likely_titles: &[S],
        person_name: Option<&str>,
    ) -> Self {
        Self {
            weights,
            company_name: company_name.trim().to_lowercase(),
            person_name: person_name
                .map(|n| n.trim().to_lowercase())
                .filter(|n| !n.is_empty()),
            titles: TitleMatcher::new(likely_titles),
            spam: SpamDetector,
        }
    }

    pub fn score(&self, candidate: &Candidate) -> i64 {
        self.breakdown(candidate).total()
    }

    /// An exact name match at the target company scoring at or above the threshold.
    pub fn is_high_confidence(&self, candidate: &Candidate) -> bool {
        let b = self.breakdown(candidate);
        b.name > 0 && b.company > 0 && b.total() >= self.weights.high_confidence_threshold()
    }

    pub fn breakdown(&self, candidate: &Candidate) -> ScoreBreakdown {
        let w = &self.weights;

        let name = match (&self.person_name, candidate.name.as_deref()) {
            (Some(target), Some(name)) if name.trim().to_lowercase() == *target => w.exact_name,
            _ => 0,
        };

        let company = candidate
            .organization_name
            .as_deref()
            .map(|org| self.company_bonus(org))
            .unwrap_or(0);

        let title = match candidate.title.as_deref() {
            Some(t) if self.titles.is_match(t) => w.title_match,
            _ => 0,
        };

        let email = match candidate.email_status {
            Some(EmailStatus::Verified) => w.email_verified,
            Some(EmailStatus::Guessed) | Some(EmailStatus::Likely) => w.email_guessed,
            _ => 0,
        };

        let spam_indicators = self.spam.indicator_count(candidate);

        ScoreBreakdown {
            name,
            company,
            title,
            email,
            spam_indicators,
            spam_penalty: i64::from(spam_indicators) * w.spam_penalty,
        }
    }

    fn company_bonus(&self, organization: &str) -> i64 {
        let org = organization.trim().to_lowercase();
        if org.is_empty() || self.company_name.is_empty() {
            return 0;
        }
        if org == self.company_name {
            self.weights.company_exact
        } else if org.contains(&self.company_name) || self.company_name.contains(&org) {
            self.weights.company_partial
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles() -> Vec<String> {
        vec!["CTO".to_string(), "VP of Engineering".to_string()]
    }

    fn scorer(person: Option<&str>) -> CandidateScorer {
        CandidateScorer::for_parts(ScoringWeights::default(), "Acme", &titles(), person)
    }

    fn make_candidate(name: &str, title: &str, org: &str, status: Option<EmailStatus>) -> Candidate {
        Candidate {
            id: format!("id-{name}"),
            name: Some(name.to_string()),
            title: Some(title.to_string()),
            organization_name: Some(org.to_string()),
            organization_employees: Some(50),
            email: None,
            email_status: status,
        }
    }

    #[test]
    fn test_full_match_breakdown() {
        let c = make_candidate("Jane Doe", "CTO", "Acme", Some(EmailStatus::Verified));
        let b = scorer(Some("jane doe")).breakdown(&c);
        assert_eq!(b.name, 1000);
        assert_eq!(b.company, 100);
        assert_eq!(b.title, 40);
        assert_eq!(b.email, 10);
        assert_eq!(b.spam_penalty, 0);
        assert_eq!(b.total(), 1150);
    }

    #[test]
    fn test_company_partial_match_both_directions() {
        let s = scorer(None);
        let longer = make_candidate("A B", "Engineer", "Acme Corporation", None);
        let shorter = CandidateScorer::for_parts(
            ScoringWeights::default(),
            "Acme Corporation",
            &titles(),
            None,
        );
        let plain = make_candidate("A B", "Engineer", "acme", None);
        assert_eq!(s.breakdown(&longer).company, 60);
        assert_eq!(shorter.breakdown(&plain).company, 60);
        assert_eq!(s.breakdown(&make_candidate("A B", "X", "Globex", None)).company, 0);
    }

    #[test]
    fn test_verified_beats_guessed_and_likely() {
        let s = scorer(None);
        let verified = s.breakdown(&make_candidate("A B", "X", "Globex", Some(EmailStatus::Verified)));
        let guessed = s.breakdown(&make_candidate("A B", "X", "Globex", Some(EmailStatus::Guessed)));
        let likely = s.breakdown(&make_candidate("A B", "X", "Globex", Some(EmailStatus::Likely)));
        let unavailable =
            s.breakdown(&make_candidate("A B", "X", "Globex", Some(EmailStatus::Unavailable)));
        assert!(verified.email > guessed.email);
        assert_eq!(guessed.email, likely.email);
        assert!(guessed.email > 0);
        assert_eq!(unavailable.email, 0);
    }

    #[test]
    fn test_title_bonus_respects_boundaries() {
        let s = CandidateScorer::for_parts(ScoringWeights::default(), "Acme", &["President"], None);
        assert_eq!(s.breakdown(&make_candidate("A B", "Vice President", "Acme", None)).title, 0);
        assert_eq!(s.breakdown(&make_candidate("A B", "President, EMEA", "Acme", None)).title, 40);
    }

    #[test]
    fn test_empty_title_list_gives_no_title_bonus() {
        let empty: Vec<String> = vec![];
        let s = CandidateScorer::for_parts(ScoringWeights::default(), "Acme", &empty, None);
        assert_eq!(s.breakdown(&make_candidate("A B", "CTO", "Acme", None)).title, 0);
    }

    #[test]
    fn test_single_spam_indicator_outweighs_perfect_match() {
        let w = ScoringWeights::default();
        assert!(w.spam_penalty > w.max_bonus());

        let s = scorer(Some("Jane Doe"));
        let perfect = make_candidate("Jane Doe", "CTO", "Acme", Some(EmailStatus::Verified));
        let mut spammy = perfect.clone();
        spammy.organization_employees = Some(0);

        let clean_score = s.score(&perfect);
        let spam_score = s.score(&spammy);
        assert!(spam_score < 0);
        assert!(clean_score - spam_score >= w.spam_penalty);

        let bare = make_candidate("Nobody", "Intern", "Globex", None);
        assert!(s.score(&bare) > spam_score);
    }

    #[test]
    fn test_exact_name_outranks_everything_else() {
        let s = scorer(Some("Jane Doe"));
        let named = make_candidate("Jane Doe", "Intern", "Globex", None);
        let best_other = make_candidate("John Roe", "CTO", "Acme", Some(EmailStatus::Verified));
        assert!(s.score(&named) > s.score(&best_other));
    }

    #[test]
    fn test_name_match_is_trimmed_and_case_insensitive() {
        let s = scorer(Some("  JANE doe "));
        let c = make_candidate(" jane DOE", "X", "Globex", None);
        assert_eq!(s.breakdown(&c).name, 1000);
        assert_eq!(scorer(None).breakdown(&c).name, 0);
    }

    #[test]
    fn test_high_confidence_threshold() {
        let w = ScoringWeights::default();
        assert_eq!(w.high_confidence_threshold(), 1060);

        let s = scorer(Some("Jane Doe"));
        let exact = make_candidate("Jane Doe", "Intern", "Acme", None);
        let partial = make_candidate("Jane Doe", "Intern", "Acme Labs", None);
        let elsewhere = make_candidate("Jane Doe", "Intern", "Globex", None);
        assert!(s.is_high_confidence(&exact));
        assert!(s.is_high_confidence(&partial));
        assert!(!s.is_high_confidence(&elsewhere));
    }

    #[test]
    fn test_name_without_company_never_reaches_high_confidence() {
        let w = ScoringWeights::default();
        assert!(w.max_without_company() < w.high_confidence_threshold());

        let s = scorer(Some("Jane Doe"));
        let namesake = make_candidate("Jane Doe", "CTO", "Globex", Some(EmailStatus::Verified));
        assert_eq!(s.score(&namesake), 1050);
        assert!(s.score(&namesake) < w.high_confidence_threshold());
        assert!(!s.is_high_confidence(&namesake));

        let lenient = ScoringWeights {
            company_partial: 0,
            ..w
        };
        let s = CandidateScorer::for_parts(lenient, "Acme", &titles(), Some("Jane Doe"));
        assert!(s.score(&namesake) >= lenient.high_confidence_threshold());
        assert!(!s.is_high_confidence(&namesake));
    }

    #[test]
    fn test_scoring_is_repeatable() {
        let s = scorer(Some("Jane Doe"));
        let c = make_candidate("Jane Doe", "CTO", "Acme Inc", Some(EmailStatus::Guessed));
        assert_eq!(s.score(&c), s.score(&c));
        assert_eq!(s.breakdown(&c), s.breakdown(&c));
    }

    #[test]
    fn test_custom_weights_are_honoured() {
        let weights = ScoringWeights {
            title_match: 7,
            ..ScoringWeights::default()
        };
        let s = CandidateScorer::for_parts(weights, "Acme", &["CTO"], None);
        assert_eq!(s.breakdown(&make_candidate("A B", "CTO", "Globex", None)).title, 7);
    }
}
