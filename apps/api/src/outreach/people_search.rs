//! People-search provider: the only module that talks to the Apollo REST API.
//!
//! Every call carries a fixed timeout and is attempted exactly once. Failures are returned
//! as `PeopleSearchError`; the acquisition controller treats them as "zero results".

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::outreach::models::{Candidate, EmailStatus, Organization};

pub const DEFAULT_BASE_URL: &str = "https://api.apollo.io";

const COMPANY_SEARCH_PATH: &str = "/api/v1/mixed_companies/search";
const PEOPLE_SEARCH_PATH: &str = "/api/v1/mixed_people/search";
const PEOPLE_MATCH_PATH: &str = "/api/v1/people/match";
const PEOPLE_PATH: &str = "/api/v1/people";
const COMPANY_SEARCH_PER_PAGE: u32 = 10;

#[derive(Debug, Error)]
pub enum PeopleSearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid person id: {0:?}")]
    InvalidId(String),
}

/// Provider person ids are opaque tokens of ASCII letters, digits, `_` and `-`. They are
/// placed in a URL path, so anything else is refused before a request is built.
pub fn is_valid_person_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// One page request for a person search.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest<'a> {
    pub seniorities: &'a [String],
    pub page: u32,
    pub per_page: u32,
}

/// The provider operations acquisition depends on.
#[async_trait]
pub trait PeopleSearch: Send + Sync {
    /// Best organization for a company name (see [`pick_best_organization`]).
    async fn search_company(&self, name: &str) -> Result<Option<Organization>, PeopleSearchError>;

    /// Free-text person search with no company filter.
    async fn search_people_by_keyword(
        &self,
        keyword: &str,
        page: PageRequest<'_>,
    ) -> Result<Vec<Candidate>, PeopleSearchError>;

    /// Person search restricted to an organization domain and a set of titles.
    async fn search_people_by_organization(
        &self,
        domain: &str,
        titles: &[String],
        page: PageRequest<'_>,
    ) -> Result<Vec<Candidate>, PeopleSearchError>;

    /// Non-billed lookup of a single person by id.
    async fn lookup_person(&self, id: &str) -> Result<Option<Candidate>, PeopleSearchError>;

    /// Billed enrichment of a single person by id; reveals the email when one exists.
    async fn enrich_person(&self, id: &str) -> Result<Option<Candidate>, PeopleSearchError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CompanySearchRequest<'a> {
    q_organization_name: &'a str,
    page: u32,
    per_page: u32,
}

#[derive(Debug, Serialize)]
struct PeopleSearchRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    q_keywords: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    q_organization_domains_list: Option<Vec<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    person_titles: Option<&'a [String]>,
    person_seniorities: &'a [String],
    page: u32,
    per_page: u32,
}

#[derive(Debug, Serialize)]
struct EnrichRequest<'a> {
    id: &'a str,
    reveal_personal_emails: bool,
}

#[derive(Debug, Default, Deserialize)]
struct CompanySearchResponse {
    #[serde(default)]
    organizations: Vec<ApolloOrganization>,
    #[serde(default)]
    accounts: Vec<ApolloOrganization>,
}

#[derive(Debug, Default, Deserialize)]
struct PeopleSearchResponse {
    #[serde(default)]
    people: Vec<ApolloPerson>,
    #[serde(default)]
    contacts: Vec<ApolloPerson>,
}

#[derive(Debug, Deserialize)]
struct PersonResponse {
    person: Option<ApolloPerson>,
}

#[derive(Debug, Deserialize)]
struct ApolloOrganization {
    id: Option<String>,
    name: Option<String>,
    primary_domain: Option<String>,
    estimated_num_employees: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ApolloPerson {
    #[serde(default)]
    id: String,
    name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    title: Option<String>,
    email: Option<String>,
    email_status: Option<EmailStatus>,
    organization_name: Option<String>,
    organization: Option<ApolloOrganization>,
}

#[derive(Debug, Deserialize)]
struct ApolloErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl ApolloPerson {
    fn into_candidate(self) -> Candidate {
        let name = self.name.filter(|n| !n.trim().is_empty()).or_else(|| {
            let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
                .into_iter()
                .flatten()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            (!joined.is_empty()).then_some(joined)
        });

        let (org_name, employees) = match self.organization {
            Some(org) => (org.name, org.estimated_num_employees),
            None => (None, None),
        };

        Candidate {
            id: self.id,
            name,
            title: self.title,
            organization_name: org_name.or(self.organization_name),
            organization_employees: employees,
            email: self.email,
            email_status: self.email_status,
        }
    }
}

impl ApolloOrganization {
    fn into_organization(self) -> Option<Organization> {
        let name = self.name.filter(|n| !n.trim().is_empty())?;
        Some(Organization {
            id: self.id,
            name,
            primary_domain: self.primary_domain,
            employee_count: self.estimated_num_employees,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Organization tie-break
// ────────────────────────────────────────────────────────────────────────────

/// Picks the organization that best matches `query`:
/// 1. exact case-insensitive name equality;
/// 2. the largest organization whose name contains the query;
/// 3. the largest organization overall.
pub fn pick_best_organization(query: &str, organizations: Vec<Organization>) -> Option<Organization> {
    let query = query.trim().to_lowercase();

    if let Some(pos) = organizations
        .iter()
        .position(|o| o.name.trim().to_lowercase() == query)
    {
        return organizations.into_iter().nth(pos);
    }

    let largest = |orgs: Vec<Organization>| {
        // max_by_key keeps the last maximum; reverse so the first listed wins ties
        orgs.into_iter()
            .rev()
            .max_by_key(|o| o.employee_count.unwrap_or(0))
    };

    let (containing, others): (Vec<_>, Vec<_>) = organizations
        .into_iter()
        .partition(|o| !query.is_empty() && o.name.to_lowercase().contains(&query));

    if !containing.is_empty() {
        return largest(containing);
    }
    largest(others)
}

// ────────────────────────────────────────────────────────────────────────────
// Apollo client
// ────────────────────────────────────────────────────────────────────────────

/// Thin Apollo REST client. No retries: each call is attempted once.
#[derive(Clone)]
pub struct ApolloClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ApolloClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, PeopleSearchError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("X-Api-Key", &self.api_key)
            .header("Cache-Control", "no-cache")
            .json(body)
            .send()
            .await?;

        Self::decode(path, response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, PeopleSearchError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, PeopleSearchError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApolloErrorBody>(&body)
                .ok()
                .and_then(|e| e.error.or(e.message))
                .unwrap_or(body);
            return Err(PeopleSearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Apollo {} -> {}", path, status);
        Ok(response.json().await?)
    }

    async fn search_people(
        &self,
        request: PeopleSearchRequest<'_>,
    ) -> Result<Vec<Candidate>, PeopleSearchError> {
        let response: PeopleSearchResponse = self.post(PEOPLE_SEARCH_PATH, &request).await?;
        Ok(response
            .people
            .into_iter()
            .chain(response.contacts)
            .map(ApolloPerson::into_candidate)
            .collect())
    }
}

#[async_trait]
impl PeopleSearch for ApolloClient {
    async fn search_company(&self, name: &str) -> Result<Option<Organization>, PeopleSearchError> {
        let request = CompanySearchRequest {
            q_organization_name: name,
            page: 1,
            per_page: COMPANY_SEARCH_PER_PAGE,
        };
        let response: CompanySearchResponse = self.post(COMPANY_SEARCH_PATH, &request).await?;

        let organizations = response
            .organizations
            .into_iter()
            .chain(response.accounts)
            .filter_map(ApolloOrganization::into_organization)
            .collect();

        Ok(pick_best_organization(name, organizations))
    }

    async fn search_people_by_keyword(
        &self,
        keyword: &str,
        page: PageRequest<'_>,
    ) -> Result<Vec<Candidate>, PeopleSearchError> {
        self.search_people(PeopleSearchRequest {
            q_keywords: Some(keyword),
            q_organization_domains_list: None,
            person_titles: None,
            person_seniorities: page.seniorities,
            page: page.page,
            per_page: page.per_page,
        })
        .await
    }

    async fn search_people_by_organization(
        &self,
        domain: &str,
        titles: &[String],
        page: PageRequest<'_>,
    ) -> Result<Vec<Candidate>, PeopleSearchError> {
        self.search_people(PeopleSearchRequest {
            q_keywords: None,
            q_organization_domains_list: Some(vec![domain]),
            person_titles: Some(titles),
            person_seniorities: page.seniorities,
            page: page.page,
            per_page: page.per_page,
        })
        .await
    }

    async fn lookup_person(&self, id: &str) -> Result<Option<Candidate>, PeopleSearchError> {
        if !is_valid_person_id(id) {
            return Err(PeopleSearchError::InvalidId(id.to_string()));
        }
        let response: PersonResponse = self.get(&format!("{PEOPLE_PATH}/{id}")).await?;
        Ok(response.person.map(ApolloPerson::into_candidate))
    }

    async fn enrich_person(&self, id: &str) -> Result<Option<Candidate>, PeopleSearchError> {
        let request = EnrichRequest {
            id,
            reveal_personal_emails: false,
        };
        let response: PersonResponse = self.post(PEOPLE_MATCH_PATH, &request).await?;
        Ok(response.person.map(ApolloPerson::into_candidate))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn org(name: &str, employees: Option<u64>) -> Organization {
        Organization {
            id: None,
            name: name.to_string(),
            primary_domain: Some(format!("{}.com", name.to_lowercase().replace(' ', ""))),
            employee_count: employees,
        }
    }

    fn client(server: &MockServer) -> ApolloClient {
        ApolloClient::new("test-key".to_string(), server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn seniorities() -> Vec<String> {
        vec!["c_suite".to_string(), "vp".to_string()]
    }

    #[test]
    fn test_pick_exact_name_first() {
        let orgs = vec![org("Stripe Payments", Some(9000)), org("stripe", Some(10))];
        assert_eq!(pick_best_organization("Stripe", orgs).unwrap().name, "stripe");
    }

    #[test]
    fn test_pick_largest_containing_query() {
        let orgs = vec![
            org("Globex", Some(100_000)),
            org("Acme Robotics", Some(40)),
            org("Acme Holdings", Some(800)),
        ];
        assert_eq!(pick_best_organization("acme", orgs).unwrap().name, "Acme Holdings");
    }

    #[test]
    fn test_pick_largest_overall_when_nothing_contains_query() {
        let orgs = vec![org("Initech", Some(300)), org("Globex", Some(5000)), org("Hooli", None)];
        assert_eq!(pick_best_organization("Umbrella", orgs).unwrap().name, "Globex");
    }

    #[test]
    fn test_pick_first_listed_on_equal_size() {
        let orgs = vec![org("Acme East", Some(10)), org("Acme West", Some(10))];
        assert_eq!(pick_best_organization("Acme", orgs).unwrap().name, "Acme East");
    }

    #[test]
    fn test_pick_from_empty_is_none() {
        assert!(pick_best_organization("Acme", vec![]).is_none());
    }

    #[test]
    fn test_person_name_falls_back_to_first_and_last() {
        let person: ApolloPerson = serde_json::from_value(json!({
            "id": "p9",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "title": "CTO",
            "organization_name": "Analytical Engines"
        }))
        .unwrap();
        let c = person.into_candidate();
        assert_eq!(c.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(c.organization_name.as_deref(), Some("Analytical Engines"));
        assert_eq!(c.organization_employees, None);
    }

    #[tokio::test]
    async fn test_keyword_search_omits_company_filter() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PEOPLE_SEARCH_PATH))
            .and(header("X-Api-Key", "test-key"))
            .and(body_partial_json(json!({
                "q_keywords": "Jane Doe",
                "person_seniorities": ["c_suite", "vp"],
                "page": 1,
                "per_page": 25
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "people": [{
                    "id": "p1",
                    "name": "Jane Doe",
                    "title": "CTO",
                    "email": "email_not_unlocked@domain.com",
                    "email_status": "verified",
                    "organization": { "name": "Acme", "estimated_num_employees": 120 }
                }],
                "contacts": [{ "id": "p2", "name": "Jane Doe", "title": "Advisor" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let s = seniorities();
        let people = client(&server)
            .search_people_by_keyword("Jane Doe", PageRequest { seniorities: &s, page: 1, per_page: 25 })
            .await
            .unwrap();

        assert_eq!(people.len(), 2);
        assert_eq!(people[0].organization_name.as_deref(), Some("Acme"));
        assert_eq!(people[0].organization_employees, Some(120));
        assert_eq!(people[0].email_status, Some(EmailStatus::Verified));
        assert!(people[0].usable_email().is_none());

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body.get("q_organization_domains_list").is_none());
        assert!(body.get("person_titles").is_none());
    }

    #[tokio::test]
    async fn test_organization_search_sends_domain_and_titles() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PEOPLE_SEARCH_PATH))
            .and(body_partial_json(json!({
                "q_organization_domains_list": ["acme.io"],
                "person_titles": ["CTO", "VP of Engineering"],
                "page": 2
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "people": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let s = seniorities();
        let titles = vec!["CTO".to_string(), "VP of Engineering".to_string()];
        let people = client(&server)
            .search_people_by_organization(
                "acme.io",
                &titles,
                PageRequest { seniorities: &s, page: 2, per_page: 25 },
            )
            .await
            .unwrap();
        assert!(people.is_empty());
    }

    #[tokio::test]
    async fn test_company_search_applies_tie_break() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(COMPANY_SEARCH_PATH))
            .and(body_partial_json(json!({ "q_organization_name": "Acme" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organizations": [
                    { "id": "o1", "name": "Acme Widgets", "primary_domain": "acmewidgets.com", "estimated_num_employees": 30 },
                    { "id": "o2", "name": "Acme Cloud", "primary_domain": "acme.cloud", "estimated_num_employees": 900 }
                ],
                "accounts": [{ "id": "o3", "name": null }]
            })))
            .mount(&server)
            .await;

        let best = client(&server).search_company("Acme").await.unwrap().unwrap();
        assert_eq!(best.name, "Acme Cloud");
        assert_eq!(best.primary_domain.as_deref(), Some("acme.cloud"));
    }

    #[tokio::test]
    async fn test_enrich_person_posts_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PEOPLE_MATCH_PATH))
            .and(body_partial_json(json!({ "id": "p1", "reveal_personal_emails": false })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "person": { "id": "p1", "name": "Jane Doe", "email": "jane@acme.io", "email_status": "verified" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let enriched = client(&server).enrich_person("p1").await.unwrap().unwrap();
        assert_eq!(enriched.usable_email(), Some("jane@acme.io"));
    }

    #[tokio::test]
    async fn test_lookup_person_missing_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/people/p404"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "person": null })))
            .mount(&server)
            .await;

        assert!(client(&server).lookup_person("p404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_person_refuses_path_like_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "person": null })))
            .expect(0)
            .mount(&server)
            .await;

        let apollo = client(&server);
        for id in ["../mixed_people/search", "p1/../../x", "p1?x=1", "p%2F1", ""] {
            let err = apollo.lookup_person(id).await.unwrap_err();
            assert!(matches!(err, PeopleSearchError::InvalidId(ref bad) if bad == id));
        }
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn test_person_id_charset() {
        assert!(is_valid_person_id("5f1a2b3c4d5e6f7a8b9c0d1e"));
        assert!(is_valid_person_id("p_1-x"));
        assert!(!is_valid_person_id(".."));
        assert!(!is_valid_person_id("a b"));
        assert!(!is_valid_person_id("ünïcode"));
    }

    #[tokio::test]
    async fn test_error_status_surfaces_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PEOPLE_MATCH_PATH))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({ "error": "insufficient credits" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).enrich_person("p1").await.unwrap_err();
        match err {
            PeopleSearchError::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "insufficient credits");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_an_error_not_a_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PEOPLE_SEARCH_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "people": [] }))
                    .set_delay(Duration::from_millis(500)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let slow = ApolloClient::new("k".to_string(), server.uri(), Duration::from_millis(50)).unwrap();
        let s = seniorities();
        let result = slow
            .search_people_by_keyword("Jane", PageRequest { seniorities: &s, page: 1, per_page: 10 })
            .await;
        assert!(matches!(result, Err(PeopleSearchError::Http(_))));
    }
}
