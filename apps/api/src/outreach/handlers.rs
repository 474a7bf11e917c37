//! Axum route handlers for the Outreach API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::outreach::models::{Candidate, Contact, Organization};
use crate::outreach::people_search::is_valid_person_id;
use crate::outreach::progress::RecordingProgress;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub person_name: Option<String>,
    pub company_name: String,
    pub company_domain: Option<String>,
    /// Look the domain up through company search when `company_domain` is absent.
    #[serde(default)]
    pub resolve_domain: bool,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub contact: Option<Contact>,
    pub resolved_domain: Option<String>,
    pub log: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompanyQuery {
    pub name: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/outreach/contact
///
/// Runs one acquisition. "No contact" is a normal 200 response with `contact: null`.
pub async fn handle_find_contact(
    State(state): State<AppState>,
    Json(request): Json<ContactRequest>,
) -> Result<Json<ContactResponse>, AppError> {
    let company_name = request.company_name.trim();
    if company_name.is_empty() {
        return Err(AppError::Validation("company_name cannot be empty".to_string()));
    }

    let mut domain = request
        .company_domain
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    if domain.is_none() && request.resolve_domain {
        domain = resolve_domain(&state, company_name).await;
    }

    let progress = RecordingProgress::new();
    let run = state.acquisition.find_contact(
        request.person_name.as_deref(),
        company_name,
        domain.as_deref(),
        &progress,
    );

    let contact = tokio::time::timeout(state.config.acquisition_timeout, run)
        .await
        .map_err(|_| {
            AppError::Timeout(format!(
                "contact search for {company_name} exceeded {}s",
                state.config.acquisition_timeout.as_secs()
            ))
        })?;

    info!(
        "Contact search for {company_name}: {}",
        if contact.is_some() { "found" } else { "none" }
    );

    Ok(Json(ContactResponse {
        contact,
        resolved_domain: domain,
        log: progress.lines(),
    }))
}

/// GET /api/v1/outreach/companies?name=
///
/// Returns the organization company search resolves the name to.
pub async fn handle_search_company(
    State(state): State<AppState>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<Organization>, AppError> {
    let name = query.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    state
        .people_search
        .search_company(name)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No organization matches '{name}'")))
}

/// GET /api/v1/outreach/people/:id
pub async fn handle_lookup_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Candidate>, AppError> {
    if !is_valid_person_id(&id) {
        return Err(AppError::Validation(format!("Invalid person id: {id:?}")));
    }

    state
        .people_search
        .lookup_person(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Person {id} not found")))
}

/// Domain guessing lives here, with the caller, never inside the controller.
async fn resolve_domain(state: &AppState, company_name: &str) -> Option<String> {
    match state.people_search.search_company(company_name).await {
        Ok(Some(org)) => {
            let domain = org.primary_domain.filter(|d| !d.trim().is_empty());
            if domain.is_none() {
                warn!("Organization {} has no primary domain", org.name);
            }
            domain
        }
        Ok(None) => {
            warn!("No organization found for {company_name}");
            None
        }
        Err(e) => {
            warn!("Company search failed for {company_name}: {e}");
            None
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
