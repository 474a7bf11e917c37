pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::outreach::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Outreach API
        .route(
            "/api/v1/outreach/contact",
            post(handlers::handle_find_contact),
        )
        .route(
            "/api/v1/outreach/companies",
            get(handlers::handle_search_company),
        )
        .route(
            "/api/v1/outreach/people/:id",
            get(handlers::handle_lookup_person),
        )
        .with_state(state)
}
