use std::sync::Arc;

use crate::config::Config;
use crate::outreach::acquisition::AcquisitionController;
use crate::outreach::people_search::PeopleSearch;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Provider client, shared with the controller. Handlers use it directly for company
    /// resolution and lookups.
    pub people_search: Arc<dyn PeopleSearch>,
    pub acquisition: Arc<AcquisitionController>,
}
