//! Home page counters

use serde::Serialize;
use utoipa::ToSchema;

/// Record counts shown on the index page
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct CatalogSummary {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
    /// Visits by the current session, this one included
    pub num_visits: i64,
}
