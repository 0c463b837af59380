//! Local library catalog
//!
//! REST JSON API over a catalog of books, authors, genres and languages,
//! tracking physical copies through their loan lifecycle and validating
//! renewal dates.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
