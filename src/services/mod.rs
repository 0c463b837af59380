//! Business logic services

pub mod catalog;
pub mod loan_policy;
pub mod loans;
pub mod sessions;
pub mod users;

use std::sync::Arc;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub users: users::UsersService,
    pub sessions: sessions::SessionService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        sessions: sessions::SessionService,
    ) -> Self {
        Self {
            loans: loans::LoansService::new(Arc::new(repository.book_instances.clone())),
            users: users::UsersService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository),
            sessions,
        }
    }
}
