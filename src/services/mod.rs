//! Business logic services

pub mod catalog;
pub mod customers;
pub mod eligibility;
pub mod loans;
pub mod penalty;
pub mod users;

use std::sync::Arc;

use crate::{clock::Clock, config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub customers: customers::CustomersService,
    pub loans: loans::LoansService,
    pub users: users::UsersService,
}

impl Services {
    /// Create all services over the given repository
    pub fn new(repository: Repository, config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.catalog.clone()),
            customers: customers::CustomersService::new(repository.catalog),
            loans: loans::LoansService::new(
                repository.lending,
                clock.clone(),
                config.lending.loan_duration_days,
            ),
            users: users::UsersService::new(repository.users, clock, config.auth.clone()),
        }
    }
}
