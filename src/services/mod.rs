use pushkind_common::repository::errors::RepositoryError;
use thiserror::Error;

use crate::forms::cart::CartFormError;
use crate::forms::catalog::CatalogFormError;

pub mod cart;
pub mod catalog;
pub mod session;

/// Result type returned by the service layer.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by the service layer to the route handlers.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Submitted cart form failed validation.
    #[error("invalid form data: {0}")]
    Form(#[from] CartFormError),
    /// Catalog input could not be imported.
    #[error("invalid catalog data: {0}")]
    Catalog(#[from] CatalogFormError),
    /// Requested product or cart line does not exist for this session.
    #[error("not found")]
    NotFound,
    /// Reading or writing the cookie session failed.
    #[error("session error: {0}")]
    Session(String),
    /// Persistence failure.
    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => ServiceError::NotFound,
            other => ServiceError::Repository(other),
        }
    }
}
