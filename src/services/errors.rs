use thiserror::Error;

use crate::domain::order::OrderStatus;
use crate::repository::errors::RepositoryError;

/// Error contract surfaced to the presentation layer.
///
/// Each variant maps to exactly one HTTP failure mode in the shell; the core
/// only promises the kind and a human-readable message.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The user is not allowed to touch the entity.
    #[error("unauthorized")]
    Unauthorized,
    /// Requested resource was not found.
    #[error("not found")]
    NotFound,
    /// The operation is not applicable to the entity's current shape.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// Illegal order status change.
    #[error("invalid order status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    /// Reservation would drive stock negative.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i32, available: i32 },
    /// Car not orderable, pickup point inactive, and similar.
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("order is already paid")]
    AlreadyPaid,
    /// Malformed input: bad filter JSON, out-of-range enum values, etc.
    #[error("validation error: {0}")]
    Validation(String),
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::InvalidOperation(msg) => Self::InvalidOperation(msg),
            RepositoryError::InvalidTransition { from, to } => {
                Self::InvalidTransition { from, to }
            }
            RepositoryError::InsufficientStock {
                requested,
                available,
                ..
            } => Self::InsufficientStock {
                requested,
                available,
            },
            RepositoryError::Unavailable(msg) => Self::Unavailable(msg),
            RepositoryError::AlreadyPaid => Self::AlreadyPaid,
            RepositoryError::ValidationError(msg) => Self::Validation(msg),
            RepositoryError::Pool(e) => {
                log::error!("connection pool failure: {e}");
                Self::Internal
            }
            RepositoryError::Database(e) => {
                log::error!("database failure: {e}");
                Self::Internal
            }
        }
    }
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
