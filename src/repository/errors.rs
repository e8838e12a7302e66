use thiserror::Error;

use crate::domain::order::OrderStatus;
use crate::domain::types::{PartId, TypeConstraintError};

/// Typed failures surfaced by repository operations.
///
/// Constraint violations reported by the database are folded into the
/// corresponding typed variants so callers never have to inspect SQLSTATE
/// details.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("entity not found")]
    NotFound,
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("invalid order status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error(
        "insufficient stock for part {part_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        part_id: PartId,
        requested: i32,
        available: i32,
    },
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("order is already paid")]
    AlreadyPaid,
    #[error("validation error: {0}")]
    ValidationError(String),
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("database error: {0}")]
    Database(diesel::result::Error),
}

impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::NotFound => Self::NotFound,
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::ValidationError(info.message().to_string())
            }
            Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                Self::InvalidOperation(info.message().to_string())
            }
            other => Self::Database(other),
        }
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(err: TypeConstraintError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

/// Convenient alias for results returned from repository functions.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
