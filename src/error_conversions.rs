//! Error conversion glue between form, repository and service layers.
//!
//! The domain layer must not depend on service or repository error types, so
//! the cross-layer conversions live here.

use crate::domain::types::TypeConstraintError;
use crate::forms::catalog::CatalogFormError;
use crate::forms::orders::OrderFormError;
use crate::services::errors::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}

impl From<CatalogFormError> for ServiceError {
    fn from(val: CatalogFormError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}

impl From<OrderFormError> for ServiceError {
    fn from(val: OrderFormError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}
