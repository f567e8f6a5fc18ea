use thiserror::Error;

use crate::decimal::Money;
use crate::types::CollateralStatus;

/// recoverable failures surfaced to the caller; none of these abort the
/// process, and no operation leaves partial state behind one of them
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("validation failed on {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("{entity} not found: {id}")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    #[error("status transition not permitted: {from} -> {to}")]
    InvalidTransition {
        from: CollateralStatus,
        to: CollateralStatus,
    },

    #[error("unauthorized: {action} requires one of {required:?}")]
    Unauthorized {
        action: &'static str,
        required: &'static [crate::auth::Role],
    },

    #[error("capacity exceeded: available {available}, requested {requested}")]
    CapacityExceeded {
        available: Money,
        requested: Money,
    },

    #[error("conflict: {message}")]
    Conflict {
        message: String,
    },

    #[error("{entity} still has {dependents} dependent record(s)")]
    DependencyExists {
        entity: &'static str,
        dependents: usize,
    },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
