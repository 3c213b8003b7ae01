use std::fmt;
use thiserror::Error;

/// The record kind a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Event,
    Registration,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Event => f.write_str("Event"),
            Entity::Registration => f.write_str("Registration"),
        }
    }
}

/// Why a request cannot proceed given the current state of its records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateViolation {
    FreeEvent,
}

impl fmt::Display for StateViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateViolation::FreeEvent => f.write_str("This event is free; no payment required"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    AlreadyPaid,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::AlreadyPaid => f.write_str("Payment already completed"),
        }
    }
}

/// External dependency that is not configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    Gateway,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::Gateway => f.write_str("Payment gateway not configured"),
        }
    }
}

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0} not found")]
    NotFound(Entity),
    #[error("{0}")]
    InvalidState(StateViolation),
    #[error("{0}")]
    Conflict(ConflictKind),
    #[error("Invalid payment signature")]
    SignatureInvalid,
    #[error("Order does not match registration")]
    OrderMismatch,
    #[error("{0}")]
    Unavailable(Dependency),
    #[error("Payment gateway error: {0}")]
    Upstream(String),
    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl RegistrationError {
    /// Machine-readable code for the security rejections a checkout client
    /// branches on.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            RegistrationError::SignatureInvalid => Some("INVALID_SIGNATURE"),
            RegistrationError::OrderMismatch => Some("ORDER_MISMATCH"),
            _ => None,
        }
    }

    /// Message safe to hand back to a caller. Upstream and internal details
    /// stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            RegistrationError::Upstream(_) => "Failed to create payment order".to_string(),
            RegistrationError::InternalError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        RegistrationError::InternalError(err.into())
    }
}

impl From<std::io::Error> for RegistrationError {
    fn from(err: std::io::Error) -> Self {
        RegistrationError::InternalError(Box::new(err))
    }
}

impl From<serde_json::Error> for RegistrationError {
    fn from(err: serde_json::Error) -> Self {
        RegistrationError::InternalError(Box::new(err))
    }
}

impl From<reqwest::Error> for RegistrationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RegistrationError::Upstream("gateway request timed out".to_string())
        } else {
            RegistrationError::Upstream(err.to_string())
        }
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for RegistrationError {
    fn from(err: rocksdb::Error) -> Self {
        RegistrationError::InternalError(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, RegistrationError>;
