//! The module contains the errors the engine can throw.
//!
//! Variants are grouped by [`ErrorKind`] so a transport layer can map them to
//! status codes without matching every variant:
//!
//! - validation errors, e.g. [`InvalidAmount`] or [`InvalidDate`];
//! - [`KeyNotFound`] when an item does not exist or is owned by someone else;
//! - [`ExistingKey`] when a uniqueness invariant would be violated.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidDate`]: EngineError::InvalidDate
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid email: {0}")]
    InvalidEmail(String),
    #[error("Invalid password: {0}")]
    InvalidPassword(String),
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Currency not supported: {0}")]
    UnsupportedCurrency(String),
    #[error("Exchange rates unavailable: {0}")]
    RateUnavailable(String),
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Coarse classification of [`EngineError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input.
    Validation,
    /// The referenced entity does not exist or is not owned by the caller.
    NotFound,
    /// A uniqueness invariant was violated.
    Conflict,
    /// Credentials did not match.
    Unauthorized,
    /// An external collaborator could not answer.
    Unavailable,
    Internal,
}

impl EngineError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount(_)
            | Self::InvalidName(_)
            | Self::InvalidDate(_)
            | Self::InvalidCurrency(_)
            | Self::InvalidColor(_)
            | Self::InvalidEmail(_)
            | Self::InvalidPassword(_)
            | Self::InvalidPeriod(_)
            | Self::UnsupportedCurrency(_) => ErrorKind::Validation,
            Self::KeyNotFound(_) => ErrorKind::NotFound,
            Self::ExistingKey(_) => ErrorKind::Conflict,
            Self::InvalidCredentials => ErrorKind::Unauthorized,
            Self::RateUnavailable(_) => ErrorKind::Unavailable,
            Self::PasswordHash(_) | Self::Database(_) => ErrorKind::Internal,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidDate(a), Self::InvalidDate(b)) => a == b,
            (Self::InvalidCurrency(a), Self::InvalidCurrency(b)) => a == b,
            (Self::InvalidColor(a), Self::InvalidColor(b)) => a == b,
            (Self::InvalidEmail(a), Self::InvalidEmail(b)) => a == b,
            (Self::InvalidPassword(a), Self::InvalidPassword(b)) => a == b,
            (Self::InvalidPeriod(a), Self::InvalidPeriod(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::UnsupportedCurrency(a), Self::UnsupportedCurrency(b)) => a == b,
            (Self::RateUnavailable(a), Self::RateUnavailable(b)) => a == b,
            (Self::PasswordHash(a), Self::PasswordHash(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
