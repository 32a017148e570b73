use engine::{EngineError, ErrorKind};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
    #[error("terminal error: {0}")]
    Terminal(String),
}

impl AppError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Engine(err) => match err.kind() {
                ErrorKind::Validation => 2,
                ErrorKind::NotFound => 3,
                ErrorKind::Conflict => 4,
                ErrorKind::Unauthorized => 5,
                ErrorKind::Unavailable => 6,
                ErrorKind::Internal => 1,
            },
            Self::Usage(_) => 2,
            _ => 1,
        }
    }

    /// Short machine readable label printed next to the message.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Engine(err) => match err.kind() {
                ErrorKind::Validation => "validation",
                ErrorKind::NotFound => "not_found",
                ErrorKind::Conflict => "conflict",
                ErrorKind::Unauthorized => "unauthorized",
                ErrorKind::Unavailable => "unavailable",
                ErrorKind::Internal => "internal",
            },
            Self::Usage(_) => "validation",
            _ => "internal",
        }
    }
}
