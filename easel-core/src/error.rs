use std::time::Duration;

use thiserror::Error;

use crate::tracker::EventType;

/// All errors produced by easel-core.
#[derive(Debug, Error)]
pub enum EaselError {
    #[error("'Tracker' plugin not provided")]
    NotProvided,

    #[error("no handler bound for event type {0}")]
    UnboundHandler(EventType),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email already in use: {0}")]
    EmailAlreadyInUse(String),

    #[error("password is too weak")]
    WeakPassword,

    #[error("backend error: {0}")]
    Backend(String),

    #[error("backend call timed out after {0:?}")]
    Timeout(Duration),

    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EaselError {
    /// `true` for errors caused by wiring the tracker incorrectly rather than
    /// by a failing backend.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::NotProvided | Self::UnboundHandler(_))
    }
}

pub type Result<T> = std::result::Result<T, EaselError>;
