use std::time::Duration;

use thiserror::Error;

/// Startup configuration problems. These are fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing credential: {var} is not set")]
    MissingCredential { var: &'static str },

    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },

    #[error("unknown {kind} provider: {value}")]
    UnknownProvider { kind: &'static str, value: String },
}

/// A third-party call that did not produce a usable answer.
///
/// The orchestrator never lets one of these reach the HTTP layer; each is
/// logged and turned into an empty or fallback value.
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request failed: {status} {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("unexpected payload: {0}")]
    Payload(String),

    #[error("no answer within {0:?}")]
    Timeout(Duration),
}

/// The text-generation reply did not have the requested shape.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("reply contains no structured block")]
    NoStructuredBlock,

    #[error("reply is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reply has no variant for locale {0}")]
    MissingLocale(String),

    #[error("variant {locale} has an empty {field}")]
    MissingField { locale: String, field: &'static str },
}

pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;
