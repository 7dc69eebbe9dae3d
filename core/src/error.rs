//! Error types for the items API client and shared configuration.
//!
//! `NotFound` and `Validation` get dedicated variants because callers
//! distinguish "the record does not exist" and "the input was rejected"
//! from "the server returned an unexpected status". All other non-2xx
//! responses land in `HttpError` with the raw status code and body.

use thiserror::Error;

/// Errors returned by `ItemClient` build/parse methods and by transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the requested record does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server rejected the input and named the offending field.
    #[error("validation failed on `{field}`: {message}")]
    Validation { field: String, message: String },

    /// The server returned a non-2xx status not covered above.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request never produced a response (connect failure, timeout).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

/// Errors raised while reading database settings from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read MYSQL_* settings: {0}")]
    Env(#[from] envy::Error),

    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("invalid database url: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid database setting `{0}`")]
    Invalid(&'static str),
}
