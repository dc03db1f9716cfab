//! Error taxonomy.
//!
//! Launch and initialization failures are session-wide and happen at most
//! once. Transport failures belong to the single call that hit them.

use thiserror::Error;

/// A failed HTTP exchange with the LRS or the launch fetch URL.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("LRS returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Endpoint {0} not valid")]
    InvalidEndpoint(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum XapiError {
    /// Malformed or partial launch input. No session is created.
    #[error("Invalid launch configuration: {0}")]
    Configuration(String),

    /// The fetch URL did not hand out a token.
    #[error("Authorization token exchange failed: {0}")]
    AuthExchange(String),

    #[error("Cannot fetch launch data: {0}")]
    LaunchData(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Failed to encode or decode JSON: {0}")]
    Json(String),

    /// A statement could not be completed from session defaults.
    #[error("Statement is missing required field: {0}")]
    MissingField(&'static str),
}

impl From<serde_json::Error> for XapiError {
    fn from(e: serde_json::Error) -> Self {
        XapiError::Json(e.to_string())
    }
}
