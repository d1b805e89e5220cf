//! Error types for the admin service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use payout_fees::ConfigError;
use std::fmt;

/// Service error type.
#[derive(Debug)]
pub enum Error {
    /// Startup configuration error.
    Config(String),
    /// Settings persistence failure.
    Store(String),
    /// Mirrored calculation endpoint failed or returned garbage.
    Mirror(String),
    /// Mirror requested but not configured.
    MirrorUnavailable,
    /// Rejected setting write.
    Invalid(ConfigError),
    /// Malformed request body.
    BadRequest(String),
    /// Missing or wrong staff API key.
    Unauthorized,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Store(msg) => write!(f, "store error: {msg}"),
            Error::Mirror(msg) => write!(f, "mirror error: {msg}"),
            Error::MirrorUnavailable => write!(f, "mirrored calculation is not configured"),
            Error::Invalid(e) => write!(f, "{e}"),
            Error::BadRequest(msg) => write!(f, "{msg}"),
            Error::Unauthorized => write!(f, "Unauthorized: invalid or missing staff API key"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Invalid(e)
    }
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Config(_) | Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Mirror(_) => StatusCode::BAD_GATEWAY,
            Error::MirrorUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Error::Invalid(_) | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "success": false,
            "error": self.to_string()
        });
        (self.status(), Json(body)).into_response()
    }
}
