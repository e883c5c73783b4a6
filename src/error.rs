//! Error taxonomy for target lookups.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Why a target lookup produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Upstream answered but had no target for the symbol.
    #[error("no target record found")]
    NotFound,
    /// Upstream answered with a non-success status code.
    #[error("HTTP {status}")]
    Http { status: u16 },
    /// Upstream reported an application-level error in the payload.
    #[error("remote error: {message}")]
    Remote { message: String },
    /// Transport failure, timeout or an unreadable response body.
    #[error("connection error: {0}")]
    Connection(String),
}

/// Stable tag for each [`LookupError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    HttpError,
    RemoteError,
    ConnectionError,
}

impl LookupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::Http { .. } => ErrorKind::HttpError,
            Self::Remote { .. } => ErrorKind::RemoteError,
            Self::Connection(_) => ErrorKind::ConnectionError,
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Connection(format!("request timed out: {err}"))
        } else {
            Self::Connection(err.to_string())
        }
    }
}

// Reports carry the error as `{ "kind": ..., "message": ... }`.
impl Serialize for LookupError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("LookupError", 2)?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}
