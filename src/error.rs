//! Public error type for operation results.
//!
//! Internal code works with `anyhow::Result` and `.context(..)`. At the boundary of an operation
//! the error is classified with an `ErrorType` via `IntoResult::pub_result` so that callers can
//! tell a bad request apart from a missing record or a broken database.

use serde_json::{json, Value};
use std::fmt::{Debug, Display, Formatter};

/// The broad class of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// A malformed or out-of-range field in the request.
    Validation,
    /// The request referenced an expense id that does not exist.
    NotFound,
    /// An update request that did not carry any field to change.
    EmptyUpdate,
    /// The requested operation name is not one of the known operations.
    UnknownOperation,
    /// A failure while reading or writing the SQLite database.
    Database,
    /// A failure while creating or loading the configuration or home directory.
    Config,
    /// A failure in the MCP server transport.
    Service,
}

serde_plain::derive_display_from_serialize!(ErrorType);

/// The error returned by public operations.
pub struct Error {
    error_type: ErrorType,
    source: anyhow::Error,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new(error_type: ErrorType, source: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            source: source.into(),
        }
    }

    /// Creates an error from a message.
    pub fn msg(error_type: ErrorType, message: impl Display) -> Self {
        Self::new(error_type, anyhow::anyhow!("{message}"))
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    /// Renders the failure shape of the wire protocol: `{"success": false, "error": "..."}`.
    pub fn to_response(&self) -> Value {
        json!({
            "success": false,
            "error": self.to_string(),
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.source)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.source)
    }
}

impl std::error::Error for Error {}

/// Converts any internal result into a public `Result` with the given `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}
