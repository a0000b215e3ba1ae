//! Error taxonomy for the Linkbar client.
//!
//! # Design
//! Three top-level failure classes, matching what callers do about them:
//! `Configuration` never touched the network (fix the call site), `Decode`
//! means the server answered with a shape this library cannot interpret, and
//! `Http` carries the classified status for remediation — re-auth on 401,
//! fix the payload on 400, treat 404 as an absent resource.

use std::fmt;

use serde_json::Value;

/// Errors returned by client operations.
#[derive(Debug)]
pub enum ApiError {
    /// Local precondition violation; the network was never reached.
    Configuration(String),

    /// A response was received but its body, or a field of it, is unusable.
    /// Only absent fields get defaults — present-but-malformed data fails.
    Decode(String),

    /// The server or the transport reported a failure.
    Http(HttpError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            ApiError::Decode(msg) => write!(f, "decode failed: {msg}"),
            ApiError::Http(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Classification of an HTTP-level failure.
///
/// `Other` covers every status without a dedicated variant; the real status
/// code is preserved on the [`HttpError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    BadRequest,
    Unauthorized,
    NotFound,
    Other,
}

impl HttpErrorKind {
    /// Status-code dispatch table. Anything unmapped lands on `Other`.
    pub fn from_status(status: u16) -> HttpErrorKind {
        match status {
            400 => HttpErrorKind::BadRequest,
            401 => HttpErrorKind::Unauthorized,
            404 => HttpErrorKind::NotFound,
            _ => HttpErrorKind::Other,
        }
    }
}

/// An HTTP failure: classified kind, raw status code, derived human message,
/// and the parsed error body when the server sent JSON.
///
/// Transport-level failures that produced no response use status `0`.
#[derive(Debug)]
pub struct HttpError {
    pub kind: HttpErrorKind,
    pub status: u16,
    pub message: String,
    pub response_data: Option<Value>,
}

impl HttpError {
    /// Classify a non-success HTTP response.
    pub fn from_response(status: u16, message: String, response_data: Option<Value>) -> HttpError {
        HttpError {
            kind: HttpErrorKind::from_status(status),
            status,
            message,
            response_data,
        }
    }

    /// Wrap a network-level failure that produced no response.
    pub fn transport(message: String) -> HttpError {
        HttpError {
            kind: HttpErrorKind::Other,
            status: 0,
            message,
            response_data: None,
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.status == 0 {
            write!(f, "transport failure: {}", self.message)
        } else {
            write!(f, "HTTP {}: {}", self.status, self.message)
        }
    }
}

impl std::error::Error for HttpError {}
