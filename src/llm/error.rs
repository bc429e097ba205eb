//! LLM error types.
//!
//! Nothing in this crate retries. The kind is carried for logs, and for callers that need to
//! tell a rejected key from an outage.

use thiserror::Error;

/// Failure of one chat completion call.
#[derive(Debug, Error)]
#[error("{kind}{}: {message}", http_suffix(.status_code))]
pub struct LlmError {
    pub kind: LlmErrorKind,
    /// Set when the provider answered with a non-success status.
    pub status_code: Option<u16>,
    pub message: String,
}

fn http_suffix(status_code: &Option<u16>) -> String {
    status_code
        .map(|code| format!(" (HTTP {})", code))
        .unwrap_or_default()
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status_code,
            message: message.into(),
        }
    }

    /// Non-success HTTP response. The body is kept verbatim as the message.
    pub fn from_status(status_code: u16, body: &str) -> Self {
        Self::new(classify_http_status(status_code), Some(status_code), body)
    }

    /// No usable HTTP exchange happened.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::NetworkError, None, message)
    }

    /// The provider answered 2xx but the body was not what we expect.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::ParseError, None, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// 429
    RateLimited,
    /// 5xx and anything else unexpected
    ServerError,
    /// Other 4xx: bad request, bad key, unknown model
    ClientError,
    NetworkError,
    ParseError,
}

impl LlmErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmErrorKind::RateLimited => "Rate limited",
            LlmErrorKind::ServerError => "Server error",
            LlmErrorKind::ClientError => "Client error",
            LlmErrorKind::NetworkError => "Network error",
            LlmErrorKind::ParseError => "Parse error",
        }
    }
}

impl std::fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify_http_status(status: u16) -> LlmErrorKind {
    match status {
        429 => LlmErrorKind::RateLimited,
        400..=499 => LlmErrorKind::ClientError,
        _ => LlmErrorKind::ServerError,
    }
}

/// Map a transport failure from reqwest.
pub(crate) fn from_reqwest(e: reqwest::Error) -> LlmError {
    let what = if e.is_timeout() {
        "Request timeout"
    } else if e.is_connect() {
        "Connection failed"
    } else {
        "Request failed"
    };
    LlmError::network(format!("{}: {}", what, e))
}
