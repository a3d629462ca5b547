//! Unified application error model and mapping helpers.
//! One enum covers the guard taxonomy (unauthenticated / invalid credential /
//! forbidden) plus the plumbing failures around it, with helper constructors
//! and an HTTP status mapping for embedders that surface errors over the wire.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    UserInput { code: String, message: String },
    /// No credential present.
    Unauthenticated { code: String, message: String },
    /// Credential present but undecodable. Redirect-equivalent to
    /// Unauthenticated, kept distinct so it stays separately loggable.
    InvalidCredential { code: String, message: String },
    /// Valid identity, insufficient role.
    Forbidden { code: String, message: String },
    Http { code: String, message: String },
    Io { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::UserInput { code, .. }
            | AppError::Unauthenticated { code, .. }
            | AppError::InvalidCredential { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::Http { code, .. }
            | AppError::Io { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::UserInput { message, .. }
            | AppError::Unauthenticated { message, .. }
            | AppError::InvalidCredential { message, .. }
            | AppError::Forbidden { message, .. }
            | AppError::Http { message, .. }
            | AppError::Io { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn user<S: Into<String>>(code: S, msg: S) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn unauthenticated<S: Into<String>>(code: S, msg: S) -> Self { AppError::Unauthenticated { code: code.into(), message: msg.into() } }
    pub fn invalid_credential<S: Into<String>>(code: S, msg: S) -> Self { AppError::InvalidCredential { code: code.into(), message: msg.into() } }
    pub fn forbidden<S: Into<String>>(code: S, msg: S) -> Self { AppError::Forbidden { code: code.into(), message: msg.into() } }
    pub fn http<S: Into<String>>(code: S, msg: S) -> Self { AppError::Http { code: code.into(), message: msg.into() } }
    pub fn io<S: Into<String>>(code: S, msg: S) -> Self { AppError::Io { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::UserInput { .. } => 400,
            AppError::Unauthenticated { .. } => 401,
            AppError::InvalidCredential { .. } => 401,
            AppError::Forbidden { .. } => 403,
            AppError::Http { .. } => 502,
            AppError::Io { .. } => 503,
            AppError::Internal { .. } => 500,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Default mapping: treat as Io unless downcasted elsewhere
        AppError::Io { code: "io_error".into(), message: format!("{err:#}") }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Http { code: "http_error".into(), message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping() {
        assert_eq!(AppError::user("bad_input", "oops").http_status(), 400);
        assert_eq!(AppError::unauthenticated("no_token", "missing").http_status(), 401);
        assert_eq!(AppError::invalid_credential("bad_token", "garbled").http_status(), 401);
        assert_eq!(AppError::forbidden("forbidden", "no").http_status(), 403);
        assert_eq!(AppError::http("http_error", "bad gateway").http_status(), 502);
        assert_eq!(AppError::io("io", "io").http_status(), 503);
        assert_eq!(AppError::internal("internal", "panic").http_status(), 500);
    }

    #[test]
    fn display_includes_code_and_message() {
        let e = AppError::forbidden("forbidden", "admins only");
        assert_eq!(e.to_string(), "forbidden: admins only");
        assert_eq!(e.code_str(), "forbidden");
        assert_eq!(e.message(), "admins only");
    }
}
