//! Unified client error model.
//! This module provides a common error enum used across the session, query and
//! API layers, along with helper constructors and UI-facing mappers.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientError {
    /// Token present but past its expiry; the session is torn down.
    AuthExpired { code: String, message: String },
    /// Token could not be decoded at all; same effect as expiry.
    AuthInvalid { code: String, message: String },
    /// Action attempted without sufficient role or ownership. No network call is made.
    Unauthorized { code: String, message: String },
    /// Transport or server failure. Last-good cached data stays available.
    Network { code: String, message: String },
    /// Client-side form constraint violation; never reaches the query layer.
    Validation { code: String, message: String },
    Internal { code: String, message: String },
}

impl ClientError {
    pub fn code_str(&self) -> &str {
        match self {
            ClientError::AuthExpired { code, .. }
            | ClientError::AuthInvalid { code, .. }
            | ClientError::Unauthorized { code, .. }
            | ClientError::Network { code, .. }
            | ClientError::Validation { code, .. }
            | ClientError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ClientError::AuthExpired { message, .. }
            | ClientError::AuthInvalid { message, .. }
            | ClientError::Unauthorized { message, .. }
            | ClientError::Network { message, .. }
            | ClientError::Validation { message, .. }
            | ClientError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn auth_expired<S: Into<String>>(code: S, msg: S) -> Self { ClientError::AuthExpired { code: code.into(), message: msg.into() } }
    pub fn auth_invalid<S: Into<String>>(code: S, msg: S) -> Self { ClientError::AuthInvalid { code: code.into(), message: msg.into() } }
    pub fn unauthorized<S: Into<String>>(code: S, msg: S) -> Self { ClientError::Unauthorized { code: code.into(), message: msg.into() } }
    pub fn network<S: Into<String>>(code: S, msg: S) -> Self { ClientError::Network { code: code.into(), message: msg.into() } }
    pub fn validation<S: Into<String>>(code: S, msg: S) -> Self { ClientError::Validation { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { ClientError::Internal { code: code.into(), message: msg.into() } }

    /// True for both expiry and undecodable-token failures; both force the
    /// session back to anonymous and a redirect to login.
    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::AuthExpired { .. } | ClientError::AuthInvalid { .. })
    }

    /// True when the cached last-good data should stay on screen with an
    /// inline retry affordance.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Network { .. })
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for ClientError {}

pub type ClientResult<T> = Result<T, ClientError>;

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        // All transport-level failures surface as Network; the entry keeps its
        // last-good data and the UI offers retry.
        ClientError::Network { code: "network_error".into(), message: err.to_string() }
    }
}

impl From<anyhow::Error> for ClientError {
    fn from(err: anyhow::Error) -> Self {
        ClientError::Internal { code: "internal_error".into(), message: err.to_string() }
    }
}
