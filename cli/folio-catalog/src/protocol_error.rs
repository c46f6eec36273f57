//! Error payloads returned by the token endpoint.
//!
//! The endpoint answers failed exchanges with
//! `{ "error": "<code>", "error_description": "<text>" }`.
//! Codes the client does not know are kept as [`ErrorCode::Unknown`]
//! so callers still get a usable error.

use std::fmt::Display;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// The `error` codes of the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ErrorCode {
    InvalidRequest,
    InvalidClient,
    InvalidGrant,
    UnauthorizedClient,
    UnsupportedGrantType,
    InvalidScope,
    /// A code this client was built without knowledge of.
    Unknown(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::InvalidClient => "invalid_client",
            ErrorCode::InvalidGrant => "invalid_grant",
            ErrorCode::UnauthorizedClient => "unauthorized_client",
            ErrorCode::UnsupportedGrantType => "unsupported_grant_type",
            ErrorCode::InvalidScope => "invalid_scope",
            ErrorCode::Unknown(code) => code,
        }
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "invalid_request" => ErrorCode::InvalidRequest,
            "invalid_client" => ErrorCode::InvalidClient,
            "invalid_grant" => ErrorCode::InvalidGrant,
            "unauthorized_client" => ErrorCode::UnauthorizedClient,
            "unsupported_grant_type" => ErrorCode::UnsupportedGrantType,
            "invalid_scope" => ErrorCode::InvalidScope,
            _ => ErrorCode::Unknown(code),
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body could not be parsed as JSON at all
    #[error("error response is not valid JSON")]
    InvalidJson(#[source] serde_json::Error),
    /// The body is JSON, but has no string `error` field
    #[error("error response has no 'error' code")]
    InvalidEnvelope(#[source] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorCode,
    #[serde(default)]
    error_description: Option<Value>,
}

/// A typed error returned by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolError {
    pub code: ErrorCode,
    pub description: Option<String>,
}

impl Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{}: {description}", self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Decode an error response body.
    ///
    /// A non-string `error_description` is treated as absent.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_slice(bytes).map_err(DecodeError::InvalidJson)?;
        if !value.is_object() {
            return Err(DecodeError::InvalidEnvelope(serde::de::Error::custom(
                "expected a JSON object",
            )));
        }
        let envelope = ErrorEnvelope::deserialize(&value).map_err(DecodeError::InvalidEnvelope)?;

        let description = match envelope.error_description {
            Some(Value::String(description)) => Some(description),
            _ => None,
        };

        Ok(Self {
            code: envelope.error,
            description,
        })
    }
}
