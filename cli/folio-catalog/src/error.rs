//! Error handling for catalog operations.

use reqwest::StatusCode;
use thiserror::Error;

use crate::parser::ParserError;

/// Common error type for catalog operations.
///
/// Transport failures ([`CatalogClientError::Offline`], [`CatalogClientError::ServerError`],
/// ...) are kept apart from [`CatalogClientError::Parse`], so callers can tell
/// "could not reach the catalog" from "the catalog sent something unusable".
#[derive(Debug, Error)]
pub enum CatalogClientError {
    #[error("invalid catalog URL '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// The server could not be reached or did not answer in time
    #[error("could not reach the catalog")]
    Offline(#[source] reqwest::Error),
    /// The bearer token was rejected; it should be discarded
    #[error("catalog rejected the access token")]
    Unauthorized,
    #[error("catalog responded with {0}")]
    ServerError(StatusCode),
    #[error("catalog request failed")]
    Request(#[source] reqwest::Error),
    #[error("catalog response could not be used")]
    Parse(#[from] ParserError),
    #[error("{0}")]
    Other(String),
}

impl CatalogClientError {
    /// Sort a transport error into [`CatalogClientError::Offline`] or [`CatalogClientError::Request`].
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            CatalogClientError::Offline(err)
        } else {
            CatalogClientError::Request(err)
        }
    }
}
