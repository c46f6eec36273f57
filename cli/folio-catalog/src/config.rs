//! Configuration types for client construction.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::time::Duration;

use url::Url;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for catalog client construction.
#[derive(Clone)]
pub struct CatalogClientConfig {
    /// URL of the top-level catalog feed.
    pub catalog_url: String,
    /// Optional bearer token for catalog scopes that require a patron session.
    pub bearer_token: Option<String>,
    /// Additional headers to include in requests.
    pub extra_headers: BTreeMap<String, String>,
    /// User agent to send instead of `folio/<version>`.
    pub user_agent: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Debug for CatalogClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClientConfig")
            .field("catalog_url", &self.catalog_url)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("extra_headers", &self.extra_headers.keys().collect::<Vec<_>>())
            .field("user_agent", &self.user_agent)
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl CatalogClientConfig {
    /// An anonymous configuration with default timeouts.
    pub fn new(catalog_url: impl Into<String>) -> Self {
        Self {
            catalog_url: catalog_url.into(),
            bearer_token: None,
            extra_headers: BTreeMap::new(),
            user_agent: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Configuration for the token endpoint of the lending service.
#[derive(Clone)]
pub struct AuthClientConfig {
    pub token_url: Url,
    pub client_id: String,
    /// When set, the client authenticates with HTTP Basic auth,
    /// otherwise `client_id` is sent as a form field.
    pub client_secret: Option<String>,
    /// Scope requested with every exchange, e.g. `websiteid:100 authorizationname:default`.
    pub scope: Option<String>,
}

impl Debug for AuthClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClientConfig")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("scope", &self.scope)
            .finish()
    }
}
