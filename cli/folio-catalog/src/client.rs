//! Catalog client issuing feed and search requests.

use std::fmt::Debug;
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, instrument};
use url::{Url, form_urlencoded};

use crate::config::CatalogClientConfig;
use crate::error::CatalogClientError;
pub use crate::mock::{MockClient, MockRequest, MockResponse};
use crate::parser::parse_feed;
use crate::token::BearerCredential;
use crate::types::CatalogFeed;

const DEFAULT_USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));
const OPDS_ACCEPT: &str = "application/atom+xml;profile=opds-catalog, application/atom+xml;q=0.9, application/xml;q=0.8";
const SEARCH_QUERY_PARAM: &str = "q";

/// Either a client for an actual catalog,
/// or a mock client for testing.
#[derive(Debug)]
#[enum_dispatch(ClientTrait)]
pub enum Client {
    Catalog(CatalogClient),
    Mock(MockClient),
}

/// The catalog interface consumed by the repository.
///
/// Every call is exactly one round trip; retries belong to the transport.
#[enum_dispatch]
#[allow(async_fn_in_trait)]
pub trait ClientTrait {
    /// Fetch and parse the feed at `url`.
    ///
    /// Returns `Ok(None)` if the catalog answered successfully without a document.
    async fn fetch_feed(&self, url: &Url) -> Result<Option<CatalogFeed>, CatalogClientError>;

    /// Fetch the results for `query`, using `base_url` as the search endpoint.
    ///
    /// See [`search_url`] for how the request URL is built.
    async fn search(
        &self,
        query: impl AsRef<str> + Send + Sync,
        base_url: impl AsRef<str> + Send + Sync,
    ) -> Result<Option<CatalogFeed>, CatalogClientError>;
}

/// A client for an OPDS catalog served over HTTP.
pub struct CatalogClient {
    client: reqwest::Client,
    config: CatalogClientConfig,
}

impl Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("catalog_url", &self.config.catalog_url)
            .field("authenticated", &self.config.bearer_token.is_some())
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client from configuration.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogClientError> {
        let client = build_http_client(&config)?;
        Ok(Self { client, config })
    }

    /// Get the configured catalog URL.
    pub fn catalog_url(&self) -> &str {
        &self.config.catalog_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.config.bearer_token.is_some()
    }

    /// Update the client configuration and recreate the HTTP client.
    pub fn update_config(
        &mut self,
        update: impl FnOnce(&mut CatalogClientConfig),
    ) -> Result<(), CatalogClientError> {
        let mut modified_config = self.config.clone();
        update(&mut modified_config);
        *self = Self::new(modified_config)?;
        Ok(())
    }

    /// Present `credential` on all subsequent requests.
    pub fn sign_in(&mut self, credential: &BearerCredential) -> Result<(), CatalogClientError> {
        let token = credential.access_token().to_string();
        self.update_config(|config| config.bearer_token = Some(token))
    }

    /// Discard the bearer token, e.g. after [`CatalogClientError::Unauthorized`].
    pub fn sign_out(&mut self) -> Result<(), CatalogClientError> {
        self.update_config(|config| config.bearer_token = None)
    }
}

impl ClientTrait for CatalogClient {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch_feed(&self, url: &Url) -> Result<Option<CatalogFeed>, CatalogClientError> {
        debug!("requesting catalog feed");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(CatalogClientError::from_transport)?;

        let status = response.status();
        debug!(%status, "received catalog response");
        if status == StatusCode::UNAUTHORIZED {
            return Err(CatalogClientError::Unauthorized);
        }
        if !status.is_success() {
            return Err(CatalogClientError::ServerError(status));
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response
            .bytes()
            .await
            .map_err(CatalogClientError::from_transport)?;
        if body.iter().all(u8::is_ascii_whitespace) {
            debug!("catalog response has no document");
            return Ok(None);
        }

        let feed = parse_feed(&body)?;
        Ok(Some(feed))
    }

    #[instrument(skip_all, fields(query = %query.as_ref()))]
    async fn search(
        &self,
        query: impl AsRef<str> + Send + Sync,
        base_url: impl AsRef<str> + Send + Sync,
    ) -> Result<Option<CatalogFeed>, CatalogClientError> {
        let url = search_url(query.as_ref(), base_url.as_ref())?;
        debug!(%url, "sending search request");
        self.fetch_feed(&url).await
    }
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn parse_url(url: &str) -> Result<Url, CatalogClientError> {
    Url::parse(url).map_err(|source| CatalogClientError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

/// Build the URL of a search for `query` against `base_url`.
///
/// Existing query parameters of `base_url` are kept as written,
/// a `q` parameter is replaced.
pub fn search_url(query: &str, base_url: &str) -> Result<Url, CatalogClientError> {
    let mut url = parse_url(base_url)?;

    let retained = url.query().map(|existing| {
        existing
            .split('&')
            .filter(|pair| !pair.is_empty() && !is_search_pair(pair))
            .collect::<Vec<_>>()
            .join("&")
    });
    url.set_query(retained.as_deref().filter(|retained| !retained.is_empty()));

    url.query_pairs_mut()
        .append_pair(SEARCH_QUERY_PARAM, query);

    Ok(url)
}

fn is_search_pair(pair: &str) -> bool {
    form_urlencoded::parse(pair.as_bytes())
        .next()
        .is_some_and(|(key, _)| key == SEARCH_QUERY_PARAM)
}

// ---------------------------------------------------------------------------
// HTTP client builder
// ---------------------------------------------------------------------------

/// Build the HTTP client, with bearer token auth if a token is configured.
fn build_http_client(config: &CatalogClientConfig) -> Result<reqwest::Client, CatalogClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static(OPDS_ACCEPT));

    if let Some(token) = &config.bearer_token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| CatalogClientError::Other(e.to_string()))?;
        value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, value);
    }

    for (key, value) in &config.extra_headers {
        headers.insert(
            header::HeaderName::from_str(key).map_err(
                |e: header::InvalidHeaderName| CatalogClientError::Other(e.to_string()),
            )?,
            HeaderValue::from_str(value).map_err(|e: header::InvalidHeaderValue| {
                CatalogClientError::Other(e.to_string())
            })?,
        );
    }

    debug!(
        catalog_url = %config.catalog_url,
        has_token = config.bearer_token.is_some(),
        extra_headers = config.extra_headers.len(),
        "building catalog HTTP client"
    );

    let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);

    reqwest::Client::builder()
        .default_headers(headers)
        .user_agent(user_agent)
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| CatalogClientError::Other(e.to_string()))
}
