//! Authenticated OPDS catalog acquisition for the folio reading client.
//!
//! This crate provides:
//! - Bearer credential exchange with the lending service ([`AuthClient`])
//! - Typed decoding of the token endpoint's error payloads ([`ProtocolError`])
//! - Parsing of Atom/OPDS catalog feeds ([`parse_feed`])
//! - An HTTP catalog client and a mock for tests ([`CatalogClient`], [`MockClient`])
//! - A caching repository, the surface UI code talks to ([`CatalogRepository`])
//!
//! ## Usage
//!
//! ```ignore
//! use folio_catalog::{CatalogClient, CatalogClientConfig, CatalogRepository};
//!
//! let client = CatalogClient::new(CatalogClientConfig::new("https://example.org/opds"))?;
//! let repository = CatalogRepository::new(client);
//! let feed = repository.load_top_level_catalog(&url).await?;
//! ```

mod auth;
mod client;
mod config;
mod error;
mod mock;
mod parser;
mod protocol_error;
mod repository;
mod token;
mod types;

pub use auth::{AuthClient, AuthError, PatronCredentials};
pub use client::{
    CatalogClient,
    Client,
    ClientTrait,
    MockClient,
    MockRequest,
    MockResponse,
    search_url,
};
pub use config::{
    AuthClientConfig,
    CatalogClientConfig,
    DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use error::CatalogClientError;
pub use parser::{DocumentError, ParserError, UNTITLED_FEED, parse_feed};
pub use protocol_error::{DecodeError, ErrorCode, ProtocolError};
pub use repository::{CatalogRepository, CatalogRepositoryTrait};
pub use token::BearerCredential;
pub use types::{CatalogEntry, CatalogFeed, Link};
