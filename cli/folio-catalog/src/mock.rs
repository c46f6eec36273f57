//! An in-memory [`ClientTrait`] implementation for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use url::Url;

use crate::client::{ClientTrait, search_url};
use crate::error::CatalogClientError;
use crate::types::CatalogFeed;

type MockField<T> = Arc<Mutex<T>>;

/// A canned answer handed out by [`MockClient`].
#[derive(Debug)]
pub enum MockResponse {
    Feed(CatalogFeed),
    /// A successful response without a document
    Empty,
    Error(CatalogClientError),
}

/// A call received by [`MockClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockRequest {
    Fetch(Url),
    Search { query: String, base_url: String },
}

/// A client that answers from a queue of responses
/// and records every request it receives.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    // Shared so that clones handed to a repository can still be inspected.
    pub mock_responses: MockField<VecDeque<MockResponse>>,
    pub requests: MockField<Vec<MockRequest>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new response into the list of mock responses
    pub fn push_feed_response(&mut self, feed: CatalogFeed) {
        self.push(MockResponse::Feed(feed));
    }

    /// Push a response without a document
    pub fn push_empty_response(&mut self) {
        self.push(MockResponse::Empty);
    }

    /// Push an error into the list of mock responses
    pub fn push_error_response(&mut self, err: CatalogClientError) {
        self.push(MockResponse::Error(err));
    }

    fn push(&mut self, response: MockResponse) {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .push_back(response);
    }

    /// All requests received so far, oldest first.
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests
            .lock()
            .expect("couldn't acquire mock lock")
            .clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.requests()
            .iter()
            .filter(|request| matches!(request, MockRequest::Fetch(_)))
            .count()
    }

    pub fn search_count(&self) -> usize {
        self.requests()
            .iter()
            .filter(|request| matches!(request, MockRequest::Search { .. }))
            .count()
    }

    fn record(&self, request: MockRequest) {
        self.requests
            .lock()
            .expect("couldn't acquire mock lock")
            .push(request);
    }

    fn next_response(&self) -> Result<Option<CatalogFeed>, CatalogClientError> {
        let response = self
            .mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .pop_front();
        match response {
            Some(MockResponse::Feed(feed)) => Ok(Some(feed)),
            Some(MockResponse::Empty) => Ok(None),
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(CatalogClientError::Other(
                "no more mock responses".to_string(),
            )),
        }
    }
}

impl ClientTrait for MockClient {
    async fn fetch_feed(&self, url: &Url) -> Result<Option<CatalogFeed>, CatalogClientError> {
        self.record(MockRequest::Fetch(url.clone()));
        self.next_response()
    }

    async fn search(
        &self,
        query: impl AsRef<str> + Send + Sync,
        base_url: impl AsRef<str> + Send + Sync,
    ) -> Result<Option<CatalogFeed>, CatalogClientError> {
        let (query, base_url) = (query.as_ref(), base_url.as_ref());
        self.record(MockRequest::Search {
            query: query.to_string(),
            base_url: base_url.to_string(),
        });
        search_url(query, base_url)?;
        self.next_response()
    }
}
