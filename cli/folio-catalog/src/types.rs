//! Catalog feed domain types.
//!
//! These types are produced by [`crate::parse_feed`] and are the
//! values the client and repository hand out.

use std::sync::Arc;

use serde::Serialize;

const ACQUISITION_REL_PREFIX: &str = "http://opds-spec.org/acquisition";

/// An Atom `<link>` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub href: String,
    pub rel: Option<String>,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
    pub title: Option<String>,
}

impl Link {
    /// Whether following this link acquires the publication (borrow, buy, sample, ...).
    pub fn is_acquisition(&self) -> bool {
        self.rel
            .as_deref()
            .is_some_and(|rel| rel.starts_with(ACQUISITION_REL_PREFIX))
    }
}

/// A single publication or navigation entry of a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: Option<String>,
    pub links: Vec<Link>,
}

/// A parsed catalog feed.
///
/// Entries are in document order.
/// The source document is kept for consumers that need fields not
/// surfaced here, see [`CatalogFeed::document`].
#[derive(Debug, Clone, Serialize)]
pub struct CatalogFeed {
    id: Option<String>,
    title: String,
    entries: Vec<CatalogEntry>,
    links: Vec<Link>,
    #[serde(skip)]
    source: Arc<str>,
}

impl CatalogFeed {
    pub(crate) fn new(
        id: Option<String>,
        title: String,
        entries: Vec<CatalogEntry>,
        links: Vec<Link>,
        source: Arc<str>,
    ) -> Self {
        Self {
            id,
            title,
            entries,
            links,
            source,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// The first feed-level link with the given relation.
    pub fn link(&self, rel: &str) -> Option<&Link> {
        self.links
            .iter()
            .find(|link| link.rel.as_deref() == Some(rel))
    }

    pub fn search_link(&self) -> Option<&Link> {
        self.link("search")
    }

    /// Link to the next page of a paginated feed.
    pub fn next_link(&self) -> Option<&Link> {
        self.link("next")
    }

    /// The raw markup this feed was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Reopen the underlying markup document.
    ///
    /// The source was already parsed successfully once,
    /// so this only fails if parsing is not deterministic.
    pub fn document(&self) -> Result<roxmltree::Document<'_>, roxmltree::Error> {
        crate::parser::parse_document(&self.source)
    }
}

impl PartialEq for CatalogFeed {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.entries == other.entries
            && self.links == other.links
    }
}
