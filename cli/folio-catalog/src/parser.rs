//! Parsing of Atom based OPDS catalog feeds.
//!
//! Parsing happens in two steps:
//! the response body is read as a markup document ([`ParserError::InvalidDocument`]),
//! which is then interpreted as an Atom feed ([`ParserError::InvalidFeed`]).

use std::collections::HashSet;
use std::sync::Arc;

use roxmltree::{Document, Node, ParsingOptions};
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::{CatalogEntry, CatalogFeed, Link};

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// Title used for feeds that do not declare one.
pub const UNTITLED_FEED: &str = "Untitled";

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("response is not a well-formed markup document")]
    InvalidDocument(#[source] DocumentError),
    #[error("document is not a catalog feed: {0}")]
    InvalidFeed(String),
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document is not valid UTF-8")]
    Encoding(#[from] std::str::Utf8Error),
    #[error(transparent)]
    Markup(#[from] roxmltree::Error),
}

/// Parse a response body into a [`CatalogFeed`].
///
/// Entries without an id or title, and entries repeating the id of an
/// earlier entry, are skipped with a warning instead of failing the feed.
pub fn parse_feed(bytes: &[u8]) -> Result<CatalogFeed, ParserError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ParserError::InvalidDocument(DocumentError::from(e)))?;
    let document = parse_document(text)
        .map_err(|e| ParserError::InvalidDocument(DocumentError::from(e)))?;

    let root = document.root_element();
    if root.tag_name().name() != "feed" {
        return Err(ParserError::InvalidFeed(format!(
            "expected root element <feed>, found <{}>",
            root.tag_name().name()
        )));
    }
    if let Some(namespace) = root.tag_name().namespace().filter(|ns| *ns != ATOM_NS) {
        return Err(ParserError::InvalidFeed(format!(
            "unexpected feed namespace '{namespace}'"
        )));
    }

    let title = child(root, "title")
        .and_then(text_content)
        .unwrap_or_else(|| UNTITLED_FEED.to_string());

    let mut seen_ids = HashSet::new();
    let mut entries = Vec::new();
    for (position, node) in children(root, "entry").enumerate() {
        let Some(entry) = parse_entry(node) else {
            warn!(position, "skipping catalog entry without id or title");
            continue;
        };
        if !seen_ids.insert(entry.id.clone()) {
            warn!(position, id = %entry.id, "skipping catalog entry with duplicate id");
            continue;
        }
        entries.push(entry);
    }

    let feed = CatalogFeed::new(
        child(root, "id").and_then(text_content),
        title,
        entries,
        links(root),
        Arc::from(text),
    );
    debug!(
        title = feed.title(),
        n_entries = feed.entries().len(),
        "parsed catalog feed"
    );
    Ok(feed)
}

/// Parse markup, allowing a `<!DOCTYPE>` declaration.
/// External subsets are never loaded.
pub(crate) fn parse_document(text: &str) -> Result<Document<'_>, roxmltree::Error> {
    Document::parse_with_options(text, ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    })
}

fn parse_entry(node: Node) -> Option<CatalogEntry> {
    let id = child(node, "id").and_then(text_content)?;
    let title = child(node, "title").and_then(text_content)?;

    let authors = children(node, "author")
        .filter_map(|author| child(author, "name").and_then(text_content))
        .collect();

    let summary = child(node, "summary")
        .or_else(|| child(node, "content"))
        .and_then(text_content);

    Some(CatalogEntry {
        id,
        title,
        authors,
        summary,
        links: links(node),
    })
}

fn links(node: Node) -> Vec<Link> {
    children(node, "link")
        .filter_map(|link| {
            let href = link.attribute("href")?;
            Some(Link {
                href: href.to_string(),
                rel: link.attribute("rel").map(str::to_string),
                mime_type: link.attribute("type").map(str::to_string),
                title: link.attribute("title").map(str::to_string),
            })
        })
        .collect()
}

fn is_atom_element(node: &Node, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && matches!(node.tag_name().namespace(), None | Some(ATOM_NS))
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |child| is_atom_element(child, name))
}

fn child<'a, 'input: 'a>(node: Node<'a, 'input>, name: &'a str) -> Option<Node<'a, 'input>> {
    children(node, name).next()
}

/// The trimmed text of an element and its descendants, `None` if empty.
fn text_content(node: Node) -> Option<String> {
    let text = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
