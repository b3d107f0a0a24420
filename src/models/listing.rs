//! Listing entities returned by the store and aggregated per prefix query.

use chrono::{DateTime, Utc};

/// A key prefix one segment deeper than the queried prefix (a "directory").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubPrefix {
    /// Full prefix string, including the queried prefix and trailing `/`.
    pub prefix: String,
}

/// A single object (a "file") reported by a list call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Full object key; always begins with the queried prefix.
    pub key: String,

    /// Size in bytes.
    pub size: u64,

    /// When the object was last modified.
    pub last_modified: DateTime<Utc>,
}

/// One raw page from a single list call.
#[derive(Clone, Debug, Default)]
pub struct ListObjectsPage {
    pub objects: Vec<ObjectSummary>,
    pub sub_prefixes: Vec<SubPrefix>,
    pub is_truncated: bool,

    /// Continuation marker supplied by the store, if any.
    pub next_marker: Option<String>,
}

impl ListObjectsPage {
    /// The key the next list call should continue after.
    ///
    /// Prefers the store's own marker. Otherwise the lexically greater of the
    /// last object key and the last sub-prefix, since a page may end on
    /// either (or hold only sub-prefixes).
    pub fn continuation_marker(&self) -> Option<&str> {
        if let Some(marker) = self.next_marker.as_deref() {
            return Some(marker);
        }
        let last_key = self.objects.last().map(|o| o.key.as_str());
        let last_prefix = self.sub_prefixes.last().map(|p| p.prefix.as_str());
        last_key.max(last_prefix)
    }
}

/// Logical listing of one prefix: the union of every page the store returned,
/// in store order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub prefix: String,
    pub entries: Vec<SubPrefix>,
    pub objects: Vec<ObjectSummary>,
}

impl ListingPage {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    /// Append one raw page, keeping store order.
    pub fn extend(&mut self, page: ListObjectsPage) {
        self.entries.extend(page.sub_prefixes);
        self.objects.extend(page.objects);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.objects.is_empty()
    }
}
