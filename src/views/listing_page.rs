//! HTML for a directory listing: breadcrumb trail plus a fixed-width table.
//!
//! Markup lives in `templates/listing.html`; askama escapes every value
//! written into it. Hrefs are percent-encoded here before they reach the
//! template.

use crate::models::view::{Breadcrumb, DisplayRecord};
use askama::Template;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left alone in hrefs: RFC 3986 unreserved plus the separator.
const HREF: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// One breadcrumb as written into the page.
#[derive(Debug, Clone)]
pub struct CrumbLink {
    pub label: String,
    /// Percent-encoded, base path included.
    pub href: String,
    pub is_last: bool,
}

/// One line of the fixed-width listing.
#[derive(Debug, Clone)]
pub struct RowLine {
    pub href: String,
    pub label: String,
    /// Spaces aligning the timestamp column.
    pub padding: String,
    pub timestamp: String,
    pub size: String,
}

/// View model for a prefix listing page.
#[derive(Template)]
#[template(path = "listing.html")]
pub struct ListingView {
    pub title: String,
    pub crumbs: Vec<CrumbLink>,
    pub rows: Vec<RowLine>,
}

impl ListingView {
    /// `path` is the client-visible listing path relative to the key prefix.
    /// `base_path` is prepended to breadcrumb hrefs and `label_width` is the
    /// width the label column is padded to.
    pub fn new(
        bucket: &str,
        path: &str,
        base_path: &str,
        breadcrumbs: &[Breadcrumb],
        records: &[DisplayRecord],
        label_width: usize,
    ) -> Self {
        let crumbs = breadcrumbs
            .iter()
            .map(|crumb| CrumbLink {
                label: crumb.label.clone(),
                href: encode_href(&format!("{base_path}{}", crumb.href)),
                is_last: crumb.is_last,
            })
            .collect();

        let rows = records
            .iter()
            .map(|record| RowLine {
                href: encode_href(&record.url),
                label: record.label.clone(),
                padding: " ".repeat(label_width.saturating_sub(record.label.chars().count()) + 1),
                timestamp: record.formatted_timestamp.clone(),
                size: record.formatted_size.clone(),
            })
            .collect();

        Self {
            title: format!("Index of {bucket}/{path}"),
            crumbs,
            rows,
        }
    }
}

fn encode_href(href: &str) -> String {
    utf8_percent_encode(href, HREF).to_string()
}
