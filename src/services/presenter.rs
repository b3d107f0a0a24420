//! Turns listings into what the listing page shows: a breadcrumb trail and a
//! table of display records.

use crate::models::{
    listing::{ObjectSummary, SubPrefix},
    view::{Breadcrumb, DisplayRecord},
};
use chrono::{DateTime, Utc};

/// Default label length before truncation.
pub const DEFAULT_LABEL_WIDTH: usize = 50;

/// Width of the size column in the fixed-width listing.
pub const SIZE_COLUMN_WIDTH: usize = 20;

const ELLIPSIS: &str = "..>";
const DIR_SIZE_PLACEHOLDER: &str = "-";
const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M";

/// Build the breadcrumb trail for `path`, rooted at `root_label`.
///
/// `build_breadcrumbs("bucket", "a/b/")` yields `bucket` → `/`, `a` → `/a/`,
/// `b` → `/a/b/`, with only the last element marked current. Empty segments
/// (`a//b/`) get no crumb of their own, but later hrefs still include them.
pub fn build_breadcrumbs(root_label: &str, path: &str) -> Vec<Breadcrumb> {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    let segments: Vec<&str> = if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    };

    let mut crumbs = Vec::with_capacity(segments.len() + 1);
    crumbs.push(Breadcrumb {
        label: root_label.to_string(),
        href: "/".to_string(),
        is_last: false,
    });
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }
        crumbs.push(Breadcrumb {
            label: (*segment).to_string(),
            href: format!("/{}/", segments[..=i].join("/")),
            is_last: false,
        });
    }

    if let Some(last) = crumbs.last_mut() {
        last.is_last = true;
    }
    crumbs
}

/// Renders listing entries into display records.
#[derive(Clone, Debug)]
pub struct ListingRenderer {
    label_width: usize,
    /// Shown for directories, which carry no modification time.
    rendered_at: DateTime<Utc>,
}

impl ListingRenderer {
    pub fn new(label_width: usize, rendered_at: DateTime<Utc>) -> Self {
        Self {
            label_width,
            rendered_at,
        }
    }

    /// Sub-prefixes first, then objects, each in the order received.
    pub fn render(
        &self,
        prefix: &str,
        sub_prefixes: &[SubPrefix],
        objects: &[ObjectSummary],
    ) -> Vec<DisplayRecord> {
        let dirs = sub_prefixes.iter().map(|sp| {
            let name = strip_query_prefix(&sp.prefix, prefix);
            DisplayRecord {
                url: name.to_string(),
                label: truncate_label(name, self.label_width),
                formatted_size: format_size(None),
                formatted_timestamp: format_timestamp(&self.rendered_at),
            }
        });

        let files = objects.iter().map(|obj| {
            let name = strip_query_prefix(&obj.key, prefix);
            DisplayRecord {
                url: name.to_string(),
                label: truncate_label(name, self.label_width),
                formatted_size: format_size(Some(obj.size)),
                formatted_timestamp: format_timestamp(&obj.last_modified),
            }
        });

        dirs.chain(files).collect()
    }

    /// The `..` row linking to the parent listing.
    pub fn parent_record(&self) -> DisplayRecord {
        DisplayRecord {
            url: "../".to_string(),
            label: "../".to_string(),
            formatted_size: format_size(None),
            formatted_timestamp: format_timestamp(&self.rendered_at),
        }
    }
}

/// Key with the query prefix removed from its start.
pub fn strip_query_prefix<'a>(key: &'a str, prefix: &str) -> &'a str {
    key.strip_prefix(prefix).unwrap_or(key)
}

/// Shorten `label` to at most `width` characters, ending with an ellipsis
/// marker when cut. Widths too narrow for the marker cut without it.
pub fn truncate_label(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        return label.to_string();
    }
    if width < ELLIPSIS.len() {
        return label.chars().take(width).collect();
    }
    let keep = width - ELLIPSIS.len();
    let mut short: String = label.chars().take(keep).collect();
    short.push_str(ELLIPSIS);
    short
}

/// Right-justified byte count; `None` (directories) renders a placeholder.
pub fn format_size(size: Option<u64>) -> String {
    match size {
        Some(bytes) => format!("{bytes:>width$}", width = SIZE_COLUMN_WIDTH),
        None => format!("{DIR_SIZE_PLACEHOLDER:>width$}", width = SIZE_COLUMN_WIDTH),
    }
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}
