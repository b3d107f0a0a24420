//! Render-only records derived per request for the listing page.

/// One step of the breadcrumb trail above a listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Breadcrumb {
    pub label: String,
    /// Absolute href relative to the gateway root (`/`, `/a/`, `/a/b/`).
    pub href: String,
    /// The current location; rendered as plain text rather than a link.
    pub is_last: bool,
}

/// One row of a rendered listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayRecord {
    /// Relative href from the listing page. Never truncated.
    pub url: String,
    /// Display label, possibly truncated.
    pub label: String,
    pub formatted_size: String,
    pub formatted_timestamp: String,
}
