//! Maps incoming URL paths onto store keys.
//!
//! Everything here is pure string math so it can be tested in isolation.

/// Whether a resolved path addresses a "directory" or a single object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    Prefix,
    Object,
}

/// A request path resolved into the store's key space.
///
/// Invariant: never starts with `/`. Empty means the bucket root; a trailing
/// `/` marks a prefix request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestPath {
    key: String,
}

impl RequestPath {
    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> RequestKind {
        if self.key.is_empty() || self.key.ends_with('/') {
            RequestKind::Prefix
        } else {
            RequestKind::Object
        }
    }

    /// The path relative to `key_prefix`, as seen by the client.
    pub fn relative_to<'a>(&'a self, key_prefix: &str) -> &'a str {
        let key_prefix = key_prefix.strip_prefix('/').unwrap_or(key_prefix);
        self.key.strip_prefix(key_prefix).unwrap_or(&self.key)
    }
}

/// Resolve a decoded URL path against the base path and key prefix.
///
/// The base path is only stripped on a segment boundary: with base `/docs`,
/// `/docs/a` becomes `a` but `/docsx/a` stays `docsx/a` rather than the `x/a`
/// a plain string-prefix strip would give. A path outside the base path is
/// processed unmodified.
pub fn resolve(raw_path: &str, base_path: &str, key_prefix: &str) -> RequestPath {
    let path = strip_base_path(raw_path, base_path);
    let path = path.strip_prefix('/').unwrap_or(path);

    let key_prefix = key_prefix.strip_prefix('/').unwrap_or(key_prefix);

    RequestPath {
        key: format!("{key_prefix}{path}"),
    }
}

fn strip_base_path<'a>(raw_path: &'a str, base_path: &str) -> &'a str {
    let base = base_path.trim_end_matches('/');
    if base.is_empty() {
        return raw_path;
    }

    match raw_path.strip_prefix(base) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => raw_path,
    }
}

/// Normalize a configured base path to `/seg/seg` form (or empty).
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
