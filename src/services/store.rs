//! The object-store seam: the two calls the gateway needs.

use crate::{
    errors::StoreResult,
    models::{listing::ListObjectsPage, object::ObjectPayload},
};
use async_trait::async_trait;

/// Delimiter used for every list call; groups keys into "directories".
pub const DELIMITER: &str = "/";

/// Read-only access to one bucket.
///
/// Implementations are shared across all requests and must not hold
/// per-request state.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// One list call with delimiter [`DELIMITER`], continuing after `marker`.
    async fn list_objects(&self, prefix: &str, marker: Option<&str>)
    -> StoreResult<ListObjectsPage>;

    /// Fetch an object's metadata and an unread body stream.
    async fn get_object(&self, key: &str) -> StoreResult<ObjectPayload>;
}
