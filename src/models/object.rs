//! Represents an object fetched from the store for streaming out.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use std::{fmt, io};

/// Store metadata for one object, translated into response headers.
#[derive(Clone, Debug, Default)]
pub struct ObjectMetadata {
    /// Size in bytes, if the store reported it.
    pub content_length: Option<u64>,

    /// MIME type.
    pub content_type: Option<String>,

    /// Content encoding (e.g. `gzip`).
    pub content_encoding: Option<String>,

    /// Entity tag exactly as the store returned it (already quoted for S3).
    pub etag: Option<String>,

    pub last_modified: Option<DateTime<Utc>>,

    /// Lifecycle expiration descriptor (S3 `x-amz-expiration` value).
    pub expiration: Option<String>,
}

/// Streaming body of an object.
pub type ObjectBody = BoxStream<'static, io::Result<Bytes>>;

/// A fetched object: metadata plus a body that has not been read yet.
pub struct ObjectPayload {
    pub metadata: ObjectMetadata,
    pub body: ObjectBody,
}

impl fmt::Debug for ObjectPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPayload")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}
