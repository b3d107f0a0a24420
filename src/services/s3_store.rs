//! `ObjectStore` backed by an S3-compatible service through the AWS SDK.

use crate::{
    config::StoreConfig,
    errors::{StoreError, StoreResult},
    models::{
        listing::{ListObjectsPage, ObjectSummary, SubPrefix},
        object::{ObjectMetadata, ObjectPayload},
    },
    services::store::{DELIMITER, ObjectStore},
};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{
    Client,
    config::Credentials,
    error::{DisplayErrorContext, SdkError},
    primitives::DateTime as SmithyDateTime,
};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::fmt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, instrument};

pub struct S3Store {
    client: Client,
    bucket: String,
}

impl fmt::Debug for S3Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Store")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl S3Store {
    /// Build a client from the store configuration.
    ///
    /// Explicit credentials take precedence; otherwise the AWS default
    /// provider chain (environment, profile, instance metadata) is used.
    pub async fn connect(config: &StoreConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);

        if let (Some(key_id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            builder = builder.credentials_provider(Credentials::new(
                key_id.clone(),
                secret.clone(),
                None,
                None,
                "bucket-gateway",
            ));
        }

        if let Some(endpoint) = &config.endpoint {
            // Custom endpoints (MinIO, Ceph, ...) generally need path-style
            // addressing.
            builder = builder
                .endpoint_url(normalize_endpoint(endpoint))
                .force_path_style(true);
        }

        info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = ?config.endpoint,
            "created S3 client"
        );

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        }
    }
}

/// Accept bare `host:port` endpoints by assuming plain HTTP.
fn normalize_endpoint(endpoint: &str) -> String {
    let lower = endpoint.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{endpoint}")
    }
}

fn to_chrono(dt: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

/// Keep the status the store answered with; anything that never produced an
/// HTTP response (timeouts, DNS, TLS) is a 502.
fn map_sdk_error<E>(err: SdkError<E>, what: &str) -> StoreError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let message = format!("{what}: {}", DisplayErrorContext(&err));
    match err.raw_response() {
        Some(raw) => StoreError::from_status_code(raw.status().as_u16(), message),
        None => StoreError::bad_gateway(message),
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn list_objects(
        &self,
        prefix: &str,
        marker: Option<&str>,
    ) -> StoreResult<ListObjectsPage> {
        debug!("S3 LIST");

        let output = self
            .client
            .list_objects()
            .bucket(&self.bucket)
            .prefix(prefix)
            .delimiter(DELIMITER)
            .set_marker(marker.map(str::to_string))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &format!("listing `{prefix}`")))?;

        let objects = output
            .contents()
            .iter()
            .filter_map(|obj| {
                Some(ObjectSummary {
                    key: obj.key()?.to_string(),
                    size: obj.size().unwrap_or(0).max(0) as u64,
                    last_modified: obj
                        .last_modified()
                        .and_then(to_chrono)
                        .unwrap_or(DateTime::UNIX_EPOCH),
                })
            })
            .collect();

        let sub_prefixes = output
            .common_prefixes()
            .iter()
            .filter_map(|cp| {
                Some(SubPrefix {
                    prefix: cp.prefix()?.to_string(),
                })
            })
            .collect();

        Ok(ListObjectsPage {
            objects,
            sub_prefixes,
            is_truncated: output.is_truncated().unwrap_or(false),
            next_marker: output.next_marker().map(str::to_string),
        })
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn get_object(&self, key: &str) -> StoreResult<ObjectPayload> {
        debug!("S3 GET");

        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &format!("fetching `{key}`")))?;

        let metadata = ObjectMetadata {
            content_length: output.content_length().map(|len| len.max(0) as u64),
            content_type: output.content_type().map(str::to_string),
            content_encoding: output.content_encoding().map(str::to_string),
            etag: output.e_tag().map(str::to_string),
            last_modified: output.last_modified().and_then(to_chrono),
            expiration: output.expiration().map(str::to_string),
        };

        // Stream straight from the SDK body; nothing is buffered beyond the
        // reader's chunk size.
        let body = ReaderStream::new(output.body.into_async_read()).boxed();

        Ok(ObjectPayload { metadata, body })
    }
}
