//! In-memory `ObjectStore` used by tests.
//!
//! Mimics S3 ListObjects (v1) with a delimiter: keys come back in lexical
//! order, keys below the next `/` roll up into a sub-prefix, and `max_keys`
//! counts objects and sub-prefixes alike.

use crate::{
    errors::{StoreError, StoreResult},
    models::{
        listing::{ListObjectsPage, ObjectSummary, SubPrefix},
        object::{ObjectMetadata, ObjectPayload},
    },
    services::store::{DELIMITER, ObjectStore},
};
use async_trait::async_trait;
use axum::http::StatusCode;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use futures::StreamExt;
use std::{
    collections::BTreeMap,
    io,
    sync::atomic::{AtomicUsize, Ordering},
};

#[derive(Clone, Debug)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug)]
pub struct MemoryStore {
    objects: BTreeMap<String, StoredObject>,
    page_size: usize,
    fail_list_after: Option<usize>,
    list_calls: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            page_size: 1000,
            fail_list_after: None,
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Succeed for the first `calls` list calls, then answer 403.
    pub fn fail_list_after(mut self, calls: usize) -> Self {
        self.fail_list_after = Some(calls);
        self
    }

    pub fn insert(&mut self, key: &str, data: impl Into<Bytes>) {
        self.insert_object(
            key,
            StoredObject {
                data: data.into(),
                content_type: None,
                content_encoding: None,
                last_modified: Utc.with_ymd_and_hms(2024, 3, 5, 7, 9, 0).unwrap(),
            },
        );
    }

    pub fn insert_object(&mut self, key: &str, object: StoredObject) {
        self.objects.insert(key.to_string(), object);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

fn common_prefix<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = &key[prefix.len()..];
    rest.find(DELIMITER)
        .map(|pos| &key[..prefix.len() + pos + DELIMITER.len()])
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_objects(
        &self,
        prefix: &str,
        marker: Option<&str>,
    ) -> StoreResult<ListObjectsPage> {
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list_after.is_some_and(|limit| call >= limit) {
            return Err(StoreError::new(StatusCode::FORBIDDEN, "access denied"));
        }

        let mut page = ListObjectsPage::default();
        let mut last_prefix: Option<&str> = None;
        let mut taken = 0;

        let candidates = self
            .objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .filter(|(key, _)| marker.is_none_or(|m| key.as_str() > m));

        for (key, object) in candidates {
            let rolled_up = common_prefix(key, prefix);
            if let Some(cp) = rolled_up {
                if last_prefix == Some(cp) || marker.is_some_and(|m| cp <= m) {
                    continue;
                }
            }

            if taken == self.page_size {
                page.is_truncated = true;
                break;
            }
            taken += 1;

            match rolled_up {
                Some(cp) => {
                    last_prefix = Some(cp);
                    page.sub_prefixes.push(SubPrefix {
                        prefix: cp.to_string(),
                    });
                }
                None => page.objects.push(ObjectSummary {
                    key: key.clone(),
                    size: object.data.len() as u64,
                    last_modified: object.last_modified,
                }),
            }
        }

        Ok(page)
    }

    async fn get_object(&self, key: &str) -> StoreResult<ObjectPayload> {
        let object = self
            .objects
            .get(key)
            .ok_or_else(|| StoreError::new(StatusCode::NOT_FOUND, format!("no such key `{key}`")))?;

        let metadata = ObjectMetadata {
            content_length: Some(object.data.len() as u64),
            content_type: object.content_type.clone(),
            content_encoding: object.content_encoding.clone(),
            etag: Some(format!("\"{:x}\"", object.data.len())),
            last_modified: Some(object.last_modified),
            expiration: None,
        };

        // Hand the body out in small chunks so consumers see a real stream.
        let chunks: Vec<io::Result<Bytes>> = object
            .data
            .chunks(256)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();

        Ok(ObjectPayload {
            metadata,
            body: futures::stream::iter(chunks).boxed(),
        })
    }
}
