//! Object streaming: one get-object call, metadata mapped onto headers, body
//! piped through without buffering.

use crate::{
    errors::StoreResult,
    models::object::{ObjectMetadata, ObjectPayload},
    services::store::ObjectStore,
};
use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::Response,
};
use chrono::{DateTime, Utc};
use tracing::debug;

const EXPIRATION: HeaderName = HeaderName::from_static("expiration");

/// Fetch `key` and stream it back. Store failures surface as the store's
/// status with an empty body (see `StoreError`'s `IntoResponse`).
pub async fn stream_object(store: &dyn ObjectStore, key: &str) -> StoreResult<Response> {
    let ObjectPayload { metadata, body } = store.get_object(key).await?;
    debug!(key, content_length = ?metadata.content_length, "streaming object");

    let mut response = Response::new(Body::from_stream(body));
    *response.status_mut() = StatusCode::OK;
    set_object_headers(response.headers_mut(), &metadata);
    set_cors_headers(response.headers_mut());

    Ok(response)
}

fn set_object_headers(headers: &mut HeaderMap, meta: &ObjectMetadata) {
    if let Some(length) = meta.content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    if let Some(modified) = meta.last_modified.as_ref() {
        insert_str(headers, header::LAST_MODIFIED, &http_date(modified));
    }

    let text_headers = [
        (EXPIRATION, meta.expiration.as_deref()),
        (header::ETAG, meta.etag.as_deref()),
        (header::CONTENT_ENCODING, meta.content_encoding.as_deref()),
        (header::CONTENT_TYPE, meta.content_type.as_deref()),
    ];
    for (name, value) in text_headers {
        if let Some(value) = value {
            insert_str(headers, name, value);
        }
    }
}

fn set_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Host,Content-*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static("3000"),
    );
}

/// Values the store hands back are not guaranteed to be valid header text;
/// those are dropped rather than failing the response.
fn insert_str(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => debug!(header = %name, "dropping invalid header value from store"),
    }
}

/// IMF-fixdate, e.g. `Tue, 05 Mar 2024 07:09:00 GMT`.
fn http_date(ts: &DateTime<Utc>) -> String {
    ts.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
