//! The catch-all GET handler: resolve the path, then either stream an object
//! or render (or index-serve) a prefix listing.

use crate::{
    errors::StoreResult,
    handlers::object_handlers::stream_object,
    services::{
        listing_service::find_index,
        path_resolver::{self, RequestKind, RequestPath},
        presenter::{ListingRenderer, build_breadcrumbs},
    },
    state::AppState,
    views::{listing_page::ListingView, render_template},
};
use axum::{
    extract::State,
    http::Uri,
    response::Response,
};
use chrono::Utc;
use percent_encoding::percent_decode_str;
use tracing::{debug, info};

/// `GET <base_path>/{*path}`
pub async fn browse(State(state): State<AppState>, uri: Uri) -> StoreResult<Response> {
    let raw_path = percent_decode_str(uri.path()).decode_utf8_lossy();
    let settings = &state.settings;
    let path = path_resolver::resolve(&raw_path, &settings.base_path, &settings.key_prefix);

    match path.kind() {
        RequestKind::Object => {
            debug!(key = path.as_str(), "object request");
            stream_object(state.store.as_ref(), path.as_str()).await
        }
        RequestKind::Prefix => serve_prefix(&state, &path).await,
    }
}

async fn serve_prefix(state: &AppState, path: &RequestPath) -> StoreResult<Response> {
    let listing = state.listings.list(path.as_str()).await?;

    if let Some(index_key) = find_index(&listing) {
        info!(index = index_key, "serving index document");
        return stream_object(state.store.as_ref(), index_key).await;
    }

    if listing.is_empty() {
        debug!(prefix = path.as_str(), "empty listing");
    }

    let settings = &state.settings;
    let relative = path.relative_to(&settings.key_prefix);
    let renderer = ListingRenderer::new(settings.label_width, Utc::now());

    let mut records = Vec::with_capacity(listing.entries.len() + listing.objects.len() + 1);
    if !relative.is_empty() {
        records.push(renderer.parent_record());
    }
    records.extend(renderer.render(&listing.prefix, &listing.entries, &listing.objects));

    let breadcrumbs = build_breadcrumbs(&settings.bucket, relative);
    let page = ListingView::new(
        &settings.bucket,
        relative,
        &settings.base_path,
        &breadcrumbs,
        &records,
        settings.label_width,
    );

    Ok(render_template(&page))
}

#[cfg(test)]
mod tests {
    use crate::{
        config::GatewaySettings,
        routes::routes::routes,
        services::memory_store::{MemoryStore, StoredObject},
        state::AppState,
    };
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use chrono::Utc;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn settings() -> GatewaySettings {
        GatewaySettings {
            bucket: "bucket".into(),
            key_prefix: String::new(),
            base_path: String::new(),
            label_width: 50,
        }
    }

    fn app(store: MemoryStore, settings: GatewaySettings) -> Router {
        routes().with_state(AppState::new(Arc::new(store), settings))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8_lossy(&body).into_owned())
    }

    #[tokio::test]
    async fn renders_listing_for_prefix() {
        let mut store = MemoryStore::new();
        store.insert("a/b/c/deep.txt", "x");
        store.insert("a/b/readme.txt", "hello");

        let (status, headers, body) = get(app(store, settings()), "/a/b/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        assert!(body.contains("<a href=\"c/\">c/</a>"));
        assert!(body.contains("<a href=\"readme.txt\">readme.txt</a>"));
        assert!(body.contains("<a href=\"../\">../</a>"));
        assert!(body.contains("<a href=\"/a/\">a</a>"));
        assert!(body.contains("<span>b</span>"));
        assert!(body.find("c/</a>") < body.find("readme.txt</a>"));
    }

    #[tokio::test]
    async fn root_listing_has_no_parent_link() {
        let mut store = MemoryStore::new();
        store.insert("top.txt", "x");

        let (status, _, body) = get(app(store, settings()), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("top.txt"));
        assert!(!body.contains("../"));
        assert!(body.contains("<span>bucket</span>"));
    }

    #[tokio::test]
    async fn empty_prefix_renders_empty_listing() {
        let (status, _, body) = get(app(MemoryStore::new(), settings()), "/nothing/here/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<pre>"));
    }

    #[tokio::test]
    async fn index_document_is_served_in_place_of_listing() {
        let mut store = MemoryStore::new();
        store.insert("site/about.txt", "about");
        store.insert_object(
            "site/index.html",
            StoredObject {
                data: "<h1>hi</h1>".into(),
                content_type: Some("text/html".into()),
                content_encoding: None,
                last_modified: Utc::now(),
            },
        );

        let (status, headers, body) = get(app(store, settings()), "/site/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/html");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(body, "<h1>hi</h1>");
    }

    #[tokio::test]
    async fn object_request_streams_bytes() {
        let mut store = MemoryStore::new();
        store.insert("a/b/readme.txt", "hello");

        let (status, headers, body) = get(app(store, settings()), "/a/b/readme.txt").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_LENGTH], "5");
        assert_eq!(body, "hello");
    }

    #[tokio::test]
    async fn missing_object_passes_through_status() {
        let (status, _, body) = get(app(MemoryStore::new(), settings()), "/missing.txt").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn listing_failure_passes_through_status() {
        let store = MemoryStore::new().fail_list_after(0);

        let (status, _, body) = get(app(store, settings()), "/a/").await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn base_path_and_key_prefix_are_applied() {
        let mut store = MemoryStore::new();
        store.insert("public/docs/guide.txt", "guide");
        let settings = GatewaySettings {
            key_prefix: "public/".into(),
            base_path: "/files".into(),
            ..settings()
        };

        let (status, _, body) = get(app(store, settings.clone()), "/files/docs/guide.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "guide");

        let mut store = MemoryStore::new();
        store.insert("public/docs/guide.txt", "guide");
        let (status, _, body) = get(app(store, settings), "/files/docs/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("href=\"/files/docs/\""));
        assert!(body.contains("<a href=\"/files/\">bucket</a>"));
        assert!(body.contains("<span>docs</span>"));
        assert!(body.contains("<a href=\"guide.txt\">guide.txt</a>"));
    }

    #[tokio::test]
    async fn percent_encoded_paths_are_decoded() {
        let mut store = MemoryStore::new();
        store.insert("my docs/a file.txt", "spaced");

        let (status, _, body) = get(app(store, settings()), "/my%20docs/a%20file.txt").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "spaced");
    }

    #[tokio::test]
    async fn head_returns_headers_without_body() {
        let mut store = MemoryStore::new();
        store.insert("f.bin", vec![0u8; 10]);

        let response = app(store, settings())
            .oneshot(
                Request::builder()
                    .method(Method::HEAD)
                    .uri("/f.bin")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "10");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn writes_are_rejected() {
        let response = app(MemoryStore::new(), settings())
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri("/a.txt")
                    .body(Body::from("data"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
