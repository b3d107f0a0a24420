//! Health & readiness handlers.
//!
//! - GET /-/healthz  -> simple liveness ("ok")
//! - GET /-/readyz   -> readiness that checks the object store answers a list call
//!
//! Both live under `/-/` so they cannot shadow object keys in the common case.

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;

/// `GET /-/healthz`
///
/// Liveness only: answers 200 with `{"status":"ok"}` without touching the store.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /-/readyz`
///
/// Readiness probe: one list call against the configured key prefix.
/// HTTP 200 when it succeeds, HTTP 503 otherwise.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let store_check = match state
        .store
        .list_objects(&state.settings.key_prefix, None)
        .await
    {
        Ok(_) => CheckStatus {
            ok: true,
            error: None,
        },
        Err(e) => CheckStatus {
            ok: false,
            error: Some(format!("store answered {}", e.status)),
        },
    };

    let ok = store_check.ok;
    let mut checks = HashMap::new();
    checks.insert("store", store_check);

    let body = ReadyResponse {
        status: if ok { "ok".into() } else { "error".into() },
        checks,
    };
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
