use anyhow::{Context, Result};
use axum::Router;
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
mod state;
mod tls;
mod views;

use services::{s3_store::S3Store, store::ObjectStore};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // --- Parse config ---
    let cfg = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting bucket-gateway with config: {:?}", cfg);

    // --- Initialize store client ---
    let store: Arc<dyn ObjectStore> = Arc::new(S3Store::connect(&cfg.store).await);

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(state::AppState::new(
        store,
        cfg.gateway.clone(),
    ));

    // --- Secondary HTTPS listener ---
    let tls_task = match (&cfg.tls, cfg.secure_addr()) {
        (Some(tls_cfg), Some(secure_addr)) => {
            let acceptor = tls::acceptor(tls_cfg).context("loading TLS key and certificate")?;
            let listener = TcpListener::bind(&secure_addr)
                .await
                .with_context(|| format!("binding HTTPS listener on {secure_addr}"))?;
            tracing::info!("Serving HTTPS on https://{}", listener.local_addr()?);
            Some(tokio::spawn(tls::serve(
                listener,
                acceptor,
                app.clone(),
                shutdown_signal(),
            )))
        }
        _ => None,
    };

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(
        "Serving bucket {} on http://{}",
        cfg.store.bucket,
        listener.local_addr()?
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(task) = tls_task {
        task.await?;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal, draining connections");
}
