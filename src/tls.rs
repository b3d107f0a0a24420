//! Secondary HTTPS listener.
//!
//! Serves the same router as the plain listener over rustls, with one task
//! per accepted connection.

use crate::config::TlsConfig;
use axum::Router;
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto::Builder as HttpConnBuilder,
    service::TowerToHyperService,
};
use rustls::{
    ServerConfig,
    pki_types::{CertificateDer, PrivateKeyDer},
};
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("reading `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no certificates found in `{0}`")]
    NoCertificates(PathBuf),
    #[error("no private key found in `{0}`")]
    NoPrivateKey(PathBuf),
    #[error(
        "`{0}` is an encrypted private key; decrypt it first (e.g. `openssl pkey -in key.pem -out plain.pem`)"
    )]
    EncryptedKey(PathBuf),
    #[error(transparent)]
    Rustls(#[from] rustls::Error),
}

/// Build a TLS acceptor from the configured PEM key and certificate chain.
pub fn acceptor(config: &TlsConfig) -> Result<TlsAcceptor, TlsError> {
    let certs = load_certs(&config.cert_file)?;
    let key = load_key(&config.key_file, config.passphrase.is_some())?;

    let mut server_config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    server_config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(TlsAcceptor::from(Arc::new(server_config)))
}

fn read_pem(path: &Path) -> Result<Vec<u8>, TlsError> {
    fs::read(path).map_err(|source| TlsError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let pem = read_pem(path)?;
    let certs = rustls_pemfile::certs(&mut pem.as_slice())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    if certs.is_empty() {
        return Err(TlsError::NoCertificates(path.to_path_buf()));
    }
    Ok(certs)
}

fn load_key(path: &Path, has_passphrase: bool) -> Result<PrivateKeyDer<'static>, TlsError> {
    let pem = read_pem(path)?;

    // PKCS#8 `ENCRYPTED PRIVATE KEY` blocks and legacy `Proc-Type: 4,ENCRYPTED`
    // headers are both skipped by the PEM reader, so detect them up front.
    let text = String::from_utf8_lossy(&pem);
    if text.contains("ENCRYPTED PRIVATE KEY") || text.contains("Proc-Type: 4,ENCRYPTED") {
        return Err(TlsError::EncryptedKey(path.to_path_buf()));
    }
    if has_passphrase {
        warn!(key = %path.display(), "key is not encrypted; ignoring passphrase");
    }

    rustls_pemfile::private_key(&mut pem.as_slice())
        .map_err(|source| TlsError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| TlsError::NoPrivateKey(path.to_path_buf()))
}

/// Accept TLS connections until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    acceptor: TlsAcceptor,
    app: Router,
    shutdown: impl Future<Output = ()>,
) {
    let http = HttpConnBuilder::new(TokioExecutor::new());
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let acceptor = acceptor.clone();
                let http = http.clone();
                let svc = TowerToHyperService::new(app.clone());

                tokio::spawn(async move {
                    let tls_stream = match acceptor.accept(stream).await {
                        Ok(s) => s,
                        Err(e) => {
                            debug!(peer_addr = %peer_addr, error = %e, "TLS handshake failed");
                            return;
                        }
                    };

                    let conn = http.serve_connection_with_upgrades(TokioIo::new(tls_stream), svc);
                    if let Err(e) = conn.await {
                        debug!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("HTTPS listener stopped accepting connections");
                break;
            }
        }
    }
}
