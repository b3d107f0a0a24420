use crate::services::{path_resolver::normalize_base_path, presenter::DEFAULT_LABEL_WIDTH};
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, fmt, path::PathBuf, str::FromStr};

const DEFAULT_PORT: u16 = 3010;
const DEFAULT_SECURE_PORT: u16 = 3020;
const DEFAULT_REGION: &str = "us-east-1";

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
    pub gateway: GatewaySettings,
    /// Secondary HTTPS listener, when a key and certificate are configured.
    pub tls: Option<TlsConfig>,
}

/// Connection settings for the object store client.
#[derive(Clone)]
pub struct StoreConfig {
    pub bucket: String,
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Request-routing settings shared read-only by every handler.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Bucket name, shown as the root of the breadcrumb trail.
    pub bucket: String,
    /// Prepended to every resolved key.
    pub key_prefix: String,
    /// URL path the gateway is mounted under, `/seg` form or empty.
    pub base_path: String,
    /// Listing labels longer than this are shortened for display.
    pub label_width: usize,
}

#[derive(Clone)]
pub struct TlsConfig {
    pub port: u16,
    pub key_file: PathBuf,
    pub cert_file: PathBuf,
    pub passphrase: Option<String>,
}

impl fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsConfig")
            .field("port", &self.port)
            .field("key_file", &self.key_file)
            .field("cert_file", &self.cert_file)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Read-only HTTP gateway for an S3 bucket")]
pub struct Args {
    /// Host to bind to (overrides S3_SERVER_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides S3_SERVER_PORT)
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Port for the HTTPS listener (overrides S3_SERVER_SECURE_PORT)
    #[arg(long)]
    pub secure_port: Option<u16>,

    /// Bucket to serve (overrides S3_SERVER_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Object store endpoint URL (overrides S3_SERVER_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Region (overrides AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Access key id (overrides AWS_ACCESS_KEY_ID)
    #[arg(long)]
    pub key: Option<String>,

    /// Secret access key (overrides AWS_SECRET_ACCESS_KEY)
    #[arg(long)]
    pub secret: Option<String>,

    /// Key prefix prepended to every request (overrides S3_KEY_PREFIX)
    #[arg(long)]
    pub prefix: Option<String>,

    /// URL path the gateway is mounted under (overrides S3_SERVER_BASE_PATH)
    #[arg(long)]
    pub base_path: Option<String>,

    /// PEM private key for HTTPS (overrides S3_SERVER_SECURE_KEY_FILE)
    #[arg(long)]
    pub secure_key: Option<PathBuf>,

    /// PEM certificate chain for HTTPS (overrides S3_SERVER_SECURE_CERT_FILE)
    #[arg(long)]
    pub secure_cert: Option<PathBuf>,

    /// Passphrase for the HTTPS private key (overrides S3_SERVER_SECURE_PASSPHRASE)
    #[arg(long)]
    pub secure_passphrase: Option<String>,

    /// Maximum label length in listings (overrides S3_SERVER_LABEL_WIDTH)
    #[arg(long)]
    pub label_width: Option<usize>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::merge(Args::parse(), |name| env::var(name).ok())
    }

    /// Merge CLI arguments over values looked up by `env`.
    pub fn merge(args: Args, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = args
            .host
            .or_else(|| env("S3_SERVER_HOST"))
            .unwrap_or_else(|| "0.0.0.0".into());
        let port = match args.port {
            Some(port) => port,
            None => parse_env(&env, "S3_SERVER_PORT")?.unwrap_or(DEFAULT_PORT),
        };
        let secure_port = match args.secure_port {
            Some(port) => port,
            None => parse_env(&env, "S3_SERVER_SECURE_PORT")?.unwrap_or(DEFAULT_SECURE_PORT),
        };
        let label_width = match args.label_width {
            Some(width) => width,
            None => parse_env(&env, "S3_SERVER_LABEL_WIDTH")?.unwrap_or(DEFAULT_LABEL_WIDTH),
        };

        let Some(bucket) = args
            .bucket
            .or_else(|| env("S3_SERVER_BUCKET"))
            .filter(|b| !b.is_empty())
        else {
            bail!("a bucket is required (--bucket or S3_SERVER_BUCKET)");
        };

        let access_key_id = args.key.or_else(|| env("AWS_ACCESS_KEY_ID"));
        let secret_access_key = args.secret.or_else(|| env("AWS_SECRET_ACCESS_KEY"));
        if access_key_id.is_some() != secret_access_key.is_some() {
            bail!("an access key and a secret must be configured together");
        }

        let store = StoreConfig {
            bucket: bucket.clone(),
            endpoint: args.endpoint.or_else(|| env("S3_SERVER_ENDPOINT")),
            region: args
                .region
                .or_else(|| env("AWS_REGION"))
                .unwrap_or_else(|| DEFAULT_REGION.into()),
            access_key_id,
            secret_access_key,
        };

        let gateway = GatewaySettings {
            bucket,
            key_prefix: args
                .prefix
                .or_else(|| env("S3_KEY_PREFIX"))
                .unwrap_or_default(),
            base_path: normalize_base_path(
                &args
                    .base_path
                    .or_else(|| env("S3_SERVER_BASE_PATH"))
                    .unwrap_or_default(),
            ),
            label_width,
        };

        let key_file = args
            .secure_key
            .or_else(|| env("S3_SERVER_SECURE_KEY_FILE").map(PathBuf::from));
        let cert_file = args
            .secure_cert
            .or_else(|| env("S3_SERVER_SECURE_CERT_FILE").map(PathBuf::from));
        let tls = match (key_file, cert_file) {
            (Some(key_file), Some(cert_file)) => Some(TlsConfig {
                port: secure_port,
                key_file,
                cert_file,
                passphrase: args
                    .secure_passphrase
                    .or_else(|| env("S3_SERVER_SECURE_PASSPHRASE")),
            }),
            (None, None) => None,
            _ => bail!("HTTPS needs both a key file and a certificate file"),
        };

        Ok(Self {
            host,
            port,
            store,
            gateway,
            tls,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn secure_addr(&self) -> Option<String> {
        self.tls
            .as_ref()
            .map(|tls| format!("{}:{}", self.host, tls.port))
    }
}

fn parse_env<T>(env: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env(name)
        .map(|value| {
            value
                .parse::<T>()
                .with_context(|| format!("parsing {name} value `{value}`"))
        })
        .transpose()
}
