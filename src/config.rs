use anyhow::{Context, Result};
use clap::Parser;
use std::{env, time::Duration};

/// Which store implementation the connector talks to.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// Real S3 (or any S3-compatible endpoint).
    S3,
    /// In-process store, for local runs and tests.
    Memory,
}

impl StoreBackend {
    fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "s3" => Ok(Self::S3),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("unknown store backend `{other}` (expected `s3` or `memory`)"),
        }
    }
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: StoreBackend,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub grant_ttl_secs: u64,
    pub max_upload_mib: usize,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Directory-style browsing API for flat object storage")]
pub struct Args {
    /// Host to bind to (overrides BUCKET_BROWSER_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides BUCKET_BROWSER_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Store backend to connect to (overrides BUCKET_BROWSER_BACKEND)
    #[arg(long, value_enum)]
    pub backend: Option<StoreBackend>,

    /// Custom store endpoint, e.g. a MinIO URL (overrides BUCKET_BROWSER_ENDPOINT_URL)
    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// Address buckets by path instead of subdomain (overrides BUCKET_BROWSER_FORCE_PATH_STYLE)
    #[arg(long)]
    pub force_path_style: bool,

    /// Presigned URL lifetime in seconds (overrides BUCKET_BROWSER_GRANT_TTL_SECS)
    #[arg(long)]
    pub grant_ttl_secs: Option<u64>,

    /// Largest accepted upload in MiB (overrides BUCKET_BROWSER_MAX_UPLOAD_MIB)
    #[arg(long)]
    pub max_upload_mib: Option<usize>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        // Parse CLI once
        let args = Args::parse();
        Self::merge(args)
    }

    fn merge(args: Args) -> Result<Self> {
        // --- Environment fallback ---
        let env_host = env::var("BUCKET_BROWSER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("BUCKET_BROWSER_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing BUCKET_BROWSER_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading BUCKET_BROWSER_PORT"),
        };
        let env_backend = match env::var("BUCKET_BROWSER_BACKEND") {
            Ok(value) => StoreBackend::parse(&value)?,
            Err(env::VarError::NotPresent) => StoreBackend::S3,
            Err(err) => return Err(err).context("reading BUCKET_BROWSER_BACKEND"),
        };
        let env_endpoint = env::var("BUCKET_BROWSER_ENDPOINT_URL").ok();
        let env_force_path_style = env::var("BUCKET_BROWSER_FORCE_PATH_STYLE")
            .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let env_grant_ttl = match env::var("BUCKET_BROWSER_GRANT_TTL_SECS") {
            Ok(value) => value.parse::<u64>().with_context(|| {
                format!("parsing BUCKET_BROWSER_GRANT_TTL_SECS value `{}`", value)
            })?,
            Err(env::VarError::NotPresent) => 300,
            Err(err) => return Err(err).context("reading BUCKET_BROWSER_GRANT_TTL_SECS"),
        };
        let env_max_upload = match env::var("BUCKET_BROWSER_MAX_UPLOAD_MIB") {
            Ok(value) => value.parse::<usize>().with_context(|| {
                format!("parsing BUCKET_BROWSER_MAX_UPLOAD_MIB value `{}`", value)
            })?,
            Err(env::VarError::NotPresent) => 256,
            Err(err) => return Err(err).context("reading BUCKET_BROWSER_MAX_UPLOAD_MIB"),
        };

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            backend: args.backend.unwrap_or(env_backend),
            endpoint_url: args.endpoint_url.or(env_endpoint),
            force_path_style: args.force_path_style || env_force_path_style,
            grant_ttl_secs: args.grant_ttl_secs.unwrap_or(env_grant_ttl),
            max_upload_mib: args.max_upload_mib.unwrap_or(env_max_upload),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn grant_ttl(&self) -> Duration {
        Duration::from_secs(self.grant_ttl_secs)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mib * 1024 * 1024
    }
}
