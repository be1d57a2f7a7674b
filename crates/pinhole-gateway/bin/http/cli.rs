use clap::{Parser, ValueEnum};
use pinhole_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const LISTEN_ADDR_ENV: &str = "PINHOLE_LISTEN_ADDR";
pub const STORAGE_BACKEND_ENV: &str = "PINHOLE_STORAGE_BACKEND";
pub const FS_ROOT_ENV: &str = "PINHOLE_FS_ROOT";
pub const BUCKET_ENV: &str = "PINHOLE_BUCKET";
pub const RECORD_OBJECT_ENV: &str = "PINHOLE_RECORD_OBJECT";
pub const ASSET_BUCKET_ENV: &str = "PINHOLE_ASSET_BUCKET";
pub const STATICS_DIR_ENV: &str = "PINHOLE_STATICS_DIR";
pub const CODE_LENGTH_ENV: &str = "PINHOLE_CODE_LENGTH";
pub const MAX_WRITE_ATTEMPTS_ENV: &str = "PINHOLE_MAX_WRITE_ATTEMPTS";
pub const STRICT_NOT_FOUND_ENV: &str = "PINHOLE_STRICT_NOT_FOUND";
pub const LOG_FORMAT_ENV: &str = "PINHOLE_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "PINHOLE_OTLP_ENDPOINT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_BUCKET: &str = "shorten-url-static-files";
pub const DEFAULT_RECORD_OBJECT: &str = "shortenRecord.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "fs")]
    Fs,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Fs => write!(f, "fs"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "pinhole-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    /// Directory holding one subdirectory per bucket.
    #[arg(long, env = FS_ROOT_ENV, required_if_eq("storage", "fs"))]
    pub fs_root: Option<PathBuf>,

    #[arg(long, env = BUCKET_ENV, default_value = DEFAULT_BUCKET)]
    pub bucket: String,

    #[arg(long, env = RECORD_OBJECT_ENV, default_value = DEFAULT_RECORD_OBJECT)]
    pub record_object: String,

    /// Bucket static assets are read from; defaults to `--bucket`.
    #[arg(long, env = ASSET_BUCKET_ENV)]
    pub asset_bucket: Option<String>,

    /// Local directory uploaded under `statics/` in the asset bucket at
    /// startup.
    #[arg(long, env = STATICS_DIR_ENV)]
    pub statics_dir: Option<PathBuf>,

    #[arg(
        long,
        env = CODE_LENGTH_ENV,
        default_value_t = 6,
        value_parser = clap::value_parser!(u8).range(1..=32)
    )]
    pub code_length: u8,

    #[arg(long, env = MAX_WRITE_ATTEMPTS_ENV, default_value_t = 5)]
    pub max_write_attempts: usize,

    /// Answer unknown short codes with 404 instead of 200.
    #[arg(long, env = STRICT_NOT_FOUND_ENV)]
    pub strict_not_found: bool,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,

    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}

impl CLI {
    pub fn asset_bucket(&self) -> &str {
        self.asset_bucket.as_deref().unwrap_or(&self.bucket)
    }
}
