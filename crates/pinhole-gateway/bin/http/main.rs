mod cli;

use crate::cli::{StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use pinhole_core::{BlobBackend, BlobLocation, WriteOptions};
use pinhole_gateway::state::STATICS_PREFIX;
use pinhole_gateway::{App, AppState, MissStatus};
use pinhole_generator::RandomGenerator;
use pinhole_shortener::{MappingStore, ShortenerService, ShortenerSettings, StoreConfig};
use pinhole_storage::{FsBlobBackend, InMemoryBlobBackend};
use pinhole_telemetry::TelemetrySettings;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();

    let mut telemetry = TelemetrySettings::builder()
        .service_name("pinhole-gateway")
        .format(config.log_format.into())
        .build();
    telemetry.otlp_endpoint = config.otlp_endpoint.clone();
    let _telemetry = pinhole_telemetry::init(&telemetry)?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        bucket = %config.bucket,
        record_object = %config.record_object,
        asset_bucket = %config.asset_bucket(),
        "starting gateway"
    );

    match config.storage {
        StorageBackendArg::InMemory => run(config, InMemoryBlobBackend::new()).await,
        StorageBackendArg::Fs => {
            let root = config
                .fs_root
                .clone()
                .context("fs root is required when storage backend is fs")?;
            run(config, FsBlobBackend::new(root).create_buckets(true)).await
        }
    }
}

async fn run<B: BlobBackend>(config: CLI, backend: B) -> anyhow::Result<()> {
    let backend = Arc::new(backend);

    if let Some(dir) = &config.statics_dir {
        upload_statics(backend.as_ref(), dir, config.asset_bucket()).await?;
    }

    let store_config = StoreConfig::builder()
        .location(BlobLocation::new(&config.bucket, &config.record_object))
        .max_write_attempts(config.max_write_attempts)
        .build();
    let store = MappingStore::new(Arc::clone(&backend), store_config);
    let settings = ShortenerSettings::builder()
        .code_length(usize::from(config.code_length))
        .build();
    let shortener = ShortenerService::with_settings(store, RandomGenerator::new(), settings);

    let miss_status = if config.strict_not_found {
        MissStatus::NotFound
    } else {
        MissStatus::Ok
    };
    let state = AppState::new(Arc::new(shortener), backend, config.asset_bucket())
        .with_miss_status(miss_status);

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

/// Copies the files directly inside `dir` to `statics/` in the asset bucket.
async fn upload_statics<B: BlobBackend>(backend: &B, dir: &Path, bucket: &str) -> anyhow::Result<()> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("failed to read statics dir {}", dir.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            warn!(path = %entry.path().display(), "skipping non UTF-8 file name");
            continue;
        };

        let data = tokio::fs::read(entry.path()).await?;
        let location = BlobLocation::new(bucket, format!("{STATICS_PREFIX}/{name}"));
        backend.write(&location, data, WriteOptions::default()).await?;
        info!(%location, "uploaded static asset");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
