//! Sensitivity analyzer binary.
//!
//! Analyzes one local video file: seeds an in-memory record for it,
//! triggers the pipeline and prints events until the run completes.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vmod_media::FfmpegEngine;
use vmod_models::{AnalysisEvent, VideoRecord};
use vmod_pipeline::{AnalysisConfig, Analyzer};
use vmod_store::{MemoryStore, VideoStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vmod=info".parse().context("invalid log directive")?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let path = match std::env::args().nth(1) {
        Some(p) => PathBuf::from(p),
        None => bail!("usage: vmod-analyzer <video-file>"),
    };
    if !path.is_file() {
        bail!("not a file: {}", path.display());
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("video path has no usable file name")?
        .to_string();
    let media_root = path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));

    let mut config = AnalysisConfig::from_env();
    config.media_root = media_root;
    info!("Analyzer config: {:?}", config);

    let store = Arc::new(MemoryStore::new());
    let mut record = VideoRecord::new("local", "local", &file_name, &file_name);
    record.size = tokio::fs::metadata(&path).await?.len();
    let video_id = record.id.clone();
    store.save(&record).await?;

    let engine = match config.ffmpeg_timeout_secs {
        Some(secs) => FfmpegEngine::with_timeout(secs),
        None => FfmpegEngine::new(),
    };
    let analyzer = Analyzer::new(store.clone(), Arc::new(engine), config);
    let mut events = analyzer.subscribe();

    analyzer.trigger(&video_id).await?;

    // Follow the run through the event channel.
    while let Ok(event) = events.recv().await {
        match &event {
            AnalysisEvent::Progress { percent, stage, .. } => {
                info!("[{:>3}%] {}", percent, stage);
            }
            AnalysisEvent::Completed { .. } => {
                println!("{}", serde_json::to_string_pretty(&event)?);
                break;
            }
        }
    }

    // The event channel is advisory; the record is authoritative.
    if let Some(record) = store.get(&video_id).await? {
        info!(
            "Analyzed {} ({}, {})",
            record.original_name,
            record.duration_formatted(),
            record.size_formatted()
        );
        println!("{}", serde_json::to_string_pretty(&record.sensitivity)?);
    }

    Ok(())
}
