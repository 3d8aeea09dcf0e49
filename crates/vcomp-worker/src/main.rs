//! Batch video compressor binary.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vcomp_media::{
    is_supported_video, resolve_ffmpeg, resolve_ffprobe, FfmpegEncoder, FfprobeDurationProbe,
};
use vcomp_models::{BatchEvent, CompressionSettings, LogLevel, Preset};
use vcomp_queue::{EventReceiver, JobQueue, ProgressChannel};
use vcomp_worker::{metrics, BatchOrchestrator, WorkerConfig};

/// Compress a batch of videos so each lands near a target file size.
#[derive(Parser, Debug)]
#[command(name = "vcomp", author, version, about)]
struct Cli {
    /// Video files, or folders to scan for videos (not recursive).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Target size per output, in MB.
    #[arg(short = 's', long)]
    target_size: Option<String>,

    /// Suffix appended to each output file name.
    #[arg(long)]
    suffix: Option<String>,

    /// Folder for the outputs (default: next to each input).
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Encoder preset: fast or balanced.
    #[arg(short = 'p', long)]
    preset: Option<Preset>,

    /// Print batch events as JSON lines instead of text.
    #[arg(long)]
    json: bool,

    /// Print a Prometheus metrics snapshot after the batch.
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let metrics_handle = if cli.metrics {
        Some(metrics::init_metrics().context("failed to install metrics recorder")?)
    } else {
        None
    };

    let target_size = cli
        .target_size
        .clone()
        .unwrap_or_else(|| config.target_size_mb.to_string());
    let settings = CompressionSettings::from_input(
        &target_size,
        cli.suffix.as_deref().unwrap_or(&config.suffix),
        cli.output_dir.clone().or_else(|| config.output_dir.clone()),
        cli.preset.unwrap_or(config.preset),
    )
    .context("invalid compression settings")?;

    if let Some(dir) = settings.output_dir() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("cannot create output folder {}", dir.display()))?;
    }

    let ffmpeg = resolve_ffmpeg(config.ffmpeg_path.as_deref())?;
    let ffprobe = match resolve_ffprobe(config.ffprobe_path.as_deref()) {
        Ok(path) => path,
        Err(e) => {
            // Durations then come from FFmpeg's own metadata read.
            warn!("{}; falling back to encoder metadata for durations", e);
            PathBuf::from("ffprobe")
        }
    };

    let mut queue = JobQueue::new();
    let paths = collect_inputs(&cli.inputs).await?;
    let found = paths.len();
    let added = queue.add_paths(paths);
    if added < found {
        info!("Skipped {} duplicate paths", found - added);
    }

    let encoder = FfmpegEncoder::new(ffmpeg).with_threads(config.encoder_threads);
    let probe = FfprobeDurationProbe::new(ffprobe).with_timeout(config.probe_timeout);
    let (events, rx) = ProgressChannel::new();
    let orchestrator = BatchOrchestrator::new(Arc::new(encoder), Arc::new(probe), events)
        .with_default_job_timeout(config.default_job_timeout);

    let abort = orchestrator.abort_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Abort requested; stopping after the current video");
            abort.abort();
        }
    });

    let printer = tokio::spawn(print_events(rx, cli.json));

    let summary = orchestrator.start(&mut queue, &settings).await?;
    drop(orchestrator);
    printer.await.ok();

    if let Some(handle) = metrics_handle {
        println!("{}", handle.render());
    }

    Ok(if summary.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vcomp=info".parse().expect("valid directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
}

/// Expand folders into the supported videos they contain, sorted by name.
///
/// Explicit files are kept whatever their extension.
async fn collect_inputs(inputs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        let input = absolute(input);
        if input.is_dir() {
            let mut found = Vec::new();
            let mut entries = tokio::fs::read_dir(&input)
                .await
                .with_context(|| format!("cannot read folder {}", input.display()))?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.is_file() && is_supported_video(&path) {
                    found.push(path);
                }
            }
            found.sort();
            info!("Found {} videos in {}", found.len(), input.display());
            paths.extend(found);
        } else {
            paths.push(input);
        }
    }
    Ok(paths)
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

async fn print_events(mut rx: EventReceiver, json: bool) {
    while let Some(event) = rx.recv().await {
        if json {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to serialize event: {}", e),
            }
        } else if let Some(line) = render_event(&event) {
            println!("{}", line);
        }

        if event.is_terminal() {
            break;
        }
    }
}

fn render_event(event: &BatchEvent) -> Option<String> {
    match event {
        BatchEvent::ItemStarted {
            index,
            total,
            filename,
        } => Some(format!("[{}/{}] {}", index + 1, total, filename)),
        BatchEvent::EncodeProgress { percent, .. } if percent % 25 == 0 => {
            Some(format!("    {}%", percent))
        }
        BatchEvent::Log { level, message, .. } => {
            let tag = match level {
                LogLevel::Info => "info",
                LogLevel::Success => "ok",
                LogLevel::Warning => "warn",
                LogLevel::Error => "error",
                LogLevel::Timeout => "timeout",
            };
            Some(format!("  {:>7}: {}", tag, message))
        }
        BatchEvent::Finished(summary) if summary.timeout_count > 0 => {
            Some(format!("  ({} timed out)", summary.timeout_count))
        }
        _ => None,
    }
}
