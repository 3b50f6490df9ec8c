//! sectra - persona-driven document analysis from the command line.
//!
//! Usage:
//!   sectra <persona> <job-to-be-done> <file.txt | dir> [...]
//!
//! Runs the full analysis pipeline in-process over the given plain-text
//! files (a directory argument expands to the .txt files inside it) and
//! prints the result payload as JSON. Insights are generated
//! after completion when a generator backend is reachable, falling back to
//! fixed content otherwise.
//!
//! Environment:
//!   SECTRA_BLOB_ROOT      - directory for input blobs (default: temp dir)
//!   SECTRA_MAX_CONCURRENT - concurrent job limit
//!   OLLAMA_BASE           - generator base URL
//!   OLLAMA_GEN_MODEL      - generator model name
//!   RUST_LOG              - env filter (default: "sectra=info")

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sectra_core::defaults;
use sectra_core::models::{AnalysisRequest, FileUpload, JobStatus};
use sectra_insights::OllamaGenerator;
use sectra_jobs::{
    DispatcherConfig, FsBlobStore, JobDispatcher, MemoryJobStore, PlainTextExtractor,
};

fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sectra=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn usage() -> ExitCode {
    eprintln!("usage: sectra <persona> <job-to-be-done> <file.txt | dir> [...]");
    ExitCode::from(2)
}

/// Expand directory arguments to the .txt files inside them.
async fn expand_inputs(args: &[PathBuf]) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for arg in args {
        if arg.is_dir() {
            let mut entries = tokio::fs::read_dir(arg).await?;
            let mut found = Vec::new();
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "txt") {
                    found.push(path);
                }
            }
            found.sort();
            paths.extend(found);
        } else {
            paths.push(arg.clone());
        }
    }
    Ok(paths)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        return usage();
    }
    let persona = args[0].clone();
    let job_to_be_done = args[1].clone();
    let inputs: Vec<PathBuf> = args[2..].iter().map(PathBuf::from).collect();
    let paths = match expand_inputs(&inputs).await {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("error: reading inputs: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let content = match tokio::fs::read(path).await {
            Ok(content) => content,
            Err(e) => {
                eprintln!("error: cannot read {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        files.push(FileUpload { file_name, content });
    }

    let blob_root = match std::env::var("SECTRA_BLOB_ROOT") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => std::env::temp_dir().join("sectra-blobs"),
    };

    let dispatcher = JobDispatcher::with_config(
        Arc::new(MemoryJobStore::new()),
        Arc::new(FsBlobStore::new(blob_root)),
        Arc::new(PlainTextExtractor::new()),
        Arc::new(OllamaGenerator::from_env()),
        DispatcherConfig::from_env(),
    );

    let request = AnalysisRequest {
        persona,
        job_to_be_done,
    };
    let job_id = match dispatcher.submit(request, files).await {
        Ok(job_id) => job_id,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(%job_id, "Submitted analysis job");

    // Poll until the job reaches a terminal state.
    let job = loop {
        let job = match dispatcher.status(job_id).await {
            Ok(job) => job,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        };
        if job.status.is_terminal() {
            break job;
        }
        tokio::time::sleep(Duration::from_millis(defaults::STATUS_POLL_INTERVAL_MS)).await;
    };

    match job.status {
        JobStatus::Completed => {}
        status => {
            eprintln!(
                "job ended as {status}: {}",
                job.error_message.as_deref().unwrap_or("(no error message)")
            );
            return ExitCode::FAILURE;
        }
    }

    if let Err(e) = dispatcher.generate_insights(job_id).await {
        eprintln!("warning: insight generation unavailable: {e}");
    }

    let result = match dispatcher.export_analysis(job_id).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    match result.to_value().and_then(|v| {
        serde_json::to_string_pretty(&v).map_err(sectra_core::Error::from)
    }) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
