//! # sectra-jobs
//!
//! Job dispatch and pipeline orchestration for sectra.
//!
//! This crate provides:
//! - Submission validation and job lifecycle management
//! - The multi-stage analysis pipeline (extract, rank, cross-reference)
//! - Bounded concurrent execution with cooperative cancellation
//! - Post-completion operations: insights, podcast, search, export
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sectra_core::{AnalysisRequest, FileUpload};
//! use sectra_insights::OllamaGenerator;
//! use sectra_jobs::{DispatcherConfig, FsBlobStore, JobDispatcher, MemoryJobStore, PlainTextExtractor};
//!
//! let dispatcher = JobDispatcher::with_config(
//!     Arc::new(MemoryJobStore::new()),
//!     Arc::new(FsBlobStore::new("/tmp/sectra-blobs")),
//!     Arc::new(PlainTextExtractor::new()),
//!     Arc::new(OllamaGenerator::from_env()),
//!     DispatcherConfig::from_env(),
//! );
//!
//! let request = AnalysisRequest {
//!     persona: "student".into(),
//!     job_to_be_done: "learn data preprocessing".into(),
//! };
//! let job_id = dispatcher.submit(request, files).await?;
//!
//! // Poll until terminal, then read the result.
//! let job = dispatcher.status(job_id).await?;
//! let result = dispatcher.export_analysis(job_id).await?;
//! ```

pub mod blob;
pub mod dispatcher;
pub mod extract;
pub mod pipeline;
pub mod store;

// Re-export core types
pub use sectra_core::*;

pub use blob::FsBlobStore;
pub use dispatcher::{DispatcherConfig, JobDispatcher};
pub use extract::PlainTextExtractor;
pub use pipeline::{AnalysisPipeline, PipelineConfig};
pub use store::MemoryJobStore;
