//! Collaborator traits for sectra abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability. The analysis core
//! depends only on these contracts:
//!
//! - [`DocumentExtractor`] turns stored blobs into titled sections.
//! - [`TextGenerator`] produces free text for insight/podcast content.
//! - [`JobStore`] durably holds job records.
//! - [`BlobStore`] persists uploaded input files.

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{AnalysisJob, BlobRef, ExtractedDocument, FileUpload, JobStatus};

/// Turns stored input blobs into per-document section lists.
///
/// Fails with `Error::Extraction` on unreadable or corrupt input; the
/// orchestrator treats that as a stage failure (job goes to FAILED).
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, blobs: &[BlobRef]) -> Result<Vec<ExtractedDocument>>;
}

/// Produces free text from a prompt.
///
/// Fails with `Error::Generation` or `Error::GenerationTimeout`; both are
/// always recoverable via fallback content and never propagate as a job
/// failure.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String>;
}

/// Durable storage for job records.
///
/// `save` is an idempotent overwrite of the latest state: calling it
/// repeatedly for the same id is safe. Reads return an atomic snapshot of
/// the record.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn save(&self, job: &AnalysisJob) -> Result<()>;

    /// Overwrite the record only if its stored status is still `expected`;
    /// returns whether the write happened, atomically with the check.
    ///
    /// This is how concurrent writers to the same record (the orchestrator
    /// task and a cancelling dispatcher) are serialized: a snapshot taken
    /// before an out-of-band status change can never clobber it.
    async fn save_if_status(&self, job: &AnalysisJob, expected: JobStatus) -> Result<bool>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AnalysisJob>>;
}

/// Binary persistence for uploaded input files.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store the uploaded files for a job, returning one ref per file in
    /// submission order.
    async fn store(&self, files: &[FileUpload], job_id: Uuid) -> Result<Vec<BlobRef>>;

    /// Release a stored blob.
    async fn delete(&self, blob: &BlobRef) -> Result<()>;
}
