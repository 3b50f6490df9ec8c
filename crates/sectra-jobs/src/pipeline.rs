//! Analysis pipeline orchestrator.
//!
//! Runs the ordered stage sequence for one job — extract, rank,
//! cross-reference, assemble — and maintains the job's state machine.
//! Progress checkpoints are persisted after each stage so a concurrent
//! status reader always observes monotonic progress. Cancellation is
//! cooperative: the dispatcher writes CANCELLED through the store, and the
//! pipeline observes it at the next stage boundary; a stage already
//! running is never forcibly interrupted.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use sectra_core::defaults;
use sectra_core::models::{AnalysisJob, AnalysisResult, ExtractedSection, JobStatus};
use sectra_core::{DocumentExtractor, Error, JobStore, Result};
use sectra_rank::{discover, rank, RankingConfig};

/// Tunables for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub ranking: RankingConfig,
    /// Number of top-ranked sections that get related-section edges.
    pub related_top_sections: usize,
    /// Maximum related targets per source section.
    pub related_max_targets: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ranking: RankingConfig::default(),
            related_top_sections: defaults::RELATED_TOP_SECTIONS,
            related_max_targets: defaults::RELATED_MAX_TARGETS,
        }
    }
}

/// Outcome of a persisted stage boundary.
enum Boundary {
    /// Proceed to the next stage.
    Continue(AnalysisJob),
    /// The job was cancelled out of band; stop without further writes.
    Stopped,
}

/// Sequences the analysis stages for one job.
///
/// One pipeline instance is shared across jobs; per-job state lives
/// entirely in the job record, which this orchestrator task alone mutates
/// while the job runs (single-writer rule).
pub struct AnalysisPipeline {
    store: Arc<dyn JobStore>,
    extractor: Arc<dyn DocumentExtractor>,
    config: PipelineConfig,
}

impl AnalysisPipeline {
    pub fn new(store: Arc<dyn JobStore>, extractor: Arc<dyn DocumentExtractor>) -> Self {
        Self::with_config(store, extractor, PipelineConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn JobStore>,
        extractor: Arc<dyn DocumentExtractor>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            extractor,
            config,
        }
    }

    /// Run the full stage sequence for a pending job.
    ///
    /// Stage failures are recorded on the job (FAILED with a bounded error
    /// message) rather than returned; the `Err` path here is reserved for
    /// store access failures and precondition violations.
    #[instrument(skip(self), fields(job_id = %job_id))]
    pub async fn run(&self, job_id: Uuid) -> Result<()> {
        let start = Instant::now();

        let mut job = self.load(job_id).await?;
        match job.status {
            JobStatus::Pending => {}
            // Cancelled before the worker picked it up: nothing to do.
            JobStatus::Cancelled => {
                info!("Job was cancelled before processing started");
                return Ok(());
            }
            other => {
                return Err(Error::InvalidOperation(format!(
                    "cannot run job in status {other}"
                )));
            }
        }

        job.transition(JobStatus::Processing)?;
        job.advance_progress(defaults::PROGRESS_STARTED);
        if !self
            .store
            .save_if_status(&job, JobStatus::Pending)
            .await?
        {
            // A cancel won the race for the PENDING record.
            info!("Job was cancelled before processing started");
            return Ok(());
        }
        info!(input_count = job.input_refs.len(), "Processing job");

        // Stage 1: extraction (the only blocking I/O stage).
        let sections = match self.extractor.extract(&job.input_refs).await {
            Ok(documents) => documents
                .into_iter()
                .flat_map(|d| d.sections)
                .collect::<Vec<ExtractedSection>>(),
            Err(e) => {
                self.fail(job_id, &e.to_string()).await?;
                return Ok(());
            }
        };
        let job = match self.boundary(job_id, defaults::PROGRESS_EXTRACTED).await? {
            Boundary::Continue(job) => job,
            Boundary::Stopped => return Ok(()),
        };

        // Stage 2: relevance ranking (CPU-bound, deterministic).
        let ranked = rank(
            sections,
            &job.persona,
            &job.job_to_be_done,
            &self.config.ranking,
        );

        // Stage 3: related-section discovery over the top-ranked sections.
        let top_ids: Vec<Uuid> = ranked
            .iter()
            .take(self.config.related_top_sections)
            .map(|s| s.id)
            .collect();
        let edges = discover(&ranked, &top_ids, self.config.related_max_targets);

        let job = match self.boundary(job_id, defaults::PROGRESS_RANKED).await? {
            Boundary::Continue(job) => job,
            Boundary::Stopped => return Ok(()),
        };

        // Stage 4: final assembly.
        let result = AnalysisResult {
            persona: job.persona.clone(),
            job_to_be_done: job.job_to_be_done.clone(),
            ranked_sections: ranked,
            related_sections: edges,
            insights: None,
        };
        let payload = match result.to_value() {
            Ok(payload) => payload,
            Err(e) => {
                self.fail(job_id, &e.to_string()).await?;
                return Ok(());
            }
        };

        // The completing write is conditional on the record still being
        // PROCESSING; a cancel committed since the last boundary wins.
        let mut job = self.load(job_id).await?;
        if job.status == JobStatus::Cancelled {
            info!("Job cancelled, discarding assembled result");
            return Ok(());
        }
        job.result = Some(payload);
        job.transition(JobStatus::Completed)?;
        job.advance_progress(defaults::PROGRESS_DONE);
        if !self
            .store
            .save_if_status(&job, JobStatus::Processing)
            .await?
        {
            info!("Job cancelled, discarding assembled result");
            return Ok(());
        }

        info!(
            duration_ms = start.elapsed().as_millis() as u64,
            result_count = result.ranked_sections.len(),
            "Job completed"
        );
        Ok(())
    }

    async fn load(&self, job_id: Uuid) -> Result<AnalysisJob> {
        self.store
            .find_by_id(job_id)
            .await?
            .ok_or(Error::JobNotFound(job_id))
    }

    /// Persist a progress checkpoint, observing out-of-band cancellation.
    ///
    /// The write is conditional on the record still being PROCESSING, so a
    /// cancel landing between the load and the save is never overwritten.
    async fn boundary(&self, job_id: Uuid, progress: f32) -> Result<Boundary> {
        let mut job = self.load(job_id).await?;
        if job.status != JobStatus::Processing {
            info!(status = %job.status, "Job left PROCESSING, stopping at stage boundary");
            return Ok(Boundary::Stopped);
        }
        job.advance_progress(progress);
        if !self
            .store
            .save_if_status(&job, JobStatus::Processing)
            .await?
        {
            info!("Job cancelled, stopping at stage boundary");
            return Ok(Boundary::Stopped);
        }
        Ok(Boundary::Continue(job))
    }

    /// Record a stage failure. The terminal status is authoritative over
    /// whatever progress was already committed; partial writes from prior
    /// stages are not rolled back. A concurrently accepted cancel keeps
    /// the record.
    async fn fail(&self, job_id: Uuid, message: &str) -> Result<()> {
        let mut job = self.load(job_id).await?;
        if job.status.is_terminal() {
            warn!(error = message, "Stage failed after job reached a terminal state");
            return Ok(());
        }
        let expected = job.status;
        job.transition(JobStatus::Failed)?;
        job.error_message = Some(truncate_error(message));
        if !self.store.save_if_status(&job, expected).await? {
            warn!(error = message, "Stage failed on a concurrently cancelled job");
            return Ok(());
        }
        warn!(error = message, "Job failed");
        Ok(())
    }
}

/// Bound the persisted error message; internal detail beyond this is kept
/// out of the status interface.
fn truncate_error(message: &str) -> String {
    match message.char_indices().nth(defaults::ERROR_MESSAGE_MAX_LEN) {
        Some((idx, _)) => message[..idx].to_string(),
        None => message.to_string(),
    }
}
