//! Job dispatcher: the public surface of the analysis service.
//!
//! Accepts submissions, enforces the concurrency bound, answers status
//! polls, handles cancellation, and serves the post-completion operations
//! (insights, podcast, search, export). All job state flows through the
//! `JobStore`; the dispatcher never holds per-job state of its own.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use sectra_core::defaults;
use sectra_core::models::{
    AnalysisJob, AnalysisRequest, AnalysisResult, ExtractedSection, FileUpload, InsightsBulb,
    JobStatus, PodcastScript,
};
use sectra_core::{BlobStore, DocumentExtractor, Error, JobStore, Result, TextGenerator};
use sectra_insights::{content_digest, InsightsConfig, InsightsEngine, PodcastEngine};
use sectra_rank::rank;

use crate::blob::sanitize_file_name;
use crate::pipeline::{AnalysisPipeline, PipelineConfig};

/// Dispatcher tunables.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Maximum number of jobs processed concurrently; submissions beyond
    /// this are accepted and queued.
    pub max_concurrent: usize,
    pub pipeline: PipelineConfig,
    pub insights: InsightsConfig,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::JOB_MAX_CONCURRENT,
            pipeline: PipelineConfig::default(),
            insights: InsightsConfig::default(),
        }
    }
}

impl DispatcherConfig {
    /// Build from environment variables, falling back to defaults.
    ///
    /// - `SECTRA_MAX_CONCURRENT`: concurrent job limit
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var("SECTRA_MAX_CONCURRENT") {
            if let Ok(parsed) = value.parse::<usize>() {
                if parsed > 0 {
                    config.max_concurrent = parsed;
                }
            }
        }
        config
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn with_pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_insights(mut self, insights: InsightsConfig) -> Self {
        self.insights = insights;
        self
    }
}

/// Entry point for submitting and managing analysis jobs.
pub struct JobDispatcher {
    store: Arc<dyn JobStore>,
    blobs: Arc<dyn BlobStore>,
    pipeline: Arc<AnalysisPipeline>,
    insights: InsightsEngine,
    podcast: PodcastEngine,
    permits: Arc<Semaphore>,
    ranking: PipelineConfig,
}

impl JobDispatcher {
    pub fn new(
        store: Arc<dyn JobStore>,
        blobs: Arc<dyn BlobStore>,
        extractor: Arc<dyn DocumentExtractor>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self::with_config(store, blobs, extractor, generator, DispatcherConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn JobStore>,
        blobs: Arc<dyn BlobStore>,
        extractor: Arc<dyn DocumentExtractor>,
        generator: Arc<dyn TextGenerator>,
        config: DispatcherConfig,
    ) -> Self {
        let pipeline = Arc::new(AnalysisPipeline::with_config(
            store.clone(),
            extractor,
            config.pipeline.clone(),
        ));
        Self {
            store,
            blobs,
            pipeline,
            insights: InsightsEngine::with_config(generator.clone(), config.insights.clone()),
            podcast: PodcastEngine::new(generator),
            permits: Arc::new(Semaphore::new(config.max_concurrent)),
            ranking: config.pipeline,
        }
    }

    /// Validate and accept a submission, returning the new job id.
    ///
    /// The job is persisted as PENDING before this returns; processing runs
    /// on a background task gated by the concurrency limit.
    #[instrument(skip(self, request, files), fields(file_count = files.len()))]
    pub async fn submit(&self, request: AnalysisRequest, files: Vec<FileUpload>) -> Result<Uuid> {
        validate_submission(&request, &files)?;

        let mut job = AnalysisJob::new(&request.persona, &request.job_to_be_done);
        job.input_refs = self.blobs.store(&files, job.id).await?;
        self.store.save(&job).await?;
        info!(job_id = %job.id, persona = %job.persona, "Job accepted");

        let pipeline = self.pipeline.clone();
        let permits = self.permits.clone();
        let job_id = job.id;
        tokio::spawn(async move {
            // Closed only if the dispatcher's semaphore is dropped mid-run,
            // which cannot happen while this task holds a clone.
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            if let Err(e) = pipeline.run(job_id).await {
                error!(job_id = %job_id, error = %e, "Pipeline run aborted");
            }
        });

        Ok(job.id)
    }

    /// Current snapshot of a job. Pure read, no side effects.
    pub async fn status(&self, job_id: Uuid) -> Result<AnalysisJob> {
        self.load(job_id).await
    }

    /// Cancel a pending or in-flight job and release its input blobs.
    #[instrument(skip(self), fields(job_id = %job_id))]
    pub async fn cancel(&self, job_id: Uuid) -> Result<()> {
        // The cancelling write is conditional on the status it was decided
        // on; when the pipeline's own write wins the race, re-evaluate
        // against the new status rather than overwrite it.
        let job = loop {
            let mut job = self.load(job_id).await?;
            if !matches!(job.status, JobStatus::Pending | JobStatus::Processing) {
                return Err(Error::InvalidOperation(format!(
                    "cannot cancel job in status {}",
                    job.status
                )));
            }

            let expected = job.status;
            job.transition(JobStatus::Cancelled)?;
            if self.store.save_if_status(&job, expected).await? {
                break job;
            }
        };
        info!("Job cancelled");

        // Blob release is best effort: the cancellation itself has already
        // been committed.
        for blob in &job.input_refs {
            if let Err(e) = self.blobs.delete(blob).await {
                warn!(document_id = %blob.document_id, error = %e, "Failed to release input blob");
            }
        }
        Ok(())
    }

    /// Generate the insights bulb for a completed job and persist it into
    /// the job's result payload.
    #[instrument(skip(self), fields(job_id = %job_id))]
    pub async fn generate_insights(&self, job_id: Uuid) -> Result<InsightsBulb> {
        let mut job = self.load(job_id).await?;
        let mut result = completed_result(&job)?;

        let digest = content_digest(&result.ranked_sections);
        let bulb = self.insights.generate_bulb(&digest).await;

        result.insights = Some(bulb.clone());
        job.result = Some(result.to_value()?);
        self.store.save(&job).await?;
        Ok(bulb)
    }

    /// Generate a podcast script over a completed job's ranked sections.
    #[instrument(skip(self), fields(job_id = %job_id))]
    pub async fn generate_podcast(
        &self,
        job_id: Uuid,
        duration_secs: u32,
    ) -> Result<PodcastScript> {
        let job = self.load(job_id).await?;
        let result = completed_result(&job)?;
        Ok(self
            .podcast
            .generate_script(&result.ranked_sections, duration_secs)
            .await)
    }

    /// Re-rank a completed job's sections against an ad-hoc query.
    #[instrument(skip(self), fields(job_id = %job_id))]
    pub async fn search_documents(
        &self,
        job_id: Uuid,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<ExtractedSection>> {
        let job = self.load(job_id).await?;
        let result = completed_result(&job)?;

        let mut ranked = rank(result.ranked_sections, "", query, &self.ranking.ranking);
        ranked.truncate(max_results);
        Ok(ranked)
    }

    /// The full persisted result of a completed job.
    pub async fn export_analysis(&self, job_id: Uuid) -> Result<AnalysisResult> {
        let job = self.load(job_id).await?;
        completed_result(&job)
    }

    async fn load(&self, job_id: Uuid) -> Result<AnalysisJob> {
        self.store
            .find_by_id(job_id)
            .await?
            .ok_or(Error::JobNotFound(job_id))
    }
}

/// Decode the result payload of a job that must be COMPLETED.
fn completed_result(job: &AnalysisJob) -> Result<AnalysisResult> {
    if job.status != JobStatus::Completed {
        return Err(Error::InvalidOperation(format!(
            "job is {}, not COMPLETED",
            job.status
        )));
    }
    let payload = job
        .result
        .as_ref()
        .ok_or_else(|| Error::Internal("completed job has no result payload".into()))?;
    AnalysisResult::from_value(payload)
}

fn validate_submission(request: &AnalysisRequest, files: &[FileUpload]) -> Result<()> {
    if request.persona.trim().is_empty() {
        return Err(Error::Validation("persona must not be empty".into()));
    }
    if request.job_to_be_done.trim().is_empty() {
        return Err(Error::Validation("job_to_be_done must not be empty".into()));
    }
    if files.is_empty() {
        return Err(Error::Validation(
            "at least one input file is required".into(),
        ));
    }
    for file in files {
        if sanitize_file_name(&file.file_name).trim().is_empty() {
            return Err(Error::Validation(format!(
                "invalid file name: {:?}",
                file.file_name
            )));
        }
    }
    Ok(())
}
