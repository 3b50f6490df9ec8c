//! End-to-end tests for the analysis pipeline through the dispatcher.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use sectra_core::models::{
    AnalysisJob, AnalysisRequest, BlobRef, ExtractedDocument, FileUpload, JobStatus, Provenance,
};
use sectra_core::{DocumentExtractor, Error, Result, TextGenerator};
use sectra_insights::InsightsConfig;
use sectra_jobs::{
    DispatcherConfig, FsBlobStore, JobDispatcher, MemoryJobStore, PlainTextExtractor,
};

const ML_GUIDE: &str = "Data Preprocessing Fundamentals\n\
    Cleaning, normalizing and deduplicating raw data before model training.\n\
    Good preprocessing of data improves downstream model quality.\n\
    Model Evaluation Metrics\n\
    Precision, recall and calibration for trained models.\n";

const PIPELINE_NOTES: &str = "Data Preprocessing Checklist\n\
    Validate encodings, strip markup, normalize whitespace in the data.\n\
    Deployment Considerations\n\
    Packaging and serving infrastructure for models in production.\n";

fn request(persona: &str, job_to_be_done: &str) -> AnalysisRequest {
    AnalysisRequest {
        persona: persona.into(),
        job_to_be_done: job_to_be_done.into(),
    }
}

fn upload(name: &str, content: &[u8]) -> FileUpload {
    FileUpload {
        file_name: name.into(),
        content: content.to_vec(),
    }
}

struct StaticGenerator(&'static str);

#[async_trait]
impl TextGenerator for StaticGenerator {
    async fn generate(&self, _prompt: &str, _timeout: Duration) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// Ignores its timeout argument and never completes in time.
struct HangingGenerator;

#[async_trait]
impl TextGenerator for HangingGenerator {
    async fn generate(&self, _prompt: &str, _timeout: Duration) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("too late".into())
    }
}

/// Wraps the plain-text extractor, recording how many extractions run at
/// once and holding each one open briefly.
struct TrackedExtractor {
    inner: PlainTextExtractor,
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    hold: Duration,
}

#[async_trait]
impl DocumentExtractor for TrackedExtractor {
    async fn extract(&self, blobs: &[BlobRef]) -> Result<Vec<ExtractedDocument>> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.hold).await;
        let result = self.inner.extract(blobs).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

fn dispatcher_with(
    store: MemoryJobStore,
    blob_root: &Path,
    generator: Arc<dyn TextGenerator>,
    config: DispatcherConfig,
) -> JobDispatcher {
    JobDispatcher::with_config(
        Arc::new(store),
        Arc::new(FsBlobStore::new(blob_root)),
        Arc::new(PlainTextExtractor::new()),
        generator,
        config,
    )
}

async fn wait_for_terminal(dispatcher: &JobDispatcher, job_id: Uuid) -> AnalysisJob {
    for _ in 0..500 {
        let job = dispatcher.status(job_id).await.unwrap();
        if job.status.is_terminal() {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {job_id} did not reach a terminal state");
}

#[tokio::test]
async fn test_two_documents_ranked_for_persona() {
    let root = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher_with(
        MemoryJobStore::new(),
        root.path(),
        Arc::new(StaticGenerator("- A generated line of sufficient length")),
        DispatcherConfig::default(),
    );

    let job_id = dispatcher
        .submit(
            request("student", "data preprocessing"),
            vec![
                upload("ml_guide.txt", ML_GUIDE.as_bytes()),
                upload("pipeline_notes.txt", PIPELINE_NOTES.as_bytes()),
            ],
        )
        .await
        .unwrap();

    let job = wait_for_terminal(&dispatcher, job_id).await;
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress, 1.0);
    assert!(job.error_message.is_none());

    let result = dispatcher.export_analysis(job_id).await.unwrap();
    assert_eq!(result.persona, "student");
    assert_eq!(result.ranked_sections.len(), 4);

    // Both preprocessing sections outrank the off-topic ones.
    let titles: Vec<&str> = result
        .ranked_sections
        .iter()
        .take(2)
        .map(|s| s.title.as_str())
        .collect();
    assert!(titles.contains(&"Data Preprocessing Fundamentals"));
    assert!(titles.contains(&"Data Preprocessing Checklist"));
    assert!(result.ranked_sections[0].relevance_score >= result.ranked_sections[1].relevance_score);

    // Related edges are well formed: no self references, bounded targets.
    assert!(!result.related_sections.is_empty());
    for edge in &result.related_sections {
        assert!(!edge.target_section_ids.contains(&edge.source_section_id));
        assert!(edge.target_section_ids.len() <= 3);
        assert!(edge.confidence_score > 0.0);
        assert!(!edge.explanation.is_empty());
    }
}

#[tokio::test]
async fn test_hanging_generator_yields_complete_fallback_insights() {
    let root = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher_with(
        MemoryJobStore::new(),
        root.path(),
        Arc::new(HangingGenerator),
        DispatcherConfig::default().with_insights(InsightsConfig {
            timeout: Duration::from_millis(100),
            ..InsightsConfig::default()
        }),
    );

    let job_id = dispatcher
        .submit(
            request("student", "data preprocessing"),
            vec![upload("ml_guide.txt", ML_GUIDE.as_bytes())],
        )
        .await
        .unwrap();
    wait_for_terminal(&dispatcher, job_id).await;

    let bulb = dispatcher.generate_insights(job_id).await.unwrap();
    for list in [
        &bulb.key_insights,
        &bulb.did_you_know_facts,
        &bulb.contradictions,
        &bulb.connections,
    ] {
        assert_eq!(list.provenance, Provenance::Fallback);
        assert!(!list.items.is_empty());
    }
}

#[tokio::test]
async fn test_corrupt_input_fails_job_with_bounded_message() {
    let root = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher_with(
        MemoryJobStore::new(),
        root.path(),
        Arc::new(StaticGenerator("unused")),
        DispatcherConfig::default(),
    );

    // Invalid UTF-8 payload.
    let job_id = dispatcher
        .submit(
            request("student", "anything at all"),
            vec![upload("broken.txt", &[0xff, 0xfe, 0x00, 0xff])],
        )
        .await
        .unwrap();

    let job = wait_for_terminal(&dispatcher, job_id).await;
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.result.is_none());
    let message = job.error_message.expect("failed job carries a message");
    assert!(!message.is_empty());
    assert!(message.chars().count() <= 500);

    // A failed job has no exportable result.
    assert!(matches!(
        dispatcher.export_analysis(job_id).await,
        Err(Error::InvalidOperation(_))
    ));
}

#[tokio::test]
async fn test_concurrency_bound_is_respected() {
    let root = tempfile::tempdir().unwrap();
    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let dispatcher = JobDispatcher::with_config(
        Arc::new(MemoryJobStore::new()),
        Arc::new(FsBlobStore::new(root.path())),
        Arc::new(TrackedExtractor {
            inner: PlainTextExtractor::new(),
            current: current.clone(),
            peak: peak.clone(),
            hold: Duration::from_millis(50),
        }),
        Arc::new(StaticGenerator("unused")),
        DispatcherConfig::default().with_max_concurrent(2),
    );

    let mut ids = Vec::new();
    for i in 0..6 {
        let id = dispatcher
            .submit(
                request("analyst", "compare the documents"),
                vec![upload(&format!("doc{i}.txt"), ML_GUIDE.as_bytes())],
            )
            .await
            .unwrap();
        ids.push(id);
    }
    for id in ids {
        let job = wait_for_terminal(&dispatcher, id).await;
        assert_eq!(job.status, JobStatus::Completed);
    }

    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(current.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancel_queued_job_releases_blobs() {
    let root = tempfile::tempdir().unwrap();
    let store = MemoryJobStore::new();

    // One permit and a slow extractor: the second submission queues behind
    // the first and stays PENDING long enough to cancel deterministically.
    let dispatcher = JobDispatcher::with_config(
        Arc::new(store.clone()),
        Arc::new(FsBlobStore::new(root.path())),
        Arc::new(TrackedExtractor {
            inner: PlainTextExtractor::new(),
            current: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
            hold: Duration::from_millis(300),
        }),
        Arc::new(StaticGenerator("unused")),
        DispatcherConfig::default().with_max_concurrent(1),
    );

    let first = dispatcher
        .submit(
            request("student", "data preprocessing"),
            vec![upload("first.txt", ML_GUIDE.as_bytes())],
        )
        .await
        .unwrap();
    let queued = dispatcher
        .submit(
            request("student", "data preprocessing"),
            vec![upload("queued.txt", PIPELINE_NOTES.as_bytes())],
        )
        .await
        .unwrap();

    let blob_path = {
        use sectra_core::JobStore;
        let job = store.find_by_id(queued).await.unwrap().unwrap();
        job.input_refs[0].location.clone()
    };

    dispatcher.cancel(queued).await.unwrap();

    let job = dispatcher.status(queued).await.unwrap();
    assert_eq!(job.status, JobStatus::Cancelled);
    assert!(job.result.is_none());
    assert!(!Path::new(&blob_path).exists());

    // Cancelling again is rejected; the record is untouched.
    assert!(matches!(
        dispatcher.cancel(queued).await,
        Err(Error::InvalidOperation(_))
    ));
    assert_eq!(
        dispatcher.status(queued).await.unwrap().status,
        JobStatus::Cancelled
    );

    // The queued job never ran even after the first one finishes.
    let first_job = wait_for_terminal(&dispatcher, first).await;
    assert_eq!(first_job.status, JobStatus::Completed);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        dispatcher.status(queued).await.unwrap().progress,
        0.0
    );
}

#[tokio::test]
async fn test_search_over_completed_analysis() {
    let root = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher_with(
        MemoryJobStore::new(),
        root.path(),
        Arc::new(StaticGenerator("unused")),
        DispatcherConfig::default(),
    );

    let job_id = dispatcher
        .submit(
            request("student", "data preprocessing"),
            vec![
                upload("ml_guide.txt", ML_GUIDE.as_bytes()),
                upload("pipeline_notes.txt", PIPELINE_NOTES.as_bytes()),
            ],
        )
        .await
        .unwrap();
    wait_for_terminal(&dispatcher, job_id).await;

    let hits = dispatcher
        .search_documents(job_id, "deployment serving infrastructure", 2)
        .await
        .unwrap();
    assert!(!hits.is_empty());
    assert!(hits.len() <= 2);
    assert_eq!(hits[0].title, "Deployment Considerations");
}
