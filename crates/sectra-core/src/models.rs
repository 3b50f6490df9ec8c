//! Core data models for sectra.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::{Error, Result};

// =============================================================================
// JOB LIFECYCLE
// =============================================================================

/// Status of an analysis job.
///
/// `Completed`, `Failed`, and `Cancelled` are terminal: no further
/// transitions are accepted once a job reaches one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Whether this status accepts no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Whether the state machine permits a transition to `next`.
    ///
    /// Permitted transitions:
    /// - `Pending -> Processing | Cancelled`
    /// - `Processing -> Completed | Failed | Cancelled`
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match (self, next) {
            (JobStatus::Pending, JobStatus::Processing) => true,
            (JobStatus::Pending, JobStatus::Cancelled) => true,
            (JobStatus::Processing, JobStatus::Completed) => true,
            (JobStatus::Processing, JobStatus::Failed) => true,
            (JobStatus::Processing, JobStatus::Cancelled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

/// A reference to a stored input blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRef {
    /// Document identifier (derived from the uploaded file name).
    pub document_id: String,
    /// Storage location, opaque to everything but the owning `BlobStore`.
    pub location: String,
}

/// The persistent unit of work: one record per submission.
///
/// Owned by the `JobStore`; mutated only by the orchestrator task that owns
/// the job and by the dispatcher (submit/cancel), never concurrently for the
/// same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub id: Uuid,
    pub status: JobStatus,
    /// Completion fraction in [0, 1]. Monotonically non-decreasing while the
    /// job is not terminal.
    pub progress: f32,
    pub persona: String,
    pub job_to_be_done: String,
    /// Ordered references to the stored input documents.
    pub input_refs: Vec<BlobRef>,
    /// Serialized result payload. Present iff `status == Completed`.
    pub result: Option<JsonValue>,
    /// Bounded, human-readable failure message. Present iff
    /// `status == Failed`.
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnalysisJob {
    /// Create a new pending job for a submission.
    pub fn new(persona: impl Into<String>, job_to_be_done: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: JobStatus::Pending,
            progress: 0.0,
            persona: persona.into(),
            job_to_be_done: job_to_be_done.into(),
            input_refs: Vec::new(),
            result: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transition the job to `next`, enforcing the state machine.
    ///
    /// A disallowed transition (including any transition attempt from a
    /// terminal state) returns `InvalidStateTransition` and leaves the
    /// record untouched.
    pub fn transition(&mut self, next: JobStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(Error::InvalidStateTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Advance progress to `value`, clamped to [0, 1].
    ///
    /// Progress never regresses: a value below the current progress is
    /// ignored so concurrent status readers always observe a monotonic
    /// sequence.
    pub fn advance_progress(&mut self, value: f32) {
        let clamped = value.clamp(0.0, 1.0);
        if clamped > self.progress {
            self.progress = clamped;
            self.updated_at = Utc::now();
        }
    }
}

// =============================================================================
// EXTRACTED CONTENT
// =============================================================================

/// Structural type of an extracted section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Heading,
    Paragraph,
    List,
    Table,
    Other,
}

/// A titled unit of document content with a page anchor.
///
/// `relevance_score` is query-dependent and recomputed per job; it is not a
/// document-intrinsic property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub id: Uuid,
    pub document_id: String,
    pub title: String,
    pub page_number: i32,
    pub content_preview: String,
    /// Keywords in a sorted set for deterministic iteration order.
    pub keywords: BTreeSet<String>,
    pub section_type: SectionType,
    pub relevance_score: f32,
}

/// Output of `DocumentExtractor` for a single input document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub document_id: String,
    pub sections: Vec<ExtractedSection>,
}

/// Derived cross-reference artifact: one source section and its most
/// related targets, ordered most-related first. Recomputed per job, never
/// persisted independently of the job's result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedSectionEdge {
    pub source_section_id: Uuid,
    pub target_section_ids: Vec<Uuid>,
    pub relationship_type: String,
    /// Normalized similarity of the strongest target, in [0, 1].
    pub confidence_score: f32,
    /// Deterministic human-readable summary of the shared terms.
    pub explanation: String,
}

// =============================================================================
// INSIGHTS
// =============================================================================

/// Where a generated list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Produced by the external text generator.
    Generated,
    /// Deterministic pre-authored substitute, used on generation failure.
    Fallback,
}

/// One insight category's items with their provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightList {
    pub items: Vec<String>,
    pub provenance: Provenance,
}

impl InsightList {
    pub fn generated(items: Vec<String>) -> Self {
        Self {
            items,
            provenance: Provenance::Generated,
        }
    }

    pub fn fallback(items: Vec<String>) -> Self {
        Self {
            items,
            provenance: Provenance::Fallback,
        }
    }
}

/// Generated (or fallback) insight content for a completed analysis.
///
/// Every category is always populated; consumers need no null-checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsBulb {
    pub key_insights: InsightList,
    pub did_you_know_facts: InsightList,
    pub contradictions: InsightList,
    pub connections: InsightList,
}

/// A generated podcast-style narration of a completed analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodcastScript {
    pub title: String,
    pub script: String,
    pub estimated_duration_secs: u32,
    pub provenance: Provenance,
}

// =============================================================================
// SUBMISSION & RESULT
// =============================================================================

/// An uploaded input file.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// A submission: the persona/query pair driving relevance ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Short descriptor of the intended reader.
    pub persona: String,
    /// Free-text statement of the task the reader wants accomplished.
    pub job_to_be_done: String,
}

/// The stable result payload persisted inside `AnalysisJob::result`.
///
/// Field names are stable so a status poller and the export operation agree
/// on structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub persona: String,
    pub job_to_be_done: String,
    /// Sections ordered descending by relevance score.
    pub ranked_sections: Vec<ExtractedSection>,
    pub related_sections: Vec<RelatedSectionEdge>,
    /// Filled only by the on-demand insights trigger.
    pub insights: Option<InsightsBulb>,
}

impl AnalysisResult {
    /// Serialize into the opaque payload stored on the job record.
    pub fn to_value(&self) -> Result<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }

    /// Deserialize from a job record's stored payload.
    pub fn from_value(value: &JsonValue) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminal() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_transitions_from_pending() {
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Processing));
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Cancelled));
        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Completed));
        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Failed));
        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Pending));
    }

    #[test]
    fn test_status_transitions_from_processing() {
        assert!(JobStatus::Processing.can_transition_to(JobStatus::Completed));
        assert!(JobStatus::Processing.can_transition_to(JobStatus::Failed));
        assert!(JobStatus::Processing.can_transition_to(JobStatus::Cancelled));
        assert!(!JobStatus::Processing.can_transition_to(JobStatus::Pending));
    }

    #[test]
    fn test_no_transitions_from_terminal_states() {
        for from in [JobStatus::Completed, JobStatus::Failed, JobStatus::Cancelled] {
            for to in [
                JobStatus::Pending,
                JobStatus::Processing,
                JobStatus::Completed,
                JobStatus::Failed,
                JobStatus::Cancelled,
            ] {
                assert!(!from.can_transition_to(to), "{from} -> {to} must be rejected");
            }
        }
    }

    #[test]
    fn test_job_new_is_pending() {
        let job = AnalysisJob::new("student", "data preprocessing");
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.progress, 0.0);
        assert!(job.result.is_none());
        assert!(job.error_message.is_none());
        assert_eq!(job.persona, "student");
        assert_eq!(job.job_to_be_done, "data preprocessing");
    }

    #[test]
    fn test_job_transition_rejects_terminal() {
        let mut job = AnalysisJob::new("p", "q");
        job.transition(JobStatus::Processing).unwrap();
        job.transition(JobStatus::Completed).unwrap();

        let before = job.clone();
        let err = job.transition(JobStatus::Processing).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidStateTransition {
                from: JobStatus::Completed,
                to: JobStatus::Processing
            }
        ));
        // No-op on the record.
        assert_eq!(job.status, before.status);
        assert_eq!(job.updated_at, before.updated_at);
    }

    #[test]
    fn test_progress_is_monotonic() {
        let mut job = AnalysisJob::new("p", "q");
        job.advance_progress(0.5);
        assert_eq!(job.progress, 0.5);
        job.advance_progress(0.1);
        assert_eq!(job.progress, 0.5);
        job.advance_progress(0.8);
        assert_eq!(job.progress, 0.8);
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut job = AnalysisJob::new("p", "q");
        job.advance_progress(3.0);
        assert_eq!(job.progress, 1.0);
        job.advance_progress(-1.0);
        assert_eq!(job.progress, 1.0);
    }

    #[test]
    fn test_status_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&JobStatus::Pending).unwrap();
        assert_eq!(json, "\"PENDING\"");
        let json = serde_json::to_string(&JobStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
    }

    #[test]
    fn test_analysis_result_round_trips_stable_fields() {
        let result = AnalysisResult {
            persona: "student".into(),
            job_to_be_done: "learn".into(),
            ranked_sections: Vec::new(),
            related_sections: Vec::new(),
            insights: None,
        };
        let value = result.to_value().unwrap();
        assert!(value.get("ranked_sections").is_some());
        assert!(value.get("related_sections").is_some());
        assert!(value.get("insights").is_some());

        let back = AnalysisResult::from_value(&value).unwrap();
        assert_eq!(back.persona, "student");
        assert!(back.insights.is_none());
    }
}
