//! Centralized default constants for the sectra system.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates reference these constants instead of defining their own
//! magic numbers.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

// =============================================================================
// PIPELINE PROGRESS
// =============================================================================

/// Progress checkpoint written when a job enters the processing stage.
pub const PROGRESS_STARTED: f32 = 0.1;

/// Progress checkpoint written after document extraction completes.
pub const PROGRESS_EXTRACTED: f32 = 0.5;

/// Progress checkpoint written after ranking and cross-referencing.
pub const PROGRESS_RANKED: f32 = 0.8;

/// Progress checkpoint written after final result assembly.
pub const PROGRESS_DONE: f32 = 1.0;

/// Maximum length of a persisted job error message. Stage errors are
/// truncated to this many characters before being written to the record.
pub const ERROR_MESSAGE_MAX_LEN: usize = 500;

// =============================================================================
// JOB PROCESSING
// =============================================================================

/// Default maximum number of jobs processed concurrently.
pub const JOB_MAX_CONCURRENT: usize = 4;

/// Default polling interval for status readers (milliseconds).
pub const STATUS_POLL_INTERVAL_MS: u64 = 500;

// =============================================================================
// RANKING
// =============================================================================

/// Weight of query-term hits in a section's keyword set.
pub const RANK_KEYWORD_WEIGHT: f32 = 0.5;

/// Weight of query-term hits in a section's title and preview text.
pub const RANK_CONTENT_WEIGHT: f32 = 0.3;

/// Weight of the structural bonus for heading-type sections.
pub const RANK_STRUCTURE_WEIGHT: f32 = 0.2;

/// Keyword hit count at which the keyword component saturates at 1.0.
pub const RANK_KEYWORD_SATURATION: usize = 4;

/// Content hit count at which the content component saturates at 1.0.
pub const RANK_CONTENT_SATURATION: usize = 6;

/// Default display floor for relevance scores. Ranking is total, not
/// filtering; callers apply this threshold for display only.
pub const RANK_SCORE_FLOOR: f32 = 0.05;

// =============================================================================
// RELATED-SECTION DISCOVERY
// =============================================================================

/// Number of top-ranked sections that get related-section edges.
pub const RELATED_TOP_SECTIONS: usize = 10;

/// Maximum related targets per source section.
pub const RELATED_MAX_TARGETS: usize = 3;

/// Relationship tag attached to lexical-similarity edges.
pub const RELATED_RELATIONSHIP_TYPE: &str = "content_similarity";

// =============================================================================
// EXTRACTION
// =============================================================================

/// Maximum characters kept in a section's content preview.
pub const SECTION_PREVIEW_LEN: usize = 200;

/// Maximum keywords selected per extracted section.
pub const SECTION_MAX_KEYWORDS: usize = 8;

/// Minimum line length for heading candidates (exclusive).
pub const HEADING_MIN_LEN: usize = 5;

/// Maximum line length for heading candidates (exclusive).
pub const HEADING_MAX_LEN: usize = 100;

// =============================================================================
// GENERATION
// =============================================================================

/// Timeout for a single generator call (seconds).
pub const GEN_TIMEOUT_SECS: u64 = 20;

/// Default Ollama base URL.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default generation model name (Ollama).
pub const GEN_MODEL: &str = "llama3.2";

/// Prompt input cap for the key-insights category (characters).
pub const INSIGHT_KEY_INPUT_CAP: usize = 2000;

/// Prompt input cap for the remaining insight categories (characters).
pub const INSIGHT_OTHER_INPUT_CAP: usize = 1500;

/// Minimum usable line length when parsing generator responses.
pub const INSIGHT_MIN_LINE_LEN: usize = 10;

/// Default target podcast duration (seconds).
pub const PODCAST_DURATION_SECS: u32 = 120;
