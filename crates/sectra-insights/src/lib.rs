//! # sectra-insights
//!
//! Generative insight and podcast content for sectra, with deterministic
//! fallbacks.
//!
//! The engines here wrap a [`sectra_core::TextGenerator`] collaborator and
//! never fail their callers: generation errors, timeouts, and unparseable
//! responses all degrade to fixed fallback content, independently per
//! category.

pub mod bulb;
pub mod normalize;
pub mod ollama;
pub mod podcast;

pub use bulb::{content_digest, InsightCategory, InsightsConfig, InsightsEngine};
pub use normalize::parse_generated_list;
pub use ollama::OllamaGenerator;
pub use podcast::PodcastEngine;
