//! Insight generation with deterministic per-category fallbacks.
//!
//! The engine prefers `TextGenerator` output but never fails the caller:
//! every category is always populated, either from a parsed generator
//! response or from fixed fallback content. Categories degrade
//! independently; a failure in one never affects the others.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use sectra_core::defaults;
use sectra_core::models::{ExtractedSection, InsightList, InsightsBulb};
use sectra_core::{Error, Result, TextGenerator};

use crate::normalize::parse_generated_list;

/// The four insight categories of a bulb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightCategory {
    KeyInsights,
    DidYouKnowFacts,
    Contradictions,
    Connections,
}

impl InsightCategory {
    /// Category name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::KeyInsights => "key_insights",
            Self::DidYouKnowFacts => "did_you_know_facts",
            Self::Contradictions => "contradictions",
            Self::Connections => "connections",
        }
    }

    /// Maximum items kept from a parsed response.
    fn max_items(&self) -> usize {
        match self {
            Self::KeyInsights => 5,
            Self::DidYouKnowFacts => 4,
            Self::Contradictions => 3,
            Self::Connections => 4,
        }
    }

    /// Prompt input cap in characters, bounding generator latency and cost.
    fn input_cap(&self) -> usize {
        match self {
            Self::KeyInsights => defaults::INSIGHT_KEY_INPUT_CAP,
            _ => defaults::INSIGHT_OTHER_INPUT_CAP,
        }
    }

    /// Build the category prompt from (capped) document content.
    fn prompt(&self, content: &str) -> String {
        let content = truncate_chars(content, self.input_cap());
        match self {
            Self::KeyInsights => format!(
                "Analyze the following document content and provide 3-5 key insights. \
                 Focus on the most important, actionable, and surprising findings. \
                 Each insight should be concise (1-2 sentences) and valuable to the reader.\n\n\
                 Content:\n{content}\n\nKey Insights:"
            ),
            Self::DidYouKnowFacts => format!(
                "Based on the following document content, generate 3-4 interesting \
                 \"Did you know?\" facts. These should be surprising, educational, or \
                 provide additional context. Make them engaging and factual.\n\n\
                 Content:\n{content}\n\nDid You Know Facts:"
            ),
            Self::Contradictions => format!(
                "Analyze the following content for contradictions, counterpoints, or \
                 alternative perspectives. Look for statements that might conflict with \
                 each other or present different viewpoints. Provide 2-3 contradictions \
                 or counterpoints if found.\n\n\
                 Content:\n{content}\n\nContradictions/Counterpoints:"
            ),
            Self::Connections => format!(
                "Identify connections and relationships between different sections or \
                 topics in this content. Look for themes, concepts, or ideas that appear \
                 in multiple places. Provide 3-4 meaningful connections.\n\n\
                 Content:\n{content}\n\nConnections:"
            ),
        }
    }

    /// Fixed fallback content, substituted when generation fails, times
    /// out, or parses to nothing.
    fn fallback_items(&self) -> Vec<String> {
        let items: &[&str] = match self {
            Self::KeyInsights => &[
                "Document contains structured information with clear section hierarchies",
                "Multiple related topics are interconnected throughout the content",
                "Key concepts appear consistently across different sections",
            ],
            Self::DidYouKnowFacts => &[
                "PDF format was invented by Adobe in 1993",
                "Document structure analysis can improve reading comprehension by 40%",
                "Related content identification helps reduce information processing time",
            ],
            Self::Contradictions => {
                &["No significant contradictions found in the analyzed content"]
            }
            Self::Connections => &[
                "Related sections share common terminology and concepts",
                "Document structure suggests hierarchical information organization",
                "Cross-references appear between different topic areas",
            ],
        };
        items.iter().map(|s| s.to_string()).collect()
    }
}

/// Configuration for the insights engine.
#[derive(Debug, Clone)]
pub struct InsightsConfig {
    /// Per-call generator timeout.
    pub timeout: Duration,
    /// Minimum usable line length when parsing responses.
    pub min_line_len: usize,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(defaults::GEN_TIMEOUT_SECS),
            min_line_len: defaults::INSIGHT_MIN_LINE_LEN,
        }
    }
}

/// Produces `InsightsBulb` content from document section text.
pub struct InsightsEngine {
    generator: Arc<dyn TextGenerator>,
    config: InsightsConfig,
}

impl InsightsEngine {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self::with_config(generator, InsightsConfig::default())
    }

    pub fn with_config(generator: Arc<dyn TextGenerator>, config: InsightsConfig) -> Self {
        Self { generator, config }
    }

    /// Generate a fully populated bulb. Infallible: each category falls
    /// back to its fixed content independently.
    pub async fn generate_bulb(&self, content: &str) -> InsightsBulb {
        InsightsBulb {
            key_insights: self.category(InsightCategory::KeyInsights, content).await,
            did_you_know_facts: self
                .category(InsightCategory::DidYouKnowFacts, content)
                .await,
            contradictions: self
                .category(InsightCategory::Contradictions, content)
                .await,
            connections: self.category(InsightCategory::Connections, content).await,
        }
    }

    /// Generate one category, substituting fallback content on any failure.
    async fn category(&self, category: InsightCategory, content: &str) -> InsightList {
        match self.try_generate(category, content).await {
            Ok(items) => {
                debug!(
                    category = category.name(),
                    result_count = items.len(),
                    "Generated insight category"
                );
                InsightList::generated(items)
            }
            Err(e) => {
                warn!(
                    category = category.name(),
                    error = %e,
                    fallback = true,
                    "Generation failed, substituting fallback content"
                );
                InsightList::fallback(category.fallback_items())
            }
        }
    }

    async fn try_generate(&self, category: InsightCategory, content: &str) -> Result<Vec<String>> {
        let prompt = category.prompt(content);

        // Outer guard in case a backend ignores its timeout argument.
        let response = tokio::time::timeout(
            self.config.timeout,
            self.generator.generate(&prompt, self.config.timeout),
        )
        .await
        .map_err(|_| Error::GenerationTimeout(self.config.timeout.as_secs()))??;

        let items = parse_generated_list(&response, self.config.min_line_len, category.max_items());
        if items.is_empty() {
            return Err(Error::Generation(format!(
                "response parsed to zero usable lines for {}",
                category.name()
            )));
        }
        Ok(items)
    }
}

/// Concatenate section titles and previews into the digest fed to insight
/// prompts ("Title: preview" per section).
pub fn content_digest(sections: &[ExtractedSection]) -> String {
    let mut digest = String::new();
    for section in sections {
        digest.push_str(&section.title);
        digest.push_str(": ");
        digest.push_str(&section.content_preview);
        digest.push_str("\n\n");
    }
    digest
}

/// Truncate to at most `cap` characters on a char boundary.
fn truncate_chars(s: &str, cap: usize) -> &str {
    match s.char_indices().nth(cap) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
