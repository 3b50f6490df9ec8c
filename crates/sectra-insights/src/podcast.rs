//! Podcast-script generation for a completed analysis.
//!
//! Same contract as insight generation: generator-preferred, deterministic
//! fallback, never fails the caller. The fallback script is composed from
//! the top ranked sections so it is always non-empty when the analysis
//! produced any sections at all.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use sectra_core::defaults;
use sectra_core::models::{ExtractedSection, PodcastScript, Provenance};
use sectra_core::{Error, Result, TextGenerator};

/// Sections included in the prompt and the fallback narration.
const SCRIPT_SECTION_CAP: usize = 5;

/// Rough spoken-word budget: ~150 words per minute.
const WORDS_PER_MINUTE: u32 = 150;

/// Produces podcast scripts from ranked analysis sections.
pub struct PodcastEngine {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl PodcastEngine {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            timeout: Duration::from_secs(defaults::GEN_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Generate a script of roughly `duration_secs` spoken seconds from the
    /// ranked sections. Infallible: falls back to a deterministic narration
    /// on any generator failure.
    pub async fn generate_script(
        &self,
        sections: &[ExtractedSection],
        duration_secs: u32,
    ) -> PodcastScript {
        match self.try_generate(sections, duration_secs).await {
            Ok(script) => {
                debug!(
                    script_len = script.len(),
                    duration_secs, "Generated podcast script"
                );
                PodcastScript {
                    title: script_title(sections),
                    script,
                    estimated_duration_secs: duration_secs,
                    provenance: Provenance::Generated,
                }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    fallback = true,
                    "Podcast generation failed, composing fallback script"
                );
                PodcastScript {
                    title: script_title(sections),
                    script: fallback_script(sections),
                    estimated_duration_secs: duration_secs,
                    provenance: Provenance::Fallback,
                }
            }
        }
    }

    async fn try_generate(
        &self,
        sections: &[ExtractedSection],
        duration_secs: u32,
    ) -> Result<String> {
        let word_budget = duration_secs * WORDS_PER_MINUTE / 60;
        let outline: String = sections
            .iter()
            .take(SCRIPT_SECTION_CAP)
            .map(|s| format!("- {}: {}\n", s.title, s.content_preview))
            .collect();
        let prompt = format!(
            "Write a conversational podcast narration of about {word_budget} words \
             summarizing these document sections for a listener. Use an engaging \
             spoken tone, no headings or bullet points.\n\nSections:\n{outline}\n\nNarration:"
        );

        let response = tokio::time::timeout(
            self.timeout,
            self.generator.generate(&prompt, self.timeout),
        )
        .await
        .map_err(|_| Error::GenerationTimeout(self.timeout.as_secs()))??;

        let script = response.trim().to_string();
        if script.is_empty() {
            return Err(Error::Generation("empty podcast narration".into()));
        }
        Ok(script)
    }
}

fn script_title(sections: &[ExtractedSection]) -> String {
    match sections.first() {
        Some(top) => format!("Audio overview: {}", top.title),
        None => "Audio overview".to_string(),
    }
}

/// Deterministic narration composed from the top ranked sections.
fn fallback_script(sections: &[ExtractedSection]) -> String {
    if sections.is_empty() {
        return "This analysis did not extract any sections to discuss.".to_string();
    }
    let mut script = String::from(
        "Welcome to this audio overview of your documents. Here are the highlights. ",
    );
    for section in sections.iter().take(SCRIPT_SECTION_CAP) {
        script.push_str(&format!(
            "On page {} of {}, the section titled \"{}\" covers: {} ",
            section.page_number, section.document_id, section.title, section.content_preview
        ));
    }
    script.push_str("That concludes this overview.");
    script
}
