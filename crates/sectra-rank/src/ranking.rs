//! Query-to-section relevance ranking.
//!
//! Scores combine saturating hit counts of query terms against a section's
//! keyword set and its title/preview text, plus a structural bonus for
//! heading-type sections. Weights are normalized so every score lands in
//! [0, 1] by construction, and a raw hit-count model (rather than a
//! query-length fraction) guarantees that additional query-term overlap can
//! only raise a section's score.

use std::cmp::Ordering;

use tracing::debug;

use sectra_core::defaults;
use sectra_core::models::{ExtractedSection, SectionType};

use crate::lexical::{overlap_count, term_set};

/// Tunable weights for the relevance score.
#[derive(Debug, Clone)]
pub struct RankingConfig {
    /// Weight of query-term hits in the keyword set.
    pub keyword_weight: f32,
    /// Weight of query-term hits in the title/preview text.
    pub content_weight: f32,
    /// Weight of the heading bonus.
    pub structure_weight: f32,
    /// Keyword hits at which the keyword component saturates.
    pub keyword_saturation: usize,
    /// Content hits at which the content component saturates.
    pub content_saturation: usize,
    /// Display threshold for callers; ranking itself never filters.
    pub score_floor: f32,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            keyword_weight: defaults::RANK_KEYWORD_WEIGHT,
            content_weight: defaults::RANK_CONTENT_WEIGHT,
            structure_weight: defaults::RANK_STRUCTURE_WEIGHT,
            keyword_saturation: defaults::RANK_KEYWORD_SATURATION,
            content_saturation: defaults::RANK_CONTENT_SATURATION,
            score_floor: defaults::RANK_SCORE_FLOOR,
        }
    }
}

impl RankingConfig {
    fn weight_sum(&self) -> f32 {
        self.keyword_weight + self.content_weight + self.structure_weight
    }
}

/// Deterministic total order over scored sections: score descending, then
/// (document_id, page_number, id) ascending.
fn rank_order(a: &ExtractedSection, b: &ExtractedSection) -> Ordering {
    b.relevance_score
        .total_cmp(&a.relevance_score)
        .then_with(|| a.document_id.cmp(&b.document_id))
        .then_with(|| a.page_number.cmp(&b.page_number))
        .then_with(|| a.id.cmp(&b.id))
}

/// Score one section against the normalized query term set.
fn score_section(
    section: &ExtractedSection,
    query_terms: &std::collections::BTreeSet<String>,
    config: &RankingConfig,
) -> f32 {
    if query_terms.is_empty() {
        // Missing/empty query: all sections score equal and the order is
        // resolved entirely by the tie-break rule.
        return 0.0;
    }

    let keyword_hits = overlap_count(query_terms, &section.keywords);
    let content_terms = term_set(&format!("{} {}", section.title, section.content_preview));
    let content_hits = overlap_count(query_terms, &content_terms);

    let keyword_component =
        (keyword_hits as f32 / config.keyword_saturation.max(1) as f32).min(1.0);
    let content_component =
        (content_hits as f32 / config.content_saturation.max(1) as f32).min(1.0);
    let structure_component = if section.section_type == SectionType::Heading {
        1.0
    } else {
        0.0
    };

    let weighted = config.keyword_weight * keyword_component
        + config.content_weight * content_component
        + config.structure_weight * structure_component;

    (weighted / config.weight_sum()).clamp(0.0, 1.0)
}

/// Assign each section a relevance score for `(persona, job_to_be_done)`
/// and return the sections ordered descending by score.
///
/// The ranking is total, not filtering: sections below the configured score
/// floor are still returned. Deterministic for identical inputs.
pub fn rank(
    mut sections: Vec<ExtractedSection>,
    persona: &str,
    job_to_be_done: &str,
    config: &RankingConfig,
) -> Vec<ExtractedSection> {
    if sections.is_empty() {
        return sections;
    }

    let query_terms = term_set(&format!("{persona} {job_to_be_done}"));

    for section in &mut sections {
        section.relevance_score = score_section(section, &query_terms, config);
    }
    sections.sort_by(rank_order);

    debug!(
        result_count = sections.len(),
        query_terms = query_terms.len(),
        top_score = sections.first().map(|s| s.relevance_score).unwrap_or(0.0),
        "Ranking complete"
    );

    sections
}
