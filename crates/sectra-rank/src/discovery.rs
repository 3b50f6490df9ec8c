//! Related-section discovery.
//!
//! For each of the top-ranked sections, finds the other sections most
//! related to it across the whole corpus. Unlike ranking this is a
//! symmetric section-to-section comparison, independent of the persona
//! query: two sections are related through the terms they share, not
//! through what the reader asked for.

use std::collections::BTreeSet;

use tracing::debug;
use uuid::Uuid;

use sectra_core::defaults;
use sectra_core::models::{ExtractedSection, RelatedSectionEdge};

use crate::lexical::{jaccard, shared_terms, term_set};

/// Maximum shared terms listed in an edge explanation.
const EXPLANATION_TERM_CAP: usize = 5;

/// Combined term profile of a section: keywords plus title terms.
fn section_terms(section: &ExtractedSection) -> BTreeSet<String> {
    let mut terms = section.keywords.clone();
    terms.extend(term_set(&section.title));
    terms
}

/// Compose a deterministic explanation from the shared-term set.
fn explain(shared: &[String]) -> String {
    let listed: Vec<&str> = shared
        .iter()
        .take(EXPLANATION_TERM_CAP)
        .map(|s| s.as_str())
        .collect();
    format!("Related through shared terms: {}", listed.join(", "))
}

/// A scored candidate target during discovery.
struct Candidate<'a> {
    section: &'a ExtractedSection,
    similarity: f32,
    shared: Vec<String>,
}

/// For each source id in `top_section_ids`, find up to `k` other sections
/// most related to it, with a normalized confidence score.
///
/// Self-pairs are excluded, candidates with no shared terms are omitted,
/// and sources with no remaining candidates produce no edge (a
/// single-section corpus yields an empty result, not an error). Candidate
/// order is deterministic: similarity descending, then the ranking
/// tie-break order.
pub fn discover(
    sections: &[ExtractedSection],
    top_section_ids: &[Uuid],
    k: usize,
) -> Vec<RelatedSectionEdge> {
    let mut edges = Vec::new();
    if sections.len() < 2 || k == 0 {
        return edges;
    }

    let profiles: Vec<BTreeSet<String>> = sections.iter().map(section_terms).collect();

    for source_id in top_section_ids {
        let Some(source_idx) = sections.iter().position(|s| s.id == *source_id) else {
            // Unknown source ids are skipped; every emitted edge references
            // a section in the extracted set.
            continue;
        };

        let mut candidates: Vec<Candidate<'_>> = sections
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != source_idx)
            .filter_map(|(idx, candidate)| {
                let similarity = jaccard(&profiles[source_idx], &profiles[idx]);
                if similarity <= 0.0 {
                    return None;
                }
                Some(Candidate {
                    section: candidate,
                    similarity,
                    shared: shared_terms(&profiles[source_idx], &profiles[idx]),
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.section.document_id.cmp(&b.section.document_id))
                .then_with(|| a.section.page_number.cmp(&b.section.page_number))
                .then_with(|| a.section.id.cmp(&b.section.id))
        });
        candidates.truncate(k);

        let Some(best) = candidates.first() else {
            continue;
        };

        edges.push(RelatedSectionEdge {
            source_section_id: *source_id,
            target_section_ids: candidates.iter().map(|c| c.section.id).collect(),
            relationship_type: defaults::RELATED_RELATIONSHIP_TYPE.to_string(),
            confidence_score: best.similarity.clamp(0.0, 1.0),
            explanation: explain(&best.shared),
        });
    }

    debug!(
        sources = top_section_ids.len(),
        result_count = edges.len(),
        k,
        "Related-section discovery complete"
    );

    edges
}
