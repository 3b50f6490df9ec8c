//! Plain-text document extractor.
//!
//! Splits UTF-8 text blobs into titled sections using heading heuristics:
//! a heading line is short, and either fully upper-case, title-case, or a
//! numbered heading ("2. Methods"). Form feeds separate pages. Documents
//! with no recognizable headings degrade to one paragraph section per page
//! so downstream ranking always has something to work with.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use sectra_core::defaults;
use sectra_core::models::{ExtractedDocument, ExtractedSection, SectionType};
use sectra_core::{BlobRef, DocumentExtractor, Error, Result};
use sectra_rank::lexical::tokenize;

/// Whether a line looks like a section heading.
///
/// Ported heuristics: length in (HEADING_MIN_LEN, HEADING_MAX_LEN), and
/// all-caps, title-case, or a leading "N." numbered form.
fn is_heading_candidate(line: &str) -> bool {
    let len = line.chars().count();
    if len <= defaults::HEADING_MIN_LEN || len >= defaults::HEADING_MAX_LEN {
        return false;
    }

    let has_alpha = line.chars().any(|c| c.is_alphabetic());
    if !has_alpha {
        return false;
    }

    let is_upper = line
        .chars()
        .filter(|c| c.is_alphabetic())
        .all(|c| c.is_uppercase());

    let is_title = line.split_whitespace().all(|word| {
        word.chars()
            .find(|c| c.is_alphabetic())
            .map_or(true, |c| c.is_uppercase())
    });

    let is_numbered = {
        let prefix: String = line.chars().take(3).collect();
        line.chars().next().is_some_and(|c| c.is_ascii_digit()) && prefix.contains('.')
    };

    is_upper || is_title || is_numbered
}

/// Pick the most frequent content terms as section keywords.
/// Deterministic: frequency descending, then alphabetical.
fn select_keywords(text: &str) -> std::collections::BTreeSet<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for term in tokenize(text) {
        *counts.entry(term).or_insert(0) += 1;
    }
    let mut terms: Vec<(String, usize)> = counts.into_iter().collect();
    terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    terms
        .into_iter()
        .take(defaults::SECTION_MAX_KEYWORDS)
        .map(|(term, _)| term)
        .collect()
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(defaults::SECTION_PREVIEW_LEN) {
        Some((idx, _)) => trimmed[..idx].to_string(),
        None => trimmed.to_string(),
    }
}

fn section(
    document_id: &str,
    title: &str,
    body: &str,
    page_number: i32,
    section_type: SectionType,
) -> ExtractedSection {
    ExtractedSection {
        id: Uuid::new_v4(),
        document_id: document_id.to_string(),
        title: title.to_string(),
        page_number,
        content_preview: preview(body),
        keywords: select_keywords(&format!("{title} {body}")),
        section_type,
        relevance_score: 0.0,
    }
}

/// Split one document's text into sections.
fn extract_document(document_id: &str, text: &str) -> ExtractedDocument {
    let mut sections = Vec::new();

    // Form feeds delimit pages; plain files are a single page.
    for (page_idx, page) in text.split('\u{c}').enumerate() {
        let page_number = page_idx as i32 + 1;
        let lines: Vec<&str> = page.lines().map(str::trim).collect();

        let mut current: Option<(String, Vec<String>)> = None;
        for line in &lines {
            if is_heading_candidate(line) {
                if let Some((title, body)) = current.take() {
                    sections.push(section(
                        document_id,
                        &title,
                        &body.join(" "),
                        page_number,
                        SectionType::Heading,
                    ));
                }
                current = Some((line.to_string(), Vec::new()));
            } else if let Some((_, body)) = current.as_mut() {
                if !line.is_empty() {
                    body.push(line.to_string());
                }
            }
        }
        if let Some((title, body)) = current.take() {
            sections.push(section(
                document_id,
                &title,
                &body.join(" "),
                page_number,
                SectionType::Heading,
            ));
        }

        // No headings on this page: keep its text as a paragraph section.
        if !sections.iter().any(|s| s.page_number == page_number) {
            let body = lines
                .iter()
                .filter(|l| !l.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            if !body.is_empty() {
                let title = preview(lines.iter().find(|l| !l.is_empty()).unwrap_or(&""));
                sections.push(section(
                    document_id,
                    &title,
                    &body,
                    page_number,
                    SectionType::Paragraph,
                ));
            }
        }
    }

    ExtractedDocument {
        document_id: document_id.to_string(),
        sections,
    }
}

/// `DocumentExtractor` for plain-text input blobs.
#[derive(Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentExtractor for PlainTextExtractor {
    async fn extract(&self, blobs: &[BlobRef]) -> Result<Vec<ExtractedDocument>> {
        let mut documents = Vec::with_capacity(blobs.len());
        for blob in blobs {
            let bytes = tokio::fs::read(&blob.location).await.map_err(|e| {
                Error::Extraction(format!("unreadable input {}: {e}", blob.document_id))
            })?;
            let text = String::from_utf8(bytes).map_err(|_| {
                Error::Extraction(format!("corrupt input {}: not valid UTF-8", blob.document_id))
            })?;

            let document = extract_document(&blob.document_id, &text);
            debug!(
                document_id = %blob.document_id,
                result_count = document.sections.len(),
                "Extracted document"
            );
            documents.push(document);
        }
        Ok(documents)
    }
}
