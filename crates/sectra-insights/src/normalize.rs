//! Text normalization for generator responses.
//!
//! Generators return loosely formatted prose: bulleted lists, numbered
//! lines, stray blank lines. This module reduces a raw response to a
//! bounded list of usable items. It is a pure function, unit-testable
//! independent of any generator call.

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading bullet/number markers stripped from each line: dashes, bullets,
/// asterisks, digits with dots or closing parens, and surrounding spaces.
static BULLET_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-•*\d.)\s]+").expect("static regex must compile"));

/// Parse a raw generator response into a bounded list of items.
///
/// Lines are trimmed, dropped when the trimmed line is not longer than
/// `min_len`, then stripped of leading bullet/number markers. The length
/// check runs on the raw line, before stripping, so a short item behind a
/// marker (`"1. Go fast."`) is still kept. Lines that strip to nothing are
/// dropped; the result is truncated to `max_items`.
pub fn parse_generated_list(response: &str, min_len: usize, max_items: usize) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| line.len() > min_len)
        .map(|line| BULLET_PREFIX.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .take(max_items)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_bullets_and_numbers() {
        let response = "- First insight about the content\n\
                        2. Second insight about structure\n\
                        • Third insight about terminology";
        let items = parse_generated_list(response, 10, 5);
        assert_eq!(
            items,
            vec![
                "First insight about the content",
                "Second insight about structure",
                "Third insight about terminology",
            ]
        );
    }

    #[test]
    fn test_parse_drops_short_lines() {
        let response = "ok\n- A sufficiently long insight line\nshort";
        let items = parse_generated_list(response, 10, 5);
        assert_eq!(items, vec!["A sufficiently long insight line"]);
    }

    #[test]
    fn test_parse_drops_lines_empty_after_stripping() {
        let response = "------------\n1.\n- A sufficiently long insight line";
        let items = parse_generated_list(response, 10, 5);
        assert_eq!(items, vec!["A sufficiently long insight line"]);
    }

    #[test]
    fn test_min_length_applies_to_raw_line_before_stripping() {
        // The raw line clears the minimum; the marker does not count
        // against the item once stripped.
        let items = parse_generated_list("1. Go fast.", 10, 5);
        assert_eq!(items, vec!["Go fast."]);

        // Still too short even with the marker included.
        assert!(parse_generated_list("1. Go.", 10, 5).is_empty());
    }

    #[test]
    fn test_parse_truncates_to_max_items() {
        let response = (0..10)
            .map(|i| format!("- Generated insight number {i} with detail"))
            .collect::<Vec<_>>()
            .join("\n");
        let items = parse_generated_list(&response, 10, 3);
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_parse_empty_response() {
        assert!(parse_generated_list("", 10, 5).is_empty());
        assert!(parse_generated_list("\n\n  \n", 10, 5).is_empty());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let response = "   - An insight padded with whitespace   ";
        let items = parse_generated_list(response, 10, 5);
        assert_eq!(items, vec!["An insight padded with whitespace"]);
    }

    #[test]
    fn test_parse_keeps_inner_punctuation() {
        let response = "- Models improve by 40% (on average), per the text";
        let items = parse_generated_list(response, 10, 5);
        assert_eq!(items, vec!["Models improve by 40% (on average), per the text"]);
    }
}
