//! Map bracketed citation numbers in an answer back to passages

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::types::{ChunkPayload, Citation};

static CITATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d+)\]").expect("citation pattern is valid"));

/// Distinct citation numbers appearing in `answer`, ascending
pub fn cited_numbers(answer: &str) -> BTreeSet<usize> {
    CITATION_PATTERN
        .captures_iter(answer)
        .filter_map(|cap| cap.get(1))
        // Numbers too large for usize cannot refer to a passage anyway
        .filter_map(|m| m.as_str().parse::<usize>().ok())
        .collect()
}

/// Resolve `[N]` markers against the passages shown to the model.
///
/// `N` is 1-based. Numbers outside `1..=passages.len()` are dropped.
/// The answer text itself is left untouched.
pub fn resolve_citations(answer: &str, passages: &[ChunkPayload]) -> Vec<Citation> {
    cited_numbers(answer)
        .into_iter()
        .filter_map(|n| {
            let passage = n.checked_sub(1).and_then(|i| passages.get(i));
            if passage.is_none() {
                tracing::warn!(
                    citation = n,
                    available = passages.len(),
                    "Dropping citation with no matching source"
                );
            }
            passage.map(|p| Citation {
                citation_num: n,
                source_file: p.source.clone(),
                text: p.text.clone(),
            })
        })
        .collect()
}
