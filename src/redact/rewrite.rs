//! TextRewriter: placeholder substitution and highlight partition
//!
//! Two views over one source text:
//! - `redact` produces the outgoing text: longest candidate first, each
//!   pass a global literal replacement over the previous pass's output
//! - `partition` splits the original text into plain and entity fragments
//!   whose concatenation is exactly the source

use serde::{Deserialize, Serialize};

use super::state::RedactionState;
use crate::detect::Candidate;

// ==================== TYPE DEFINITIONS ====================

/// One piece of the highlight partition.
///
/// `candidate` is set for entity fragments and absent for plain text
/// between them. `start`/`end` are byte offsets into the source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fragment {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate: Option<Candidate>,
    pub start: usize,
    pub end: usize,
    /// Toggle state at partition time; always false for plain fragments
    pub active: bool,
}

impl Fragment {
    fn plain(text: &str, start: usize) -> Self {
        Self {
            text: text.to_string(),
            candidate: None,
            start,
            end: start + text.len(),
            active: false,
        }
    }
}

// ==================== REWRITE ORDER ====================

/// Candidates in replacement order: longest text first.
///
/// The sort is stable, so equal-length candidates keep their detection
/// order. Replacing "John Smith" before "John" keeps the shorter candidate
/// from splitting the longer one's occurrences.
pub fn rewrite_order(candidates: &[Candidate]) -> Vec<&Candidate> {
    let mut order: Vec<&Candidate> = candidates.iter().collect();
    order.sort_by(|a, b| b.text.len().cmp(&a.text.len()));
    order
}

// ==================== REDACTION ====================

/// Produce the redacted text.
///
/// Each enabled candidate is replaced globally and literally by its
/// category placeholder. Passes run sequentially over the previous pass's
/// output, so a shorter candidate never matches inside text a longer one
/// already consumed. Disabled and empty-text candidates are skipped.
pub fn redact(text: &str, candidates: &[Candidate], state: &RedactionState) -> String {
    let mut result = text.to_string();

    for candidate in rewrite_order(candidates) {
        if candidate.text.is_empty() || !state.is_enabled(&candidate.text) {
            continue;
        }
        result = result.replace(candidate.text.as_str(), candidate.category.placeholder());
    }

    result
}

// ==================== HIGHLIGHT PARTITION ====================

/// Split the source text into plain and entity fragments.
///
/// Each candidate, longest text first, splits the remaining plain fragments
/// at its literal occurrences; annotated fragments are never re-split. This
/// is the same consumption order as `redact`, so both views resolve
/// overlapping candidates identically. Entity fragments are emitted
/// regardless of toggle state, with `active` carrying the toggle, so the
/// host can render switched-off entities as still selectable.
///
/// The fragment texts concatenate to exactly the source text.
pub fn partition(text: &str, candidates: &[Candidate], state: &RedactionState) -> Vec<Fragment> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut fragments = vec![Fragment::plain(text, 0)];

    for candidate in rewrite_order(candidates) {
        if candidate.text.is_empty() {
            continue;
        }
        let mut split: Vec<Fragment> = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            if fragment.candidate.is_some() {
                split.push(fragment);
                continue;
            }
            split_plain(&fragment, candidate, state, &mut split);
        }
        fragments = split;
    }

    fragments
}

/// Split one plain fragment on every occurrence of `candidate.text`,
/// emitting alternating plain and entity pieces. Empty plain pieces between
/// adjacent occurrences are dropped.
fn split_plain(
    fragment: &Fragment,
    candidate: &Candidate,
    state: &RedactionState,
    out: &mut Vec<Fragment>,
) {
    let mut rel = 0;
    while let Some(found) = fragment.text[rel..].find(candidate.text.as_str()) {
        let at = rel + found;
        if at > rel {
            out.push(Fragment::plain(
                &fragment.text[rel..at],
                fragment.start + rel,
            ));
        }
        out.push(Fragment {
            text: candidate.text.clone(),
            candidate: Some(candidate.clone()),
            start: fragment.start + at,
            end: fragment.start + at + candidate.text.len(),
            active: state.is_enabled(&candidate.text),
        });
        rel = at + candidate.text.len();
    }
    if rel < fragment.text.len() {
        out.push(Fragment::plain(
            &fragment.text[rel..],
            fragment.start + rel,
        ));
    }
}

// ==================== TESTS ====================
