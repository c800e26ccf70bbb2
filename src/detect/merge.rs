//! Candidate-list merge between detector passes.
//!
//! Both scan paths rebuild the merged list through the same rule, so the
//! result is independent of which detector happened to finish last.

use super::entity::{Candidate, Origin};

/// Merge one detector's fresh results into the current candidate list.
///
/// Keeps every `previous` candidate whose origin differs from `new_origin`
/// (in their original relative order), then appends `new_results` in
/// detection order, dropping any item whose `text` the kept set already
/// contains. The other origin therefore wins text ties: a contextual
/// "Sarah" survives a later pattern pass, and vice versa.
pub fn merge_candidates(
    previous: &[Candidate],
    new_results: &[Candidate],
    new_origin: Origin,
) -> Vec<Candidate> {
    let mut merged: Vec<Candidate> = previous
        .iter()
        .filter(|c| c.origin != new_origin)
        .cloned()
        .collect();

    for candidate in new_results {
        if merged.iter().any(|kept| kept.text == candidate.text) {
            continue;
        }
        merged.push(candidate.clone());
    }

    merged
}

// ==================== TESTS ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::entity::EntityCategory;

    fn pattern(text: &str, category: EntityCategory) -> Candidate {
        Candidate::new(text, category, Origin::Pattern)
    }

    fn contextual(text: &str, category: EntityCategory) -> Candidate {
        Candidate::new(text, category, Origin::Contextual)
    }

    #[test]
    fn test_merge_into_empty() {
        let fresh = vec![pattern("a@b.co", EntityCategory::Email)];
        let merged = merge_candidates(&[], &fresh, Origin::Pattern);

        assert_eq!(merged, fresh);
    }

    #[test]
    fn test_pattern_pass_keeps_contextual() {
        let previous = vec![
            contextual("Sarah", EntityCategory::Name),
            pattern("old@co.com", EntityCategory::Email),
        ];
        let fresh = vec![pattern("new@co.com", EntityCategory::Email)];

        let merged = merge_candidates(&previous, &fresh, Origin::Pattern);

        // Old pattern results are replaced wholesale; contextual survives
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text, "Sarah");
        assert_eq!(merged[1].text, "new@co.com");
    }

    #[test]
    fn test_contextual_pass_keeps_pattern() {
        let previous = vec![
            pattern("a@b.co", EntityCategory::Email),
            contextual("Old Name", EntityCategory::Name),
        ];
        let fresh = vec![contextual("New Name", EntityCategory::Name)];

        let merged = merge_candidates(&previous, &fresh, Origin::Contextual);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text, "a@b.co");
        assert_eq!(merged[1].text, "New Name");
    }

    #[test]
    fn test_text_collision_kept_origin_wins() {
        // The AI also flagged the email; a later pattern pass must not
        // duplicate it or clobber the contextual entry.
        let previous = vec![contextual("a@b.co", EntityCategory::Email)];
        let fresh = vec![pattern("a@b.co", EntityCategory::Email)];

        let merged = merge_candidates(&previous, &fresh, Origin::Pattern);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].origin, Origin::Contextual);
    }

    #[test]
    fn test_order_kept_then_new() {
        let previous = vec![
            contextual("Alpha", EntityCategory::Name),
            contextual("Beta", EntityCategory::Name),
        ];
        let fresh = vec![
            pattern("g@h.io", EntityCategory::Email),
            pattern("555-123-4567", EntityCategory::Phone),
        ];

        let merged = merge_candidates(&previous, &fresh, Origin::Pattern);

        let texts: Vec<&str> = merged.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Alpha", "Beta", "g@h.io", "555-123-4567"]);
    }

    #[test]
    fn test_merge_idempotent_on_repeat() {
        let previous = vec![pattern("a@b.co", EntityCategory::Email)];
        let fresh = vec![
            contextual("Sarah", EntityCategory::Name),
            contextual("Acme Corp", EntityCategory::Other),
        ];

        let once = merge_candidates(&previous, &fresh, Origin::Contextual);
        let twice = merge_candidates(&once, &fresh, Origin::Contextual);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_duplicate_texts_within_new_results_collapse() {
        let fresh = vec![
            contextual("Sarah", EntityCategory::Name),
            contextual("Sarah", EntityCategory::Other),
        ];

        let merged = merge_candidates(&[], &fresh, Origin::Contextual);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].category, EntityCategory::Name);
    }

    #[test]
    fn test_empty_new_results_drops_own_origin() {
        // A re-scan of emptied text clears that origin's candidates
        let previous = vec![
            pattern("a@b.co", EntityCategory::Email),
            contextual("Sarah", EntityCategory::Name),
        ];

        let merged = merge_candidates(&previous, &[], Origin::Pattern);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "Sarah");
    }
}
