//! RedactionState: Per-String Redaction Toggle Map
//!
//! Keyed by candidate text, not by span. One flag covers every occurrence
//! of the string, and a user's choice survives re-scans.

use std::collections::HashMap;

use crate::detect::Candidate;

// =============================================================================
// RedactionState
// =============================================================================

/// Redaction toggle map: candidate text -> redact flag
#[derive(Debug, Clone, Default)]
pub struct RedactionState {
    flags: HashMap<String, bool>,
}

impl RedactionState {
    pub fn new() -> Self {
        Self {
            flags: HashMap::new(),
        }
    }

    /// Seed flags for newly discovered candidates.
    ///
    /// First sight of a text defaults to redacted. An existing entry is never
    /// overwritten, and entries whose text is absent from `candidates` are
    /// kept, so a choice survives the candidate briefly disappearing
    /// between scans.
    pub fn reconcile(&mut self, candidates: &[Candidate]) {
        for candidate in candidates {
            self.flags.entry(candidate.text.clone()).or_insert(true);
        }
    }

    /// Flip the flag for one text. An unknown text flips to true.
    pub fn toggle(&mut self, text: &str) {
        let current = self.flags.get(text).copied().unwrap_or(false);
        self.flags.insert(text.to_string(), !current);
    }

    /// Set the flag for one text explicitly.
    pub fn set(&mut self, text: &str, enabled: bool) {
        self.flags.insert(text.to_string(), enabled);
    }

    /// Rebuild the map from exactly the given candidates, all set to
    /// `enabled`. This is the one place stale entries are dropped.
    pub fn set_all(&mut self, candidates: &[Candidate], enabled: bool) {
        let mut flags = HashMap::with_capacity(candidates.len());
        for candidate in candidates {
            flags.insert(candidate.text.clone(), enabled);
        }
        self.flags = flags;
    }

    /// Whether the text is currently marked for redaction.
    /// A text never seeded reports false.
    pub fn is_enabled(&self, text: &str) -> bool {
        self.flags.get(text).copied().unwrap_or(false)
    }

    /// Raw view of the map, for serialization to the host
    pub fn snapshot(&self) -> &HashMap<String, bool> {
        &self.flags
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn clear(&mut self) {
        self.flags.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================
