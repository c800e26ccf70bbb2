//! RedactionSession: unified coordinator for the redaction pipeline
//!
//! # Design Principles
//! 1. One session owns text, candidates, toggles and scan scheduling
//! 2. Pattern scans are synchronous and debounced; contextual scans are a
//!    begin/complete/fail handshake, with the host driving the await
//! 3. Candidate identity is the literal matched string everywhere
//!
//! # Usage
//! ```rust
//! use redactcore::{RedactionSession, SessionConfig};
//!
//! let mut session = RedactionSession::new(SessionConfig::default());
//! session.set_text("Email a.b@test.co");
//! session.scan_now();
//! assert_eq!(session.redacted_text(), "Email [EMAIL]");
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use instant::Instant;
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen;
use wasm_bindgen::prelude::*;

use crate::detect::{merge_candidates, Candidate, Origin, PatternDetector, ScanFailure};
use crate::redact::{partition, redact, Fragment, RedactionState};
use crate::session::config::SessionConfig;
use crate::session::debounce::DebounceScheduler;

/// Separator inserted between existing text and an appended OCR extraction
pub const OCR_SEPARATOR: &str = "\n\n--- OCR Result ---\n";

// =============================================================================
// AI Phase
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AiPhase {
    /// No contextual scan outstanding
    Idle,
    /// Host holds a text snapshot and is awaiting the remote reply
    InFlight,
}

// =============================================================================
// Stats
// =============================================================================

/// Counters surfaced for diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Pattern scans executed
    pub scan_count: u64,
    /// Fired deadlines skipped because the text hash was unchanged
    pub skip_count: u64,
    pub candidate_count: usize,
    /// Source text length in characters
    pub text_length: usize,
    pub ai_in_flight: bool,
}

// =============================================================================
// RedactionSession
// =============================================================================

/// Single coordinator for one document's redaction state.
///
/// All mutation is synchronous; the only async step (the remote scan) lives
/// outside, bracketed by `begin_ai_scan` and `complete_ai_scan`/`fail_ai_scan`.
#[wasm_bindgen]
pub struct RedactionSession {
    config: SessionConfig,
    detector: PatternDetector,
    debounce: DebounceScheduler,
    text: String,
    candidates: Vec<Candidate>,
    state: RedactionState,
    ai_phase: AiPhase,
    last_failure: Option<ScanFailure>,
    /// Hash of the text at the last executed pattern scan
    last_scan_hash: Option<u64>,
    scan_count: u64,
    skip_count: u64,
}

impl Default for RedactionSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl RedactionSession {
    pub fn new(config: SessionConfig) -> Self {
        let detector = PatternDetector::with_rules(config.rules);
        let debounce = DebounceScheduler::from_millis(config.debounce_ms);
        Self {
            config,
            detector,
            debounce,
            text: String::new(),
            candidates: Vec::new(),
            state: RedactionState::new(),
            ai_phase: AiPhase::Idle,
            last_failure: None,
            last_scan_hash: None,
            scan_count: 0,
            skip_count: 0,
        }
    }

    /// Replace the source text and restart the debounce quiet period.
    /// Assigning the identical text is a no-op and does not reschedule.
    pub fn set_text(&mut self, text: &str) {
        self.set_text_at(text, Instant::now());
    }

    pub fn set_text_at(&mut self, text: &str, now: Instant) {
        if text == self.text {
            return;
        }
        self.text = text.to_string();
        self.debounce.schedule_at(now);
    }

    /// Append an OCR extraction to the source text.
    ///
    /// A separator line is inserted unless the text was empty; an empty
    /// chunk is a no-op. Counts as a text change for debounce purposes.
    pub fn append_extracted_text(&mut self, chunk: &str) {
        self.append_extracted_text_at(chunk, Instant::now());
    }

    pub fn append_extracted_text_at(&mut self, chunk: &str, now: Instant) {
        if chunk.is_empty() {
            return;
        }
        let combined = if self.text.is_empty() {
            chunk.to_string()
        } else {
            format!("{}{}{}", self.text, OCR_SEPARATOR, chunk)
        };
        self.set_text_at(&combined, now);
    }

    /// Drive the debounce clock. Returns true when a pattern scan executed.
    ///
    /// A fired deadline whose text hashes the same as the last executed
    /// scan is skipped and counted, not re-scanned.
    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> bool {
        if !self.debounce.fire_at(now) {
            return false;
        }
        if self.last_scan_hash == Some(content_hash(&self.text)) {
            self.skip_count += 1;
            return false;
        }
        self.run_pattern_scan();
        true
    }

    /// Run a pattern scan immediately, bypassing debounce and the
    /// unchanged-text skip. Any pending deadline is cancelled.
    pub fn scan_now(&mut self) {
        self.debounce.cancel();
        self.run_pattern_scan();
    }

    fn run_pattern_scan(&mut self) {
        self.scan_count += 1;
        self.last_scan_hash = Some(content_hash(&self.text));

        if self.text.trim().is_empty() {
            // No text, no candidates. Toggles are kept.
            self.candidates.clear();
            return;
        }

        let found = self.detector.detect(&self.text);
        self.candidates = merge_candidates(&self.candidates, &found, Origin::Pattern);
        self.state.reconcile(&self.candidates);
    }

    /// Open a contextual scan: returns the text snapshot the host should
    /// send to the remote detector, or None when a scan is already in
    /// flight or there is nothing to scan. Clears any previous failure.
    pub fn begin_ai_scan(&mut self) -> Option<String> {
        if self.ai_phase == AiPhase::InFlight || self.text.trim().is_empty() {
            return None;
        }
        self.last_failure = None;
        self.ai_phase = AiPhase::InFlight;
        Some(self.text.clone())
    }

    /// Land contextual results.
    ///
    /// Results for a stale snapshot are still merged; the candidate list is
    /// advisory and the next pattern scan reconciles it against the current
    /// text.
    pub fn complete_ai_scan(&mut self, results: &[Candidate]) {
        self.candidates = merge_candidates(&self.candidates, results, Origin::Contextual);
        self.state.reconcile(&self.candidates);
        self.ai_phase = AiPhase::Idle;
    }

    /// Record a contextual scan failure and return to idle.
    pub fn fail_ai_scan(&mut self, failure: ScanFailure) {
        self.last_failure = Some(failure);
        self.ai_phase = AiPhase::Idle;
    }

    pub fn is_ai_scanning(&self) -> bool {
        self.ai_phase == AiPhase::InFlight
    }

    /// Current AI phase name (for debugging)
    pub fn phase_name(&self) -> &'static str {
        match self.ai_phase {
            AiPhase::Idle => "idle",
            AiPhase::InFlight => "in_flight",
        }
    }

    /// Flip the redaction flag for one candidate text
    pub fn toggle_redaction(&mut self, text: &str) {
        self.state.toggle(text);
    }

    /// Set the redaction flag for one candidate text
    pub fn set_redaction(&mut self, text: &str, enabled: bool) {
        self.state.set(text, enabled);
    }

    /// Set every current candidate to the same flag, dropping stale entries
    pub fn set_all_redaction(&mut self, enabled: bool) {
        self.state.set_all(&self.candidates, enabled);
    }

    /// Source text with every enabled candidate replaced by its placeholder
    pub fn redacted_text(&self) -> String {
        redact(&self.text, &self.candidates, &self.state)
    }

    /// Highlight partition of the source text
    pub fn fragments(&self) -> Vec<Fragment> {
        partition(&self.text, &self.candidates, &self.state)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn source_text(&self) -> &str {
        &self.text
    }

    /// Source text length in characters (not bytes)
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn redaction_state(&self) -> &RedactionState {
        &self.state
    }

    pub fn last_failure(&self) -> Option<&ScanFailure> {
        self.last_failure.as_ref()
    }

    pub fn clear_failure(&mut self) {
        self.last_failure = None;
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            scan_count: self.scan_count,
            skip_count: self.skip_count,
            candidate_count: self.candidates.len(),
            text_length: self.char_count(),
            ai_in_flight: self.is_ai_scanning(),
        }
    }

    /// Reset text, candidates, toggles and any recorded scan failure.
    ///
    /// Counters survive, and so does an in-flight AI phase: its completion
    /// will still land and merge.
    pub fn clear(&mut self) {
        self.text.clear();
        self.candidates.clear();
        self.state.clear();
        self.last_failure = None;
        self.last_scan_hash = None;
        self.debounce.cancel();
    }
}

fn content_hash(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

// =============================================================================
// WASM Bindings
// =============================================================================

#[wasm_bindgen]
impl RedactionSession {
    /// Create a session (JS binding).
    /// Pass null/undefined for the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn js_new(config: JsValue) -> Result<RedactionSession, JsValue> {
        let config = if config.is_null() || config.is_undefined() {
            SessionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?
        };
        Ok(Self::new(config))
    }

    /// Replace the source text (JS binding)
    #[wasm_bindgen(js_name = "setText")]
    pub fn js_set_text(&mut self, text: &str) {
        self.set_text(text);
    }

    /// Append an OCR extraction (JS binding)
    #[wasm_bindgen(js_name = "appendExtractedText")]
    pub fn js_append_extracted_text(&mut self, chunk: &str) {
        self.append_extracted_text(chunk);
    }

    /// Drive the debounce clock (JS binding).
    /// Call from a timer or animation frame; returns true when a scan ran.
    #[wasm_bindgen(js_name = "poll")]
    pub fn js_poll(&mut self) -> bool {
        self.poll()
    }

    /// Force an immediate pattern scan (JS binding)
    #[wasm_bindgen(js_name = "scanNow")]
    pub fn js_scan_now(&mut self) {
        self.scan_now();
    }

    /// Open a contextual scan (JS binding).
    /// Returns the text to send to `detectEntitiesRemote`, or undefined.
    #[wasm_bindgen(js_name = "beginAiScan")]
    pub fn js_begin_ai_scan(&mut self) -> Option<String> {
        self.begin_ai_scan()
    }

    /// Land contextual results (JS binding).
    /// Expects the array resolved by `detectEntitiesRemote`.
    #[wasm_bindgen(js_name = "completeAiScan")]
    pub fn js_complete_ai_scan(&mut self, results: JsValue) -> Result<(), JsValue> {
        let results: Vec<Candidate> = serde_wasm_bindgen::from_value(results)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse results: {}", e)))?;
        self.complete_ai_scan(&results);
        Ok(())
    }

    /// Record a contextual scan failure (JS binding).
    /// Expects the `{kind, message}` object `detectEntitiesRemote` rejected with.
    #[wasm_bindgen(js_name = "failAiScan")]
    pub fn js_fail_ai_scan(&mut self, failure: JsValue) -> Result<(), JsValue> {
        let failure: ScanFailure = serde_wasm_bindgen::from_value(failure)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse failure: {}", e)))?;
        self.fail_ai_scan(failure);
        Ok(())
    }

    /// Check whether a contextual scan is in flight (JS binding)
    #[wasm_bindgen(js_name = "isAiScanning")]
    pub fn js_is_ai_scanning(&self) -> bool {
        self.is_ai_scanning()
    }

    /// Get AI phase name (JS binding)
    #[wasm_bindgen(js_name = "phaseName")]
    pub fn js_phase_name(&self) -> String {
        self.phase_name().to_string()
    }

    /// Toggle redaction for one candidate text (JS binding)
    #[wasm_bindgen(js_name = "toggleRedaction")]
    pub fn js_toggle_redaction(&mut self, text: &str) {
        self.toggle_redaction(text);
    }

    /// Set redaction for one candidate text (JS binding)
    #[wasm_bindgen(js_name = "setRedaction")]
    pub fn js_set_redaction(&mut self, text: &str, enabled: bool) {
        self.set_redaction(text, enabled);
    }

    /// Set redaction for every candidate (JS binding)
    #[wasm_bindgen(js_name = "setAllRedaction")]
    pub fn js_set_all_redaction(&mut self, enabled: bool) {
        self.set_all_redaction(enabled);
    }

    /// Get the redacted output text (JS binding)
    #[wasm_bindgen(js_name = "getRedactedText")]
    pub fn js_redacted_text(&self) -> String {
        self.redacted_text()
    }

    /// Get the highlight partition (JS binding)
    #[wasm_bindgen(js_name = "getFragments")]
    pub fn js_fragments(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.fragments()).unwrap_or(JsValue::NULL)
    }

    /// Get the merged candidate list (JS binding)
    #[wasm_bindgen(js_name = "getCandidates")]
    pub fn js_candidates(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.candidates).unwrap_or(JsValue::NULL)
    }

    /// Get the toggle snapshot (JS binding). Returns a Map of text -> flag.
    #[wasm_bindgen(js_name = "getToggles")]
    pub fn js_toggles(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.state.snapshot()).unwrap_or(JsValue::NULL)
    }

    /// Get the source text (JS binding)
    #[wasm_bindgen(js_name = "getSourceText")]
    pub fn js_source_text(&self) -> String {
        self.text.clone()
    }

    /// Get the source character count (JS binding)
    #[wasm_bindgen(js_name = "getCharCount")]
    pub fn js_char_count(&self) -> usize {
        self.char_count()
    }

    /// Get the last contextual scan failure, or null (JS binding)
    #[wasm_bindgen(js_name = "getLastFailure")]
    pub fn js_last_failure(&self) -> JsValue {
        match &self.last_failure {
            Some(failure) => serde_wasm_bindgen::to_value(failure).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    /// Dismiss the recorded failure (JS binding)
    #[wasm_bindgen(js_name = "clearFailure")]
    pub fn js_clear_failure(&mut self) {
        self.clear_failure();
    }

    /// Get session counters (JS binding)
    #[wasm_bindgen(js_name = "getStats")]
    pub fn js_stats(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.stats()).unwrap_or(JsValue::NULL)
    }

    /// Reset text, candidates and toggles (JS binding)
    #[wasm_bindgen(js_name = "clear")]
    pub fn js_clear(&mut self) {
        self.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================
