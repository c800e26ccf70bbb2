//! PatternDetector - deterministic PII detection via compiled regex
//!
//! Detects five pattern families in raw text:
//! - EMAIL: local part, `@`, dotted domain labels, TLD of 2+ letters
//! - PHONE: North-American 3+3+4 grouping with optional country/area code
//! - IP_ADDRESS: dotted quads with strict 0-255 octets
//! - CREDIT_CARD: 13-16 digit runs with optional space/hyphen separators
//! - ADDRESS: street number, capitalized words, closed street-suffix list
//!
//! All patterns are compiled once at construction. Rules run in a fixed
//! order and the result set is de-duplicated by matched text, so the first
//! rule in order wins identical-text collisions.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::entity::{Candidate, EntityCategory, Origin};

// ==================== TYPE DEFINITIONS ====================

/// Per-rule enable flags (all default true)
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct RuleSet {
    #[serde(default = "default_true")]
    pub email: bool,
    #[serde(default = "default_true")]
    pub phone: bool,
    #[serde(default = "default_true")]
    pub ip_address: bool,
    #[serde(default = "default_true")]
    pub credit_card: bool,
    #[serde(default = "default_true")]
    pub address: bool,
}

fn default_true() -> bool { true }

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            email: true,
            phone: true,
            ip_address: true,
            credit_card: true,
            address: true,
        }
    }
}

// ==================== MAIN IMPLEMENTATION ====================

/// PatternDetector - fixed-rule PII scanner
///
/// Pure and total: any string is a valid input, empty input yields an empty
/// list, and no rule can fail at scan time.
pub struct PatternDetector {
    rules: RuleSet,
    email_re: Regex,
    phone_re: Regex,
    ip_re: Regex,
    credit_card_re: Regex,
    address_re: Regex,
}

impl PatternDetector {
    /// Create a detector with every rule enabled
    pub fn new() -> Self {
        Self::with_rules(RuleSet::default())
    }

    /// Create a detector with a specific rule set; all patterns are still
    /// compiled up front so toggling rules never recompiles.
    pub fn with_rules(rules: RuleSet) -> Self {
        // Pattern explanations:

        // local part of word chars/./_/%/+/-, @, dotted domain, TLD >= 2 letters
        let email_re = Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap();

        // optional country code, optional (area), space/dot/hyphen separators, 3+3+4
        let phone_re =
            Regex::new(r"(\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap();

        // dotted quad, each octet 0-255 (rejects 256 and up), boundary-anchored
        let ip_re = Regex::new(
            r"\b(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\b",
        )
        .unwrap();

        // 13-16 digits with optional space/hyphen between digits.
        // Deliberately permissive: no Luhn check, so long invoice numbers and
        // similar digit runs are accepted false positives.
        let credit_card_re = Regex::new(r"\b(?:\d[ -]*?){13,16}\b").unwrap();

        // street number, one or more capitalized word tokens, closed suffix list
        let address_re = Regex::new(
            r"\d+\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\s+(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Drive|Dr|Lane|Ln|Way)\b",
        )
        .unwrap();

        Self {
            rules,
            email_re,
            phone_re,
            ip_re,
            credit_card_re,
            address_re,
        }
    }

    /// Scan text with every enabled rule.
    ///
    /// Returns candidates in rule order, then match order within each rule.
    pub fn detect(&self, text: &str) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = Vec::new();

        // Order matters: the first rule to claim a literal string wins, and
        // later identical-text matches (from any rule) are dropped.
        let passes: [(bool, &Regex, EntityCategory); 5] = [
            (self.rules.email, &self.email_re, EntityCategory::Email),
            (self.rules.phone, &self.phone_re, EntityCategory::Phone),
            (self.rules.ip_address, &self.ip_re, EntityCategory::IpAddress),
            (self.rules.credit_card, &self.credit_card_re, EntityCategory::CreditCard),
            (self.rules.address, &self.address_re, EntityCategory::Address),
        ];

        for (enabled, re, category) in passes {
            if !enabled {
                continue;
            }
            for m in re.find_iter(text) {
                let matched = m.as_str();
                if matched.is_empty() {
                    continue;
                }
                // Same literal text shares one identity across the whole set
                if candidates.iter().any(|c| c.text == matched) {
                    continue;
                }
                candidates.push(Candidate::with_rationale(
                    matched,
                    category,
                    Origin::Pattern,
                    format!("Matched {} pattern", category.as_str().to_lowercase()),
                ));
            }
        }

        candidates
    }

    /// Current rule set
    pub fn rules(&self) -> RuleSet {
        self.rules
    }
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== TESTS ====================
