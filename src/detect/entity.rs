//! Entity model shared by both detectors and the redaction pipeline.
//!
//! A `Candidate` is a span of text believed to be personally identifying,
//! keyed by its literal matched string. Two occurrences of the same literal
//! string share one identity; the toggle map and the merge step both rely
//! on this.

use serde::{Deserialize, Serialize};

// ==================== TYPE DEFINITIONS ====================

/// Category of a detected candidate
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityCategory {
    Name,
    Email,
    Phone,
    Address,
    IpAddress,
    CreditCard,
    Other,
}

impl EntityCategory {
    /// All categories, in the order the remote schema advertises them
    pub const ALL: [EntityCategory; 7] = [
        EntityCategory::Name,
        EntityCategory::Email,
        EntityCategory::Phone,
        EntityCategory::Address,
        EntityCategory::IpAddress,
        EntityCategory::CreditCard,
        EntityCategory::Other,
    ];

    /// Wire name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCategory::Name => "NAME",
            EntityCategory::Email => "EMAIL",
            EntityCategory::Phone => "PHONE",
            EntityCategory::Address => "ADDRESS",
            EntityCategory::IpAddress => "IP_ADDRESS",
            EntityCategory::CreditCard => "CREDIT_CARD",
            EntityCategory::Other => "OTHER",
        }
    }

    /// Token substituted for redacted spans of this category
    pub fn placeholder(&self) -> &'static str {
        match self {
            EntityCategory::Name => "[NAME]",
            EntityCategory::Email => "[EMAIL]",
            EntityCategory::Phone => "[PHONE]",
            EntityCategory::Address => "[ADDRESS]",
            EntityCategory::IpAddress => "[IP_ADDRESS]",
            EntityCategory::CreditCard => "[CREDIT_CARD]",
            EntityCategory::Other => "[OTHER]",
        }
    }
}

/// Which detector produced a candidate
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Origin {
    /// Deterministic regex rules
    Pattern,
    /// External context-aware classification
    Contextual,
}

/// A detected span of (potentially) personally identifying text
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Exact matched substring; the candidate's identity
    pub text: String,
    pub category: EntityCategory,
    pub origin: Origin,
    /// Diagnostic explanation, no behavioral effect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl Candidate {
    pub fn new(text: impl Into<String>, category: EntityCategory, origin: Origin) -> Self {
        Self {
            text: text.into(),
            category,
            origin,
            rationale: None,
        }
    }

    pub fn with_rationale(
        text: impl Into<String>,
        category: EntityCategory,
        origin: Origin,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            category,
            origin,
            rationale: Some(rationale.into()),
        }
    }
}

// ==================== TESTS ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        let json = serde_json::to_string(&EntityCategory::IpAddress).unwrap();
        assert_eq!(json, "\"IP_ADDRESS\"");

        let parsed: EntityCategory = serde_json::from_str("\"CREDIT_CARD\"").unwrap();
        assert_eq!(parsed, EntityCategory::CreditCard);
    }

    #[test]
    fn test_category_rejects_unknown_wire_name() {
        let parsed: Result<EntityCategory, _> = serde_json::from_str("\"SSN\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_placeholder_matches_wire_name() {
        for category in EntityCategory::ALL {
            assert_eq!(category.placeholder(), format!("[{}]", category.as_str()));
        }
    }

    #[test]
    fn test_origin_wire_names() {
        assert_eq!(serde_json::to_string(&Origin::Pattern).unwrap(), "\"PATTERN\"");
        assert_eq!(
            serde_json::to_string(&Origin::Contextual).unwrap(),
            "\"CONTEXTUAL\""
        );
    }

    #[test]
    fn test_candidate_roundtrip() {
        let candidate = Candidate::with_rationale(
            "sarah@co.com",
            EntityCategory::Email,
            Origin::Pattern,
            "Matched email pattern",
        );
        let json = serde_json::to_string(&candidate).unwrap();
        let back: Candidate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, candidate);
    }

    #[test]
    fn test_candidate_rationale_optional_on_wire() {
        let json = r#"{"text": "Sarah", "category": "NAME", "origin": "CONTEXTUAL"}"#;
        let candidate: Candidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.text, "Sarah");
        assert!(candidate.rationale.is_none());
    }
}
