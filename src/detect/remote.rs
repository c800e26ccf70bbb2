//! RemoteDetector - context-aware PII classification via a remote model
//!
//! Submits the full input text to a Gemini-style `generateContent` endpoint
//! with a strict response schema, then parses the reply tolerantly:
//! - the JSON array may arrive bare, fenced, or wrapped in prose: the
//!   first well-formed array substring is extracted before parsing
//! - malformed individual items are dropped, never the whole batch
//! - transport, status, quota and shape failures map to typed errors
//!
//! The call is idempotent and never retried here; retry is the user
//! re-triggering the scan.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use super::entity::{Candidate, EntityCategory, Origin};

// ==================== TYPE DEFINITIONS ====================

/// Remote classification endpoint configuration
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RemoteConfig {
    /// API key supplied by the host; sent as a request header, never stored
    /// anywhere else
    pub api_key: String,
    /// Model identifier appended to the endpoint path
    #[serde(default = "default_model")]
    pub model: String,
    /// Endpoint base URL, up to and excluding the model segment
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

/// Failure modes of a remote scan
#[derive(Debug, Error)]
pub enum RemoteScanError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// 401/402/403/429; surfaced distinctly so the host can route the user
    /// to an account/credit flow instead of a generic error
    #[error("quota or authorization rejected (HTTP {0})")]
    Quota(u16),
    #[error("service returned HTTP {0}")]
    Status(u16),
    #[error("reply contained no parseable JSON array")]
    MalformedReply,
    #[error("service reply was empty")]
    EmptyReply,
}

/// Coarse failure classification for the UI
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScanFailureKind {
    Network,
    Quota,
    Malformed,
}

/// Serializable failure record held by the session and shown inline
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScanFailure {
    pub kind: ScanFailureKind,
    pub message: String,
}

impl From<&RemoteScanError> for ScanFailure {
    fn from(err: &RemoteScanError) -> Self {
        let kind = match err {
            RemoteScanError::Network(_) | RemoteScanError::Status(_) => ScanFailureKind::Network,
            RemoteScanError::Quota(_) => ScanFailureKind::Quota,
            RemoteScanError::MalformedReply | RemoteScanError::EmptyReply => {
                ScanFailureKind::Malformed
            }
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// One item of the schema-constrained reply array.
/// Deserialization failure of a single item drops that item only.
#[derive(Deserialize)]
struct ReplyItem {
    text: Option<String>,
    category: Option<EntityCategory>,
    #[serde(default)]
    rationale: Option<String>,
}

// generateContent reply envelope: candidates[0].content.parts[*].text
#[derive(Deserialize)]
struct GenerateReply {
    #[serde(default)]
    candidates: Vec<ReplyCandidate>,
}

#[derive(Deserialize)]
struct ReplyCandidate {
    #[serde(default)]
    content: ReplyContent,
}

#[derive(Deserialize, Default)]
struct ReplyContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: String,
}

// ==================== REQUEST / REPLY HELPERS ====================

/// Build the generateContent request body: task prompt plus a response
/// schema restricted to the closed category enumeration.
pub fn build_request_body(text: &str) -> serde_json::Value {
    let prompt = format!(
        "Identify all sensitive information in the following text that should be redacted for privacy.\n\
         You MUST return a JSON array of objects. Each object must have \"text\" (the exact string from the source) and \"category\" (one of the allowed categories).\n\
         \n\
         Look for:\n\
         - Full Names (NAME)\n\
         - Email Addresses (EMAIL)\n\
         - Phone Numbers (PHONE)\n\
         - Physical Addresses (ADDRESS)\n\
         - IP Addresses (IP_ADDRESS)\n\
         - Credit Card Numbers or Financial IDs (CREDIT_CARD)\n\
         - Any other personally identifiable information (OTHER)\n\
         \n\
         Text to analyze:\n\
         \"\"\"\n\
         {}\n\
         \"\"\"",
        text
    );

    let categories: Vec<&str> = EntityCategory::ALL.iter().map(|c| c.as_str()).collect();

    serde_json::json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "text": {
                            "type": "STRING",
                            "description": "The exact text found in the source that is sensitive.",
                        },
                        "category": {
                            "type": "STRING",
                            "enum": categories,
                            "description": "The category of the sensitive information.",
                        },
                        "rationale": {
                            "type": "STRING",
                            "description": "Brief reason why this was flagged.",
                        },
                    },
                    "required": ["text", "category"],
                },
            },
        },
    })
}

/// Extract the first well-formed JSON array substring.
///
/// Tolerates markdown fences and surrounding prose: every `[` is tried as a
/// start, brackets are matched with string/escape awareness, and the slice
/// must actually parse as an array before it is accepted.
pub fn extract_json_array(raw: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(open_rel) = raw[search_from..].find('[') {
        let open = search_from + open_rel;
        if let Some(close) = find_matching_bracket(raw, open) {
            let slice = &raw[open..=close];
            if serde_json::from_str::<serde_json::Value>(slice)
                .map(|v| v.is_array())
                .unwrap_or(false)
            {
                return Some(slice);
            }
        }
        search_from = open + 1;
    }
    None
}

/// Byte index of the `]` matching the `[` at `open`, skipping brackets
/// inside JSON strings.
fn find_matching_bracket(raw: &str, open: usize) -> Option<usize> {
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in raw[open..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a raw model reply into candidates.
///
/// Items missing `text`, with empty `text`, or with a category outside the
/// enumeration are dropped individually. Duplicate texts collapse to the
/// first item, keeping the one-candidate-per-literal-string invariant.
pub fn parse_reply(raw: &str) -> Result<Vec<Candidate>, RemoteScanError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RemoteScanError::EmptyReply);
    }

    let array = extract_json_array(trimmed).ok_or(RemoteScanError::MalformedReply)?;
    let values: Vec<serde_json::Value> =
        serde_json::from_str(array).map_err(|_| RemoteScanError::MalformedReply)?;

    let mut candidates: Vec<Candidate> = Vec::with_capacity(values.len());
    for value in values {
        let item: ReplyItem = match serde_json::from_value(value) {
            Ok(item) => item,
            Err(_) => continue,
        };
        let text = match item.text {
            Some(text) if !text.is_empty() => text,
            _ => continue,
        };
        let category = match item.category {
            Some(category) => category,
            None => continue,
        };
        if candidates.iter().any(|c| c.text == text) {
            continue;
        }
        candidates.push(Candidate {
            text,
            category,
            origin: Origin::Contextual,
            rationale: item.rationale,
        });
    }

    Ok(candidates)
}

// ==================== MAIN IMPLEMENTATION ====================

/// RemoteDetector - async boundary to the classification service
pub struct RemoteDetector {
    config: RemoteConfig,
    client: reqwest::Client,
}

impl RemoteDetector {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Run one classification round trip.
    ///
    /// Empty or whitespace-only text short-circuits to an empty result
    /// without touching the network.
    pub async fn detect(&self, text: &str) -> Result<Vec<Candidate>, RemoteScanError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&build_request_body(text))
            .send()
            .await?;

        let status = response.status().as_u16();
        if matches!(status, 401 | 402 | 403 | 429) {
            return Err(RemoteScanError::Quota(status));
        }
        if !(200..300).contains(&status) {
            return Err(RemoteScanError::Status(status));
        }

        let body = response.text().await?;
        let reply: GenerateReply =
            serde_json::from_str(&body).map_err(|_| RemoteScanError::MalformedReply)?;

        let raw_text: String = match reply.candidates.first() {
            Some(candidate) => candidate
                .content
                .parts
                .iter()
                .map(|p| p.text.as_str())
                .collect(),
            None => return Err(RemoteScanError::EmptyReply),
        };

        parse_reply(&raw_text)
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }
}

// ==================== WASM BINDINGS ====================

/// Context-aware scan (JS binding).
///
/// Returns a Promise resolving to an array of candidates, rejecting with a
/// `{kind, message}` object the host can hand straight to
/// `RedactionSession.failAiScan`.
#[wasm_bindgen(js_name = "detectEntitiesRemote")]
pub fn js_detect_entities_remote(text: String, config: JsValue) -> js_sys::Promise {
    future_to_promise(async move {
        let config: RemoteConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;

        let detector = RemoteDetector::new(config);
        match detector.detect(&text).await {
            Ok(candidates) => serde_wasm_bindgen::to_value(&candidates)
                .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e))),
            Err(err) => {
                web_sys::console::error_1(&format!("[RemoteDetector] scan failed: {}", err).into());
                let failure = ScanFailure::from(&err);
                Err(serde_wasm_bindgen::to_value(&failure)
                    .unwrap_or_else(|_| JsValue::from_str(&failure.message)))
            }
        }
    })
}

// ==================== TESTS ====================
