//! RedactCore: PII Detection + Redaction Engine
//!
//! A Rust/WASM implementation of the Redactly text-redaction core.
//!
//! # Architecture
//!
//! ## Detection Components
//! - `entity.rs` - Candidate model: categories, origins, wire format
//! - `patterns.rs` - PatternDetector: regex rules for structured PII
//! - `remote.rs` - RemoteDetector: context-aware classification service client
//! - `merge.rs` - Origin-partitioned candidate merge
//!
//! ## Redaction Components
//! - `state.rs` - RedactionState: per-string redaction toggle map
//! - `rewrite.rs` - TextRewriter: placeholder substitution + highlight partition
//!
//! ## Session Components
//! - `config.rs` - SessionConfig: debounce period and rule flags
//! - `debounce.rs` - DebounceScheduler: quiet-period gate for pattern scans
//! - `conductor.rs` - RedactionSession: unified coordinator
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { RedactionSession, detectEntitiesRemote } from 'redactcore';
//!
//! await init();
//!
//! const session = new RedactionSession(null);
//! session.setText("Hi, I'm Sarah. Email sarah@acme.com");
//!
//! // Drive the debounce clock from a timer
//! setInterval(() => {
//!   if (session.poll()) {
//!     render(session.getFragments(), session.getRedactedText());
//!   }
//! }, 100);
//!
//! // Context-aware pass; the host drives the await
//! const snapshot = session.beginAiScan();
//! if (snapshot !== undefined) {
//!   try {
//!     session.completeAiScan(await detectEntitiesRemote(snapshot, { api_key: KEY }));
//!   } catch (failure) {
//!     session.failAiScan(failure);
//!   }
//! }
//!
//! // Per-string toggling
//! session.toggleRedaction('Sarah');
//! console.log(session.getRedactedText());
//! ```

// Pipeline modules
pub mod detect;
pub mod redact;
pub mod session;

// Public exports - Detection
pub use detect::*;

// Public exports - Redaction
pub use redact::*;

// Public exports - Session
pub use session::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("redactcore v{}", env!("CARGO_PKG_VERSION"))
}
