//! Extraction helpers for `generateContent` responses.
//!
//! ```text
//! { "candidates": [ { "content": { "parts": [
//!     { "text": "…" }                                   ← text models
//!     { "inlineData": { "mimeType": "…", "data": "…" } } ← speech models
//! ] } } ] }
//! ```

use serde_json::Value;

fn first_candidate_parts(response: &Value) -> impl Iterator<Item = &Value> {
    response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

/// Text of the first text part of the first candidate.
pub fn candidate_text(response: &Value) -> Option<&str> {
    first_candidate_parts(response).find_map(|part| part.get("text")?.as_str())
}

/// Base64 payload of the first inline-data part of the first candidate.
///
/// Empty payloads count as absent.
pub fn candidate_audio(response: &Value) -> Option<&str> {
    first_candidate_parts(response)
        .find_map(|part| part.pointer("/inlineData/data")?.as_str())
        .filter(|data| !data.is_empty())
}
