//! # Response Classification
//!
//! Decides whether a raw wallet response presented a usable identity
//! document. The precedence tolerates multiple wallet protocol generations
//! returning structurally different success shapes; the response is never
//! parsed for business meaning beyond document presence.

use serde_json::Value;

/// Classify a wallet response. Fixed precedence, first match wins:
///
/// 1. absent or null response — no document;
/// 2. a verifiable presentation token (`vp_token`) or generic `data` field —
///    document present;
/// 3. a non-empty legacy `documents` list — document present;
/// 4. an `items` list — document present iff at least one item is not
///    explicitly marked invalid;
/// 5. otherwise a document is present only if the legacy single-document
///    `presentedMdoc` field is set.
///
/// A malformed or empty object always classifies as `false`.
#[must_use]
pub fn classify(response: Option<&Value>) -> bool {
    let Some(response) = response else {
        return false;
    };
    if response.is_null() {
        return false;
    }
    if present(response, "vp_token") || present(response, "data") {
        return true;
    }
    if let Some(documents) = response.get("documents").and_then(Value::as_array) {
        if !documents.is_empty() {
            return true;
        }
    }
    if let Some(items) = response.get("items").and_then(Value::as_array) {
        return items.iter().any(|item| item.get("valid").and_then(Value::as_bool) != Some(false));
    }
    present(response, "presentedMdoc")
}

/// A field counts as carried only when it holds a substantive value:
/// absent fields and the platform's falsy placeholders (null, `false`, empty
/// strings, zero) all fall through.
fn present(response: &Value, field: &str) -> bool {
    match response.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    }
}
