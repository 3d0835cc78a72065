//! # Result Reporting
//!
//! Best-effort, fire-and-forget reporting of an exchange attempt's outcome
//! to the backend. The raw wallet payload is sanitized through an explicit
//! deep-copy-or-fallback before it is forwarded; a reporting failure is
//! logged and swallowed so it can never alter a status the user has already
//! been shown.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;

use crate::provider::BackendClient;

/// Outcome of sanitizing a wallet payload for transport.
#[derive(Clone, Debug, PartialEq)]
pub enum Sanitized {
    /// A JSON-safe deep copy of the original payload.
    Copied(Value),

    /// The payload could not be serialized; a fixed stub stands in.
    Fallback(Value),
}

impl Sanitized {
    /// The JSON value to put on the wire, whichever way sanitization went.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Copied(value) | Self::Fallback(value) => value,
        }
    }
}

/// Deep-copy a payload through a JSON round-trip, stripping anything that is
/// not JSON-safe. If the round-trip itself fails the result is a fixed error
/// stub rather than an error. Idempotent: sanitizing an already-sanitized
/// value yields an identical structure.
pub fn sanitize<T: Serialize>(payload: &T) -> Sanitized {
    match serde_json::to_value(payload) {
        Ok(value) => Sanitized::Copied(value),
        Err(_) => Sanitized::Fallback(json!({ "error": "Unable to serialize wallet payload" })),
    }
}

/// Wire type for the result report.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultRequest {
    /// Whether a valid identity document was presented.
    pub has_valid_id: bool,

    /// Sanitized wallet response, or `null` when there was none.
    pub wallet_response: Option<Value>,
}

/// Report the outcome of an exchange attempt. Sent at most once per attempt
/// by the flow; any failure here is logged and swallowed.
#[instrument(level = "debug", skip(provider, payload))]
pub async fn report(
    provider: &impl BackendClient, session_id: &str, has_valid_id: bool, payload: Option<&Value>,
) {
    let wallet_response = payload.map(|p| sanitize(p).into_value());
    let request = ResultRequest { has_valid_id, wallet_response };

    if let Err(e) = provider.report_result(session_id, &request).await {
        tracing::warn!("unable to report result for session {session_id}: {e}");
    }
}
