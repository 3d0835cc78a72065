//! # Verification Session
//!
//! A session is created by the backend and referenced, never mutated, by the
//! client. It carries a server-assigned identifier and a protocol-specific
//! request payload whose internal shape is a collaborator contract. The
//! payload is a tagged union discriminated by its explicit `protocol` field,
//! so the exchange branches on the protocol version rather than guessing
//! from field presence.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::error::Error;
use crate::provider::BackendClient;
use crate::Result;

/// A verification session as returned by the backend. Completion is recorded
/// server-side via the reported result; the client holds at most one cached
/// copy per page load.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Server-assigned opaque identifier.
    pub session_id: String,

    /// Continuation URL encoded into the QR image for cross-device hand-off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_content: Option<String>,

    /// Protocol-specific credential request payload. Some backend versions
    /// return this under a `request` key instead.
    #[serde(alias = "request")]
    pub payload: RequestPayload,
}

/// The session's credential request payload, tagged by protocol version.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "protocol")]
pub enum RequestPayload {
    /// Generic protocol/request pair. The request object is produced by the
    /// backend and passed through to the platform opaquely.
    #[serde(rename = "openid4vp")]
    OpenId4Vp {
        /// Opaque request object, owned by the backend.
        request: Value,
    },

    /// Legacy structured mdoc request body.
    #[serde(rename = "mdoc")]
    Mdoc(MdocRequest),
}

impl RequestPayload {
    /// The protocol name carried on the wire.
    #[must_use]
    pub const fn protocol(&self) -> &'static str {
        match self {
            Self::OpenId4Vp { .. } => "openid4vp",
            Self::Mdoc(_) => "mdoc",
        }
    }
}

/// Legacy structured request body for an ISO 18013-5 mobile document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MdocRequest {
    /// Document type requested, e.g. `org.iso.18013.5.1.mDL`.
    pub doc_type: String,

    /// Mediator URL for the wallet exchange.
    pub mediator: String,

    /// Namespaces and data elements requested from the document.
    pub namespaces: Vec<RequestedNamespace>,

    /// Server-generated challenge.
    pub challenge: String,

    /// Relying party identifier.
    pub relying_party_id: String,

    /// Token tying the request back to the session.
    pub session_token: String,
}

/// A requested namespace and the data elements wanted from it.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequestedNamespace {
    /// Namespace identifier, e.g. `org.iso.18013.5.1`.
    pub namespace: String,

    /// Data element identifiers within the namespace.
    pub data_elements: Vec<String>,
}

/// Create a new verification session.
///
/// # Errors
///
/// Returns `Error::SessionCreation` if the backend does not return a usable
/// session.
#[instrument(level = "debug", skip(provider))]
pub async fn create_session(provider: &impl BackendClient) -> Result<Session> {
    provider.create_session().await.map_err(|e| Error::SessionCreation(e.to_string()))
}

/// Fetch an existing session by identifier. Used when the page was loaded
/// with a pre-filled session id, e.g. after returning from a QR hand-off.
///
/// # Errors
///
/// Returns `Error::SessionNotFound` if the backend reports not-found or
/// cannot be reached.
#[instrument(level = "debug", skip(provider))]
pub async fn resume_session(provider: &impl BackendClient, session_id: &str) -> Result<Session> {
    match provider.fetch_session(session_id).await {
        Ok(Some(session)) => Ok(session),
        Ok(None) => Err(Error::SessionNotFound(session_id.to_string())),
        Err(e) => Err(Error::SessionNotFound(format!("{session_id}: {e}"))),
    }
}
