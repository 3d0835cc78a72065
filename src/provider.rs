//! # Providers
//!
//! The provider traits inject the collaborator-owned surfaces the flow talks
//! to: the backend session store, the platform credential API, and the UI
//! bridge. The traits keep the flow transport-agnostic; see [`crate::http`]
//! for a concrete backend client.

use std::future::Future;

use serde_json::Value;
use thiserror::Error;

use crate::exchange::{CredentialsGetRequest, IdentityGetRequest};
use crate::flow::Status;
use crate::report::ResultRequest;
use crate::session::Session;

/// Backend session store operations. If an error is returned from session
/// acquisition the flow stops; reporting errors are swallowed by the caller.
pub trait BackendClient: Send + Sync {
    /// Create a new verification session.
    fn create_session(&self) -> impl Future<Output = anyhow::Result<Session>> + Send;

    /// Fetch an existing session. `None` means the backend reported
    /// not-found.
    fn fetch_session(
        &self, session_id: &str,
    ) -> impl Future<Output = anyhow::Result<Option<Session>>> + Send;

    /// Record the terminal result of an exchange attempt.
    fn report_result(
        &self, session_id: &str, result: &ResultRequest,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Failure modes of a platform credential call. User cancellation is
/// distinguishable from other failures so the flow can show a non-alarming
/// status for it.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The user dismissed the wallet UI. Carries the platform's message.
    #[error("{0}")]
    Canceled(String),

    /// Any other platform failure.
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

/// Platform credential API boundary. Static signals feed capability
/// detection once at startup; the invocation methods mirror the two accepted
/// request shapes. The returned wallet response is opaque to the flow.
pub trait CredentialGateway: Send + Sync {
    /// The browser's user-agent string.
    fn user_agent(&self) -> String;

    /// Whether the page is served from a secure context.
    fn is_secure_context(&self) -> bool;

    /// Whether the dedicated identity entry point is present.
    fn has_identity_get(&self) -> bool;

    /// Whether the identity extension of the general credential entry point
    /// is present.
    fn has_credentials_get(&self) -> bool;

    /// Invoke the dedicated identity entry point. Dropping the returned
    /// future cancels the in-flight platform call.
    fn identity_get(
        &self, request: &IdentityGetRequest,
    ) -> impl Future<Output = Result<Value, GatewayError>> + Send;

    /// Invoke the identity extension of the general credential entry point.
    /// Dropping the returned future cancels the in-flight platform call.
    fn credentials_get(
        &self, request: &CredentialsGetRequest,
    ) -> impl Future<Output = Result<Value, GatewayError>> + Send;
}

/// UI bridge signals. The listener translates flow state into user-visible
/// status text and dialog state; the flow never blocks on it.
pub trait StatusListener: Send + Sync {
    /// Notify the listener of a status change.
    fn on_status(&self, flow_id: &str, status: &Status);

    /// Ask the listener to display the QR hand-off image at the given URL.
    fn show_qr(&self, flow_id: &str, qr_url: &str);
}
