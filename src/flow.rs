//! # Verification Flow
//!
//! The orchestration state machine for one page load. A flow resolves
//! capabilities once, acquires or resumes a session, runs at most one
//! credential exchange at a time, and reports the terminal result of every
//! exchange attempt exactly once before settling. When wallet launch is not
//! supported the flow parks on the QR hand-off instead.

use std::fmt::{self, Debug};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::capability::Capability;
use crate::classify::classify;
use crate::error::Error;
use crate::provider::{BackendClient, CredentialGateway, StatusListener};
use crate::session::{self, Session};
use crate::{exchange, report, Result};

/// Flow status values, rendered to the user by the UI bridge via `Display`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub enum Status {
    /// Waiting for user activation.
    #[default]
    Idle,

    /// Creating or resuming a session against the backend.
    RequestingSession,

    /// The platform credential call is in flight.
    ExchangingCredential,

    /// Reporting the exchange outcome to the backend.
    Reporting,

    /// Parallel terminal state: the QR hand-off is displayed and the session
    /// completes out-of-band on another device.
    ShowingQr,

    /// The flow has settled.
    Done(Outcome),
}

/// Terminal outcome of an exchange attempt.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum Outcome {
    /// The wallet returned a verified identity document.
    Verified,

    /// The wallet opened but no valid document was shared.
    NoDocument,

    /// The user canceled the request. Deliberately non-alarming.
    Canceled,

    /// The exchange or session acquisition failed, with a reason.
    Failed(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Ready to verify."),
            Self::RequestingSession => write!(f, "Creating secure credential request…"),
            Self::ExchangingCredential => write!(f, "Opening the wallet…"),
            Self::Reporting => write!(f, "Recording the verification result…"),
            Self::ShowingQr => {
                write!(f, "Use your iPhone to scan the QR code and finish in the wallet.")
            }
            Self::Done(outcome) => fmt::Display::fmt(outcome, f),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verified => write!(f, "The wallet returned a verified government ID."),
            Self::NoDocument => write!(f, "The wallet opened but no valid ID was shared."),
            Self::Canceled => write!(f, "The request was canceled by the user."),
            Self::Failed(reason) => write!(f, "Wallet flow failed: {reason}"),
        }
    }
}

/// `Flow` drives one verification attempt per page load, generic over the
/// provider implementing the collaborator seams.
#[derive(Debug)]
pub struct Flow<P>
where
    P: BackendClient + CredentialGateway + StatusListener + Debug,
{
    provider: P,
    id: String,
    capability: Capability,
    status: Status,
    cached: Option<Session>,
}

impl<P> Flow<P>
where
    P: BackendClient + CredentialGateway + StatusListener + Debug,
{
    /// Create a new flow, resolving platform capabilities once.
    pub fn new(provider: P) -> Self {
        let capability = Capability::detect(&provider);
        Self {
            provider,
            id: Uuid::new_v4().to_string(),
            capability,
            status: Status::Idle,
            cached: None,
        }
    }

    /// The current flow status.
    pub const fn status(&self) -> &Status {
        &self.status
    }

    /// The capabilities resolved at construction.
    pub const fn capability(&self) -> &Capability {
        &self.capability
    }

    /// The cached session, if one has been acquired this page load.
    pub const fn session(&self) -> Option<&Session> {
        self.cached.as_ref()
    }

    /// Page-load entry point. With a pre-filled session id and wallet launch
    /// support, resumes the session and continues straight into the exchange
    /// so a same-device continuation after a QR hand-off still completes
    /// in-page. With a pre-filled id but no support, shows the QR for that
    /// id. Otherwise waits for user activation.
    ///
    /// A failed resume is logged and leaves the flow restartable; no result
    /// is reported since no exchange occurred.
    #[instrument(level = "debug", skip(self))]
    pub async fn init(&mut self, prefilled_session: Option<&str>) {
        let Some(session_id) = prefilled_session else {
            return;
        };

        if self.capability.supports_wallet_launch {
            match session::resume_session(&self.provider, session_id).await {
                Ok(session) => {
                    self.cached = Some(session.clone());
                    self.wallet_flow(&session).await;
                }
                Err(e) => tracing::warn!("unable to resume session {session_id}: {e}"),
            }
        } else {
            self.show_qr(session_id);
        }
    }

    /// User activation of the verify control. Replays the cached session
    /// when one exists so repeated clicks never create duplicate sessions;
    /// otherwise creates a session, caches it, and either runs the exchange
    /// or shows the QR hand-off.
    ///
    /// # Errors
    ///
    /// Returns `Error::SessionCreation` if the backend does not return a
    /// session; the flow status is set to the failed terminal state first.
    #[instrument(level = "debug", skip(self))]
    pub async fn activate(&mut self) -> Result<()> {
        if let Some(session) = self.cached.clone() {
            if self.capability.supports_wallet_launch {
                self.wallet_flow(&session).await;
            } else {
                self.show_qr(&session.session_id);
            }
            return Ok(());
        }

        self.transition(Status::RequestingSession);
        let session = match session::create_session(&self.provider).await {
            Ok(session) => session,
            Err(e) => {
                self.transition(Status::Done(Outcome::Failed(e.to_string())));
                return Err(e);
            }
        };
        // the single cache write for this page load
        self.cached = Some(session.clone());

        if self.capability.supports_wallet_launch {
            self.wallet_flow(&session).await;
        } else {
            self.show_qr(&session.session_id);
        }
        Ok(())
    }

    /// Run one credential exchange attempt. Every path, success or failure,
    /// reaches `Reporting` and sends exactly one result report before the
    /// flow settles.
    async fn wallet_flow(&mut self, session: &Session) {
        self.transition(Status::ExchangingCredential);

        let outcome =
            match exchange::request_credential(&self.provider, &self.capability, session).await {
                Ok(response) => {
                    let has_valid_id = classify(Some(&response));
                    self.transition(Status::Reporting);
                    report::report(
                        &self.provider,
                        &session.session_id,
                        has_valid_id,
                        Some(&response),
                    )
                    .await;
                    if has_valid_id {
                        Outcome::Verified
                    } else {
                        Outcome::NoDocument
                    }
                }
                Err(e) => {
                    tracing::debug!("credential exchange failed: {e}");
                    let stub = json!({ "error": e.to_string() });
                    self.transition(Status::Reporting);
                    report::report(&self.provider, &session.session_id, false, Some(&stub)).await;
                    match e {
                        Error::UserCanceled(_) => Outcome::Canceled,
                        other => Outcome::Failed(other.to_string()),
                    }
                }
            };

        self.transition(Status::Done(outcome));
    }

    fn show_qr(&mut self, session_id: &str) {
        let url = qr_url(session_id);
        self.transition(Status::ShowingQr);
        self.provider.show_qr(&self.id, &url);
    }

    fn transition(&mut self, status: Status) {
        tracing::debug!("flow {} -> {:?}", self.id, status);
        self.status = status;
        self.provider.on_status(&self.id, &self.status);
    }
}

/// Cache-busted URL of the QR image for a session. The image itself is
/// rendered by the backend; the client only constructs the URL.
#[must_use]
pub fn qr_url(session_id: &str) -> String {
    format!("/api/idv/session/{session_id}/qr?cacheBust={}", Utc::now().timestamp_millis())
}
