//! # Identity Verification Client
//!
//! Client-side orchestration for proving, via a platform-native digital
//! wallet credential exchange, that the user holds a verified government
//! identity document (an ISO 18013-5 mdoc), and reporting the outcome to a
//! backend for session bookkeeping.
//!
//! The crate owns the protocol state machine only: session acquisition or
//! resumption, capability detection, the credential request/response
//! exchange with timeout and cancellation handling, response classification,
//! and best-effort result reporting. Page markup, the backend session store,
//! and the QR image renderer are collaborators reached through the
//! [`provider`] traits.
//!
//! # Design
//!
//! **Flow**
//!
//! [`Flow`] drives one verification attempt per page load: capabilities are
//! resolved once, a session is created or resumed, then either the platform
//! credential API is invoked in-context or a QR hand-off is shown for
//! another device to complete the session out-of-band. Every exchange
//! attempt reports its result exactly once, on success and on failure alike.
//!
//! **Provider**
//!
//! Implementors supply the collaborator seams: [`provider::BackendClient`]
//! for the session store (see [`http::HttpBackend`] for the REST
//! implementation), [`provider::CredentialGateway`] for the platform
//! credential API, and [`provider::StatusListener`] for the UI bridge.

pub mod capability;
pub mod classify;
pub mod error;
pub mod exchange;
pub mod flow;
pub mod http;
pub mod provider;
pub mod report;
pub mod session;

pub use crate::error::Error;
pub use crate::flow::{Flow, Outcome, Status};
pub use crate::session::Session;

/// Result type for identity verification operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
