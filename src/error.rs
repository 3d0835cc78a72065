//! # Errors
//!
//! Public error taxonomy for the identity verification flow. Session
//! acquisition failures stop the flow before any exchange occurs; exchange
//! failures are reported to the backend before they surface; reporting
//! failures are logged and swallowed and never appear here.

use thiserror::Error;

/// Identity verification errors.
#[derive(Error, Debug)]
pub enum Error {
    /// The backend did not return a usable session.
    #[error("failed to create verification session: {0}")]
    SessionCreation(String),

    /// The backend does not know the requested session.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// No wallet-capable credential entry point is available on this device.
    #[error("the digital credentials API is not available on this device")]
    UnsupportedPlatform,

    /// The page context is not secure, so the credential API is withheld.
    #[error("the digital credentials API requires a secure context")]
    InsecureContext,

    /// The user dismissed the wallet UI. Carries the platform's message.
    #[error("the request was canceled by the user: {0}")]
    UserCanceled(String),

    /// The platform call neither resolved nor rejected within the bound.
    #[error("timed out waiting for the wallet response")]
    ExchangeTimeout,

    /// The platform call failed for any other reason.
    #[error("wallet exchange failed: {0}")]
    Exchange(String),

    /// The session's request payload could not be turned into a provider
    /// descriptor.
    #[error("invalid session request payload: {0}")]
    InvalidPayload(String),
}
