//! # Capability Detection
//!
//! Inspects the device and browser signals once at startup to decide whether
//! an in-context wallet credential request can be attempted or the flow must
//! fall back to a QR hand-off. Detection is a pure function of the user-agent
//! string and the presence of the platform credential entry points; absence
//! of support is a valid outcome, never an error.

use crate::provider::CredentialGateway;

/// The platform credential entry point resolved for this page load.
///
/// Two competing API shapes exist in the wild: a dedicated identity request
/// function and an identity extension to the general credential request
/// function. Exactly one is selected, once, with the dedicated entry point
/// taking precedence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EntryPoint {
    /// Dedicated identity request entry point (`navigator.identity.get`).
    IdentityGet,

    /// Identity extension of the general credential request entry point
    /// (`navigator.credentials.get`).
    CredentialsGet,

    /// Neither entry point is present.
    #[default]
    Unsupported,
}

/// Device and platform capabilities, resolved once at page load and read by
/// the orchestration flow thereafter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Capability {
    /// Launching the wallet UI in-page is preferable to showing a QR code.
    /// True only on iPhone: a QR code is useless when the scanning device is
    /// the displaying device.
    pub supports_wallet_launch: bool,

    /// The browser is Safari proper, not an embedded or third-party engine.
    pub is_safari: bool,

    /// The credential entry point to invoke, if any.
    pub entry_point: EntryPoint,

    /// The page is served from a secure context.
    pub secure_context: bool,
}

impl Capability {
    /// Resolve capabilities from the gateway's signals. Called once when the
    /// flow is constructed.
    #[must_use]
    pub fn detect(gateway: &impl CredentialGateway) -> Self {
        Self::from_signals(
            &gateway.user_agent(),
            gateway.has_identity_get(),
            gateway.has_credentials_get(),
            gateway.is_secure_context(),
        )
    }

    /// Resolve capabilities from raw signals.
    #[must_use]
    pub fn from_signals(
        user_agent: &str, has_identity_get: bool, has_credentials_get: bool, secure_context: bool,
    ) -> Self {
        let entry_point = if has_identity_get {
            EntryPoint::IdentityGet
        } else if has_credentials_get {
            EntryPoint::CredentialsGet
        } else {
            EntryPoint::Unsupported
        };

        // Default to the wallet flow on iPhone so we don't show a QR code to
        // scan with the same device. If the entry points turn out to be
        // missing the exchange fails with a descriptive error instead.
        Self {
            supports_wallet_launch: is_iphone(user_agent),
            is_safari: is_safari(user_agent),
            entry_point,
            secure_context,
        }
    }
}

fn is_iphone(user_agent: &str) -> bool {
    user_agent.to_ascii_lowercase().contains("iphone")
}

fn is_safari(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    ua.contains("safari")
        && !ua.contains("crios")
        && !ua.contains("fxios")
        && !ua.contains("edgios")
}
