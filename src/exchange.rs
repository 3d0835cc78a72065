//! # Credential Exchange
//!
//! Builds a provider descriptor from the session's request payload and
//! invokes the platform credential API through the resolved entry point,
//! bounded by a timeout. The descriptor carries the protocol name and body
//! exactly as supplied by the backend; the exchange is plumbing, not schema
//! validation.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::capability::{Capability, EntryPoint};
use crate::error::Error;
use crate::provider::{CredentialGateway, GatewayError};
use crate::session::{RequestPayload, Session};
use crate::Result;

/// Bound on the wallet exchange. On expiry the in-flight platform call is
/// cancelled by dropping its future.
pub const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(120);

/// A single credential provider entry: protocol name plus the opaque,
/// protocol-specific request body. Built fresh per attempt, never persisted.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ProviderDescriptor {
    /// Protocol name, e.g. `openid4vp` or `mdoc`.
    pub protocol: String,

    /// Opaque request body, passed through from the session payload.
    pub request: Value,
}

/// The `digital` member of a platform credential request.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DigitalOptions {
    /// Credential providers the platform may satisfy the request with.
    pub providers: Vec<ProviderDescriptor>,
}

/// Request shape accepted by the dedicated identity entry point.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct IdentityGetRequest {
    /// Digital credential options.
    pub digital: DigitalOptions,
}

/// Request shape accepted by the identity extension of the general
/// credential entry point: the same options nested under an `identity` key.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CredentialsGetRequest {
    /// The nested identity request.
    pub identity: IdentityGetRequest,
}

/// Build the provider descriptor for a session payload. The generic
/// protocol/request pair passes its request object through verbatim; the
/// legacy variant serializes its structured body as the request.
///
/// # Errors
///
/// Returns `Error::InvalidPayload` if the payload body cannot be serialized.
pub fn descriptor(payload: &RequestPayload) -> Result<ProviderDescriptor> {
    let request = match payload {
        RequestPayload::OpenId4Vp { request } => request.clone(),
        RequestPayload::Mdoc(body) => {
            serde_json::to_value(body).map_err(|e| Error::InvalidPayload(e.to_string()))?
        }
    };
    Ok(ProviderDescriptor { protocol: payload.protocol().to_string(), request })
}

/// Request an identity document from the platform wallet. Exactly one entry
/// point is invoked per attempt, the dedicated one taking precedence.
///
/// # Errors
///
/// Returns `Error::UnsupportedPlatform` when wallet launch is not supported
/// or no entry point is present, `Error::InsecureContext` when the entry
/// points are missing because the page context is insecure,
/// `Error::UserCanceled` when the user dismissed the wallet UI,
/// `Error::ExchangeTimeout` when the platform call does not settle within
/// [`EXCHANGE_TIMEOUT`], and `Error::Exchange` for any other platform
/// failure.
#[instrument(level = "debug", skip(provider, capability, session), fields(session_id = %session.session_id))]
pub async fn request_credential(
    provider: &impl CredentialGateway, capability: &Capability, session: &Session,
) -> Result<Value> {
    if !capability.supports_wallet_launch {
        return Err(Error::UnsupportedPlatform);
    }

    let descriptor = descriptor(&session.payload)?;
    let request = IdentityGetRequest { digital: DigitalOptions { providers: vec![descriptor] } };

    let response = match capability.entry_point {
        EntryPoint::IdentityGet => {
            tokio::time::timeout(EXCHANGE_TIMEOUT, provider.identity_get(&request)).await
        }
        EntryPoint::CredentialsGet => {
            let nested = CredentialsGetRequest { identity: request };
            tokio::time::timeout(EXCHANGE_TIMEOUT, provider.credentials_get(&nested)).await
        }
        EntryPoint::Unsupported if !capability.secure_context => {
            return Err(Error::InsecureContext);
        }
        EntryPoint::Unsupported => return Err(Error::UnsupportedPlatform),
    };

    match response {
        Ok(Ok(wallet_response)) => Ok(wallet_response),
        Ok(Err(GatewayError::Canceled(message))) => Err(Error::UserCanceled(message)),
        Ok(Err(GatewayError::Failed(e))) => Err(Error::Exchange(e.to_string())),
        Err(_) => Err(Error::ExchangeTimeout),
    }
}
