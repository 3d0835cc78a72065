//! In-memory provider implementing every collaborator seam, recording the
//! signals the flow emits so tests can assert on them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use anyhow::anyhow;
use serde_json::{json, Value};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use idv_client::exchange::{CredentialsGetRequest, IdentityGetRequest};
use idv_client::provider::{BackendClient, CredentialGateway, GatewayError, StatusListener};
use idv_client::report::ResultRequest;
use idv_client::session::{RequestPayload, Session};
use idv_client::Status;

// initialise tracing once for all tests
static INIT: Once = Once::new();

/// Initialise tracing for tests. Quiet by default; raise the level locally
/// when debugging a scenario.
///
/// # Panics
///
/// Panics if the tracing subscriber cannot be set.
pub fn init_tracer() {
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::ERROR).finish();
        tracing::subscriber::set_global_default(subscriber).expect("subscriber set");
    });
}

pub const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) \
    AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1";
pub const DESKTOP_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15";

/// How the mock platform answers a credential request.
#[derive(Clone, Debug)]
pub enum WalletBehavior {
    /// Resolve with the given wallet response.
    Respond(Value),
    /// Reject as canceled by the user, with the platform's message.
    Cancel(String),
    /// Reject with a generic platform failure.
    Fail(String),
    /// Never settle.
    Hang,
}

#[derive(Clone, Debug)]
pub struct TestProvider {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    user_agent: String,
    identity_get: bool,
    credentials_get: bool,
    secure_context: bool,
    wallet: Mutex<WalletBehavior>,
    create_fails: Mutex<bool>,
    report_fails: Mutex<bool>,
    sessions: Mutex<HashMap<String, Session>>,
    created: Mutex<u32>,
    invocations: Mutex<Vec<Value>>,
    reports: Mutex<Vec<(String, ResultRequest)>>,
    statuses: Mutex<Vec<Status>>,
    qr_urls: Mutex<Vec<String>>,
}

impl TestProvider {
    pub fn new(
        user_agent: &str, identity_get: bool, credentials_get: bool, secure_context: bool,
    ) -> Self {
        init_tracer();
        Self {
            inner: Arc::new(Inner {
                user_agent: user_agent.to_string(),
                identity_get,
                credentials_get,
                secure_context,
                wallet: Mutex::new(WalletBehavior::Respond(
                    json!({ "documents": [{ "docType": "org.iso.18013.5.1.mDL" }] }),
                )),
                create_fails: Mutex::new(false),
                report_fails: Mutex::new(false),
                sessions: Mutex::new(HashMap::new()),
                created: Mutex::new(0),
                invocations: Mutex::new(Vec::new()),
                reports: Mutex::new(Vec::new()),
                statuses: Mutex::new(Vec::new()),
                qr_urls: Mutex::new(Vec::new()),
            }),
        }
    }

    /// A wallet-capable iPhone with both entry points in a secure context.
    pub fn iphone() -> Self {
        Self::new(IPHONE_UA, true, true, true)
    }

    /// A desktop browser: no wallet launch, QR fallback expected.
    pub fn desktop() -> Self {
        Self::new(DESKTOP_UA, false, false, true)
    }

    pub fn set_wallet(&self, behavior: WalletBehavior) {
        *self.inner.wallet.lock().expect("lock") = behavior;
    }

    pub fn fail_session_creation(&self) {
        *self.inner.create_fails.lock().expect("lock") = true;
    }

    pub fn fail_reporting(&self) {
        *self.inner.report_fails.lock().expect("lock") = true;
    }

    /// Seed a resumable session, as if created in an earlier page load.
    pub fn seed_session(&self, session: Session) {
        self.inner.sessions.lock().expect("lock").insert(session.session_id.clone(), session);
    }

    pub fn created_count(&self) -> u32 {
        *self.inner.created.lock().expect("lock")
    }

    /// Requests the mock platform has seen, serialized to JSON.
    pub fn invocations(&self) -> Vec<Value> {
        self.inner.invocations.lock().expect("lock").clone()
    }

    pub fn reports(&self) -> Vec<(String, ResultRequest)> {
        self.inner.reports.lock().expect("lock").clone()
    }

    pub fn statuses(&self) -> Vec<Status> {
        self.inner.statuses.lock().expect("lock").clone()
    }

    pub fn qr_urls(&self) -> Vec<String> {
        self.inner.qr_urls.lock().expect("lock").clone()
    }

    async fn invoke(&self, request: Value) -> Result<Value, GatewayError> {
        self.inner.invocations.lock().expect("lock").push(request);
        let behavior = self.inner.wallet.lock().expect("lock").clone();
        match behavior {
            WalletBehavior::Respond(value) => Ok(value),
            WalletBehavior::Cancel(message) => Err(GatewayError::Canceled(message)),
            WalletBehavior::Fail(message) => Err(GatewayError::Failed(anyhow!(message))),
            WalletBehavior::Hang => std::future::pending().await,
        }
    }
}

pub fn sample_session(session_id: &str) -> Session {
    Session {
        session_id: session_id.to_string(),
        qr_content: Some(format!("https://rp.example.com/?session={session_id}")),
        payload: RequestPayload::OpenId4Vp {
            request: json!({ "client_id": "verifier", "nonce": "n-0S6_WzA2Mj" }),
        },
    }
}

impl BackendClient for TestProvider {
    async fn create_session(&self) -> anyhow::Result<Session> {
        if *self.inner.create_fails.lock().expect("lock") {
            return Err(anyhow!("backend unavailable"));
        }
        let mut created = self.inner.created.lock().expect("lock");
        *created += 1;
        let session = sample_session(&format!("session-{created}"));
        drop(created);
        self.seed_session(session.clone());
        Ok(session)
    }

    async fn fetch_session(&self, session_id: &str) -> anyhow::Result<Option<Session>> {
        Ok(self.inner.sessions.lock().expect("lock").get(session_id).cloned())
    }

    async fn report_result(&self, session_id: &str, result: &ResultRequest) -> anyhow::Result<()> {
        if *self.inner.report_fails.lock().expect("lock") {
            return Err(anyhow!("report endpoint unavailable"));
        }
        self.inner.reports.lock().expect("lock").push((session_id.to_string(), result.clone()));
        Ok(())
    }
}

impl CredentialGateway for TestProvider {
    fn user_agent(&self) -> String {
        self.inner.user_agent.clone()
    }

    fn is_secure_context(&self) -> bool {
        self.inner.secure_context
    }

    fn has_identity_get(&self) -> bool {
        self.inner.identity_get
    }

    fn has_credentials_get(&self) -> bool {
        self.inner.credentials_get
    }

    async fn identity_get(&self, request: &IdentityGetRequest) -> Result<Value, GatewayError> {
        let request = serde_json::to_value(request).expect("should serialize");
        self.invoke(request).await
    }

    async fn credentials_get(
        &self, request: &CredentialsGetRequest,
    ) -> Result<Value, GatewayError> {
        let request = serde_json::to_value(request).expect("should serialize");
        self.invoke(request).await
    }
}

impl StatusListener for TestProvider {
    fn on_status(&self, _flow_id: &str, status: &Status) {
        self.inner.statuses.lock().expect("lock").push(status.clone());
    }

    fn show_qr(&self, _flow_id: &str, qr_url: &str) {
        self.inner.qr_urls.lock().expect("lock").push(qr_url.to_string());
    }
}
