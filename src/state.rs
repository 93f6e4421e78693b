use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::auth::{
    CookiePolicy, CredentialExchange, IdentityProvider, SessionManager, SessionPolicy, TokenCodec,
};
use crate::store::{HealthProbe, ProjectStore, SessionStore, SubjectStore};

pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173/";

/// Build and runtime facts reported by `/health`.
#[derive(Debug, Clone)]
pub struct ServiceMetadata {
    pub version: String,
    pub environment: String,
    pub started_at: DateTime<Utc>,
}

impl ServiceMetadata {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: environment.into(),
            started_at: Utc::now(),
        }
    }

    pub fn uptime(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }
}

/// Everything the handlers share, wrapped once in `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionManager,
    pub exchange: CredentialExchange,
    pub subjects: Arc<dyn SubjectStore>,
    pub projects: Arc<dyn ProjectStore>,
    pub health: Arc<dyn HealthProbe>,
    pub cookies: CookiePolicy,
    /// Where the browser lands after a successful Google sign-in.
    pub frontend_url: String,
    pub metadata: ServiceMetadata,
}

impl AppState {
    /// Wires every capability to the same backing store.
    pub fn new<S>(
        store: Arc<S>,
        provider: Arc<dyn IdentityProvider>,
        codec: TokenCodec,
        metadata: ServiceMetadata,
    ) -> Self
    where
        S: SessionStore + SubjectStore + ProjectStore + HealthProbe + 'static,
    {
        let policy = SessionPolicy::default();
        Self {
            sessions: SessionManager::new(store.clone(), store.clone(), codec, policy),
            exchange: CredentialExchange::new(provider, store.clone()),
            subjects: store.clone(),
            projects: store.clone(),
            health: store,
            cookies: CookiePolicy::new(true, policy),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            metadata,
        }
    }

    pub fn with_frontend_url(mut self, url: impl Into<String>) -> Self {
        self.frontend_url = url.into();
        self
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.cookies = CookiePolicy::new(secure, self.sessions.policy());
        self
    }
}
