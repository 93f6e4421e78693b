#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use async_trait::async_trait;
use odot::auth::{IdentityProvider, ProviderError, ProviderToken, TokenCodec};
use odot::models::ProviderProfile;
use odot::routes::{self, health};
use odot::secret::Secret;
use odot::store::MemoryStore;
use odot::{AppState, ServiceMetadata};

pub const FRONTEND_URL: &str = "http://localhost:5173/";
pub const JWT_SECRET: &str = "integration-test-secret";

/// Identity provider that answers from a fixed table of codes.
#[derive(Default)]
pub struct FakeProvider {
    profiles: HashMap<String, ProviderProfile>,
    pub exchanges: AtomicUsize,
}

impl FakeProvider {
    pub fn with_user(mut self, code: &str, google_id: &str, email: &str) -> Self {
        self.profiles.insert(
            code.to_string(),
            ProviderProfile {
                provider_subject_id: google_id.to_string(),
                email: email.to_string(),
                picture_url: Some(format!("https://pics.example.com/{}.png", google_id)),
            },
        );
        self
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn authorize_url(&self, state: &str) -> String {
        format!("https://accounts.example.com/o/oauth2/auth?state={}", state)
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderToken, ProviderError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        if self.profiles.contains_key(code) {
            Ok(ProviderToken(Secret::new(code.to_string())))
        } else {
            Err(ProviderError::Rejected("invalid_grant".into()))
        }
    }

    async fn fetch_profile(&self, token: &ProviderToken) -> Result<ProviderProfile, ProviderError> {
        self.profiles
            .get(token.0.expose())
            .cloned()
            .ok_or_else(|| ProviderError::Rejected("userinfo returned 401".into()))
    }
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub provider: Arc<FakeProvider>,
    pub codec: TokenCodec,
    pub state: AppState,
}

impl TestContext {
    pub fn new(provider: FakeProvider) -> Self {
        let store = Arc::new(MemoryStore::new());
        let provider = Arc::new(provider);
        let codec = TokenCodec::new(&Secret::from(JWT_SECRET));
        let state = AppState::new(
            store.clone(),
            provider.clone(),
            codec.clone(),
            ServiceMetadata::new("test"),
        )
        .with_frontend_url(FRONTEND_URL);
        Self {
            store,
            provider,
            codec,
            state,
        }
    }
}

/// Default fixture: two users known to the provider.
pub fn context() -> TestContext {
    TestContext::new(
        FakeProvider::default()
            .with_user("code-ada", "google-ada", "ada@example.com")
            .with_user("code-grace", "google-grace", "grace@example.com"),
    )
}

pub async fn init_app(
    ctx: &TestContext,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(ctx.state.clone()))
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api").configure(routes::config(ctx.codec.clone()))),
    )
    .await
}

/// Cookies set by a response, by name.
pub fn response_cookies<B>(resp: &ServiceResponse<B>) -> HashMap<String, Cookie<'static>> {
    resp.response()
        .cookies()
        .map(|c| (c.name().to_string(), c.into_owned()))
        .collect()
}

pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

/// Runs the full Google sign-in redirect dance for `code`.
pub async fn sign_in<S, B>(app: &S, code: &str) -> Session
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::get()
        .uri("/api/auth/google")
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::TEMPORARY_REDIRECT);
    let state = response_cookies(&resp)
        .remove("oauth_state")
        .expect("login sets the oauth_state cookie");

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/auth/google/callback?code={}&state={}",
            code,
            state.value()
        ))
        .cookie(state.clone())
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::TEMPORARY_REDIRECT,
        "callback for {} did not redirect",
        code
    );

    let mut cookies = response_cookies(&resp);
    Session {
        access_token: cookies
            .remove("auth_token")
            .expect("callback sets auth_token")
            .value()
            .to_string(),
        refresh_token: cookies
            .remove("refresh_token")
            .expect("callback sets refresh_token")
            .value()
            .to_string(),
    }
}
