//! Third-party identity provider seam and its Google implementation.

use std::time::Duration;

use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl,
};
use serde::Deserialize;
use thiserror::Error;

use crate::config::GoogleConfig;
use crate::models::ProviderProfile;
use crate::secret::Secret;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const GOOGLE_SCOPES: [&str; 3] = ["openid", "profile", "email"];

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid provider configuration: {0}")]
    Config(String),
    #[error("provider request failed: {0}")]
    Transport(String),
    #[error("provider rejected the request: {0}")]
    Rejected(String),
    #[error("provider response could not be parsed: {0}")]
    InvalidResponse(String),
    #[error("provider did not answer within {0:?}")]
    Timeout(Duration),
}

/// Access token issued by the provider for one code exchange.
#[derive(Debug)]
pub struct ProviderToken(pub Secret<String>);

/// Operations the credential exchange needs from an OAuth2 identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is redirected to, carrying `state` through the round trip.
    fn authorize_url(&self, state: &str) -> String;

    async fn exchange_code(&self, code: &str) -> Result<ProviderToken, ProviderError>;

    async fn fetch_profile(&self, token: &ProviderToken) -> Result<ProviderProfile, ProviderError>;
}

/// Google OAuth2 authorization-code client.
pub struct GoogleProvider {
    oauth: BasicClient,
    http: reqwest::Client,
    timeout: Duration,
}

/// Fields read from Google's v2 userinfo endpoint.
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    id: String,
    email: String,
    #[serde(default)]
    picture: Option<String>,
}

impl GoogleProvider {
    pub fn new(config: &GoogleConfig, timeout: Duration) -> Result<Self, ProviderError> {
        let auth_url = AuthUrl::new(GOOGLE_AUTH_URL.to_string())
            .map_err(|e| ProviderError::Config(e.to_string()))?;
        let token_url = TokenUrl::new(GOOGLE_TOKEN_URL.to_string())
            .map_err(|e| ProviderError::Config(e.to_string()))?;
        let redirect_url = RedirectUrl::new(config.redirect_uri.clone())
            .map_err(|e| ProviderError::Config(format!("GOOGLE_REDIRECT_URI: {}", e)))?;

        let oauth = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.expose().clone())),
            auth_url,
            Some(token_url),
        )
        .set_redirect_uri(redirect_url);

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Config(e.to_string()))?;

        Ok(Self {
            oauth,
            http,
            timeout,
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn authorize_url(&self, state: &str) -> String {
        let state = state.to_string();
        let (url, _) = self
            .oauth
            .authorize_url(move || CsrfToken::new(state))
            .add_scopes(GOOGLE_SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .add_extra_param("access_type", "offline")
            .url();
        url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderToken, ProviderError> {
        let request = self
            .oauth
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client);

        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))?
            .map_err(|e| match e {
                oauth2::RequestTokenError::ServerResponse(body) => {
                    ProviderError::Rejected(body.error().to_string())
                }
                oauth2::RequestTokenError::Parse(e, _) => {
                    ProviderError::InvalidResponse(e.to_string())
                }
                other => ProviderError::Transport(other.to_string()),
            })?;

        Ok(ProviderToken(Secret::new(
            response.access_token().secret().clone(),
        )))
    }

    async fn fetch_profile(&self, token: &ProviderToken) -> Result<ProviderProfile, ProviderError> {
        let response = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(token.0.expose())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout)
                } else {
                    ProviderError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::Rejected(format!(
                "userinfo returned {}",
                response.status()
            )));
        }

        let info: GoogleUserInfo = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(info.into())
    }
}

impl From<GoogleUserInfo> for ProviderProfile {
    fn from(info: GoogleUserInfo) -> Self {
        Self {
            provider_subject_id: info.id,
            email: info.email,
            picture_url: info.picture.filter(|p| !p.is_empty()),
        }
    }
}
