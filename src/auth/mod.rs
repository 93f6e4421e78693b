pub mod cookies;
pub mod exchange;
pub mod extractors;
pub mod hasher;
pub mod middleware;
pub mod provider;
pub mod session;
pub mod token;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cookies::CookiePolicy;
pub use exchange::{AuthorizationRequest, CredentialExchange};
pub use extractors::AuthContext;
pub use hasher::{generate_secret, hash_secret};
pub use middleware::AuthMiddleware;
pub use provider::{GoogleProvider, IdentityProvider, ProviderError, ProviderToken};
pub use session::{SessionManager, SessionPolicy, TokenPair};
pub use token::{Claims, TokenCodec, TokenError, TokenKind};

/// Failures of the authentication and session core.
///
/// Messages never include secret values; callers map these onto HTTP
/// responses through `AppError`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("oauth state is missing or does not match")]
    InvalidState,
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("failed to fetch provider profile: {0}")]
    ProfileFetchFailed(String),
    #[error("refresh credential is unknown, revoked or expired")]
    InvalidRefreshToken,
    #[error("credential has expired")]
    Expired,
    #[error("credential rejected")]
    Unauthorized,
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TokenError> for AuthError {
    fn from(error: TokenError) -> AuthError {
        match error {
            TokenError::Expired => AuthError::Expired,
            TokenError::Signing(msg) => AuthError::Internal(msg),
            TokenError::InvalidSignature
            | TokenError::MalformedPayload(_)
            | TokenError::WrongKind { .. } => AuthError::Unauthorized,
        }
    }
}

/// Body of `POST /api/auth/refresh` when the secret is not sent as a cookie.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Token pair as returned by `POST /api/auth/refresh`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Always `"Bearer"`.
    pub token_type: String,
    /// Access credential lifetime in seconds.
    pub expires_in: i64,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: pair.expires_in,
        }
    }
}
