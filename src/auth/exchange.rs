//! Authorization-code handshake with the identity provider.
//!
//! A login moves through four states:
//!
//! - `Idle -> AwaitingCallback`: [`CredentialExchange::begin`] mints a random
//!   state value. The caller remembers it (the `oauth_state` cookie) and sends
//!   the browser to the provider with it.
//! - `AwaitingCallback -> Exchanged`: [`CredentialExchange::complete`] checks
//!   the returned state against the remembered one, trades the code for a
//!   provider token, fetches the profile and resolves the local user.
//! - `-> Failed`: a state mismatch stops the flow before the provider is
//!   contacted. Provider failures stop it before any user row is written.
//!
//! An `Exchanged` user is handed to the session manager for its first token pair.

use std::sync::Arc;

use oauth2::CsrfToken;

use super::provider::IdentityProvider;
use super::AuthError;
use crate::models::User;
use crate::store::SubjectStore;

/// Random bytes behind each state value (256 bits).
const STATE_BYTES: u32 = 32;

/// Where to send the browser, and the state to remember until the callback.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub state: String,
    pub url: String,
}

#[derive(Clone)]
pub struct CredentialExchange {
    provider: Arc<dyn IdentityProvider>,
    subjects: Arc<dyn SubjectStore>,
}

impl CredentialExchange {
    pub fn new(provider: Arc<dyn IdentityProvider>, subjects: Arc<dyn SubjectStore>) -> Self {
        Self { provider, subjects }
    }

    pub fn begin(&self) -> AuthorizationRequest {
        let state = CsrfToken::new_random_len(STATE_BYTES).secret().clone();
        let url = self.provider.authorize_url(&state);
        AuthorizationRequest { state, url }
    }

    /// Fails closed unless both state values are present, non-empty and equal.
    pub fn verify_state(remembered: Option<&str>, presented: Option<&str>) -> Result<(), AuthError> {
        match (remembered, presented) {
            (Some(remembered), Some(presented))
                if !remembered.is_empty() && constant_time_eq(remembered, presented) =>
            {
                Ok(())
            }
            _ => {
                log::warn!("oauth callback rejected: state missing or mismatched");
                Err(AuthError::InvalidState)
            }
        }
    }

    /// Finishes the handshake for a callback.
    ///
    /// `remembered` is the state stored at [`begin`](Self::begin); `presented`
    /// is the one the provider echoed back. Both must be present and equal.
    pub async fn complete(
        &self,
        remembered: Option<&str>,
        presented: Option<&str>,
        code: &str,
    ) -> Result<User, AuthError> {
        Self::verify_state(remembered, presented)?;

        let token = self.provider.exchange_code(code).await.map_err(|e| {
            log::error!("oauth code exchange failed: {}", e);
            AuthError::ProviderUnavailable(e.to_string())
        })?;

        let profile = self.provider.fetch_profile(&token).await.map_err(|e| {
            log::error!("failed to fetch provider profile: {}", e);
            AuthError::ProfileFetchFailed(e.to_string())
        })?;

        let user = self
            .subjects
            .find_or_create_subject_by_provider_id(&profile.provider_subject_id, &profile)
            .await
            .map_err(|e| {
                log::error!("failed to upsert user for provider subject: {}", e);
                AuthError::Internal("failed to create user".into())
            })?;

        log::info!("user {} authenticated via google", user.id);
        Ok(user)
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}
