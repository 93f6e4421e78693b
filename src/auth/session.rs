//! Session lifecycle: issuance, rotate-on-use refresh and revocation of token
//! pairs. Every token pair the service hands out is minted here.

use std::sync::Arc;

use chrono::{Duration, Utc};

use super::hasher::{generate_secret, hash_secret};
use super::token::{TokenCodec, TokenKind};
use super::AuthError;
use crate::models::User;
use crate::store::{SessionStore, SubjectStore};

/// Lifetimes of the two halves of a token pair.
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
        }
    }
}

/// Access credential plus the plaintext refresh secret.
///
/// The plaintext secret exists only in this value; the store keeps its hash.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access credential lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<dyn SessionStore>,
    subjects: Arc<dyn SubjectStore>,
    codec: TokenCodec,
    policy: SessionPolicy,
}

impl SessionManager {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        subjects: Arc<dyn SubjectStore>,
        codec: TokenCodec,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            sessions,
            subjects,
            codec,
            policy,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// Issues the first token pair for a freshly authenticated subject.
    pub async fn login(&self, user: &User) -> Result<TokenPair, AuthError> {
        let pair = self.issue_pair(user).await?;
        log::info!("issued session for user {}", user.id);
        Ok(pair)
    }

    /// Exchanges a refresh secret for a new pair, invalidating the old secret.
    ///
    /// The old record is claimed before its replacement is written, so of two
    /// concurrent refreshes with the same secret at most one succeeds.
    pub async fn refresh(&self, presented: &str) -> Result<TokenPair, AuthError> {
        let old_hash = hash_secret(presented);
        let record = self
            .sessions
            .find_refresh_record(&old_hash)
            .await
            .map_err(|e| {
                log::error!("failed to look up refresh record: {}", e);
                AuthError::Internal("refresh lookup failed".into())
            })?
            .ok_or(AuthError::InvalidRefreshToken)?;

        if !record.is_active(Utc::now()) {
            log::debug!("rejected inactive refresh record {}", record.id);
            return Err(AuthError::InvalidRefreshToken);
        }

        let user = self
            .subjects
            .find_subject(record.user_id)
            .await
            .map_err(|e| {
                log::error!("failed to load user {}: {}", record.user_id, e);
                AuthError::Internal("user lookup failed".into())
            })?
            .ok_or_else(|| {
                log::error!("refresh record {} points at missing user", record.id);
                AuthError::Internal("user not found".into())
            })?;

        match self.sessions.revoke_refresh_record(&old_hash).await {
            Ok(true) => {}
            Ok(false) => {
                log::warn!("refresh record {} was already rotated", record.id);
                return Err(AuthError::InvalidRefreshToken);
            }
            Err(e) => log::error!("failed to revoke refresh record {}: {}", record.id, e),
        }

        let pair = self.issue_pair(&user).await?;

        let new_hash = hash_secret(&pair.refresh_token);
        if let Err(e) = self.sessions.touch_last_used(&new_hash, Utc::now()).await {
            log::warn!("failed to update last-used for user {}: {}", user.id, e);
        }

        log::info!("rotated refresh credential for user {}", user.id);
        Ok(pair)
    }

    /// Revokes the presented secret. Unknown or already revoked secrets are ignored.
    pub async fn logout(&self, presented: &str) {
        match self
            .sessions
            .revoke_refresh_record(&hash_secret(presented))
            .await
        {
            Ok(true) => log::info!("refresh credential revoked on logout"),
            Ok(false) => log::debug!("logout with inactive refresh credential"),
            Err(e) => log::error!("failed to revoke refresh credential on logout: {}", e),
        }
    }

    /// Revokes every refresh credential of `user_id`, returning how many were active.
    pub async fn revoke_all(&self, user_id: i32) -> Result<u64, AuthError> {
        let revoked = self
            .sessions
            .revoke_all_for_subject(user_id)
            .await
            .map_err(|e| {
                log::error!("failed to revoke sessions of user {}: {}", user_id, e);
                AuthError::Internal("revoke all failed".into())
            })?;
        log::info!("revoked {} refresh credentials of user {}", revoked, user_id);
        Ok(revoked)
    }

    async fn issue_pair(&self, user: &User) -> Result<TokenPair, AuthError> {
        let access_token =
            self.codec
                .issue(user.id, &user.email, TokenKind::Access, self.policy.access_ttl)?;

        let refresh_token = generate_secret();
        let expires_at = Utc::now() + self.policy.refresh_ttl;
        self.sessions
            .create_refresh_record(user.id, &hash_secret(&refresh_token), expires_at)
            .await
            .map_err(|e| {
                log::error!("failed to store refresh record for user {}: {}", user.id, e);
                AuthError::Internal("failed to store refresh credential".into())
            })?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.policy.access_ttl.num_seconds(),
        })
    }
}
