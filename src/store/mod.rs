//! Persistence capabilities, one narrow trait per consumer.
//!
//! The session core depends only on [`SessionStore`] and [`SubjectStore`];
//! project handlers on [`ProjectStore`]; health reporting on [`HealthProbe`].
//! [`PgStore`] implements all of them over PostgreSQL and [`MemoryStore`]
//! in process.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewProject, Project, ProviderProfile, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store call `{0}` exceeded its deadline")]
    Timeout(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persisted state of one refresh credential. Holds the hash, never the secret.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct RefreshRecord {
    pub id: Uuid,
    pub user_id: i32,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshRecord {
    /// A record can be redeemed only while unrevoked and unexpired.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_refresh_record(
        &self,
        user_id: i32,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshRecord, StoreError>;

    async fn find_refresh_record(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshRecord>, StoreError>;

    /// Idempotent. Returns `true` only when this call revoked an active record.
    async fn revoke_refresh_record(&self, token_hash: &str) -> Result<bool, StoreError>;

    /// Returns the number of records revoked.
    async fn revoke_all_for_subject(&self, user_id: i32) -> Result<u64, StoreError>;

    async fn touch_last_used(&self, token_hash: &str, now: DateTime<Utc>)
        -> Result<(), StoreError>;
}

#[async_trait]
pub trait SubjectStore: Send + Sync {
    /// Resolves a provider identity to a local user, creating it on first sight.
    async fn find_or_create_subject_by_provider_id(
        &self,
        provider_subject_id: &str,
        profile: &ProviderProfile,
    ) -> Result<User, StoreError>;

    async fn find_subject(&self, user_id: i32) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn create_project(&self, project: NewProject) -> Result<Project, StoreError>;

    async fn find_project(&self, project_id: i32) -> Result<Option<Project>, StoreError>;

    /// Projects owned by `user_id`, oldest first.
    async fn list_projects(&self, user_id: i32) -> Result<Vec<Project>, StoreError>;
}

#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_refresh_record_activity() {
        let now = Utc::now();
        let mut record = RefreshRecord {
            id: Uuid::new_v4(),
            user_id: 1,
            token_hash: "abc".into(),
            expires_at: now + Duration::days(7),
            created_at: now,
            last_used_at: None,
            revoked_at: None,
        };
        assert!(record.is_active(now));

        record.expires_at = now - Duration::seconds(1);
        assert!(!record.is_active(now));

        record.expires_at = now + Duration::days(1);
        record.revoked_at = Some(now);
        assert!(!record.is_active(now));
    }
}
