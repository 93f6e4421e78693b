use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    HealthProbe, ProjectStore, RefreshRecord, SessionStore, StoreError, SubjectStore,
};
use crate::models::{NewProject, Project, ProviderProfile, User};

/// In-process store with the same semantics as [`super::PgStore`].
///
/// Used by the test suites and for running the API without a database.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    refresh: HashMap<String, RefreshRecord>,
    projects: Vec<Project>,
    next_user_id: i32,
    next_project_id: i32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    /// Number of refresh records ever created, revoked or not.
    pub fn refresh_record_count(&self) -> usize {
        self.tables().map(|t| t.refresh.len()).unwrap_or(0)
    }

    pub fn user_count(&self) -> usize {
        self.tables().map(|t| t.users.len()).unwrap_or(0)
    }

    /// Snapshot of every refresh record owned by `user_id`.
    pub fn refresh_records_for(&self, user_id: i32) -> Vec<RefreshRecord> {
        self.tables()
            .map(|t| {
                t.refresh
                    .values()
                    .filter(|r| r.user_id == user_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_refresh_record(
        &self,
        user_id: i32,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshRecord, StoreError> {
        let mut tables = self.tables()?;
        if tables.refresh.contains_key(token_hash) {
            return Err(StoreError::Unavailable(
                "duplicate refresh token hash".into(),
            ));
        }
        let record = RefreshRecord {
            id: Uuid::new_v4(),
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        tables
            .refresh
            .insert(token_hash.to_string(), record.clone());
        Ok(record)
    }

    async fn find_refresh_record(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshRecord>, StoreError> {
        Ok(self.tables()?.refresh.get(token_hash).cloned())
    }

    async fn revoke_refresh_record(&self, token_hash: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        match tables.refresh.get_mut(token_hash) {
            Some(record) if record.revoked_at.is_none() => {
                record.revoked_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_subject(&self, user_id: i32) -> Result<u64, StoreError> {
        let mut tables = self.tables()?;
        let now = Utc::now();
        let mut revoked = 0;
        for record in tables.refresh.values_mut() {
            if record.user_id == user_id && record.revoked_at.is_none() {
                record.revoked_at = Some(now);
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn touch_last_used(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if let Some(record) = self.tables()?.refresh.get_mut(token_hash) {
            record.last_used_at = Some(now);
        }
        Ok(())
    }
}

#[async_trait]
impl SubjectStore for MemoryStore {
    async fn find_or_create_subject_by_provider_id(
        &self,
        provider_subject_id: &str,
        profile: &ProviderProfile,
    ) -> Result<User, StoreError> {
        let mut tables = self.tables()?;
        if let Some(user) = tables
            .users
            .iter_mut()
            .find(|u| u.google_id.as_deref() == Some(provider_subject_id))
        {
            user.email = profile.email.clone();
            if profile.picture_url.is_some() {
                user.profile_picture_url = profile.picture_url.clone();
            }
            return Ok(user.clone());
        }

        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            email: profile.email.clone(),
            google_id: Some(provider_subject_id.to_string()),
            profile_picture_url: profile.picture_url.clone(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_subject(&self, user_id: i32) -> Result<Option<User>, StoreError> {
        Ok(self
            .tables()?
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned())
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn create_project(&self, project: NewProject) -> Result<Project, StoreError> {
        let mut tables = self.tables()?;
        tables.next_project_id += 1;
        let project = Project {
            id: tables.next_project_id,
            user_id: project.user_id,
            name: project.name,
            description: project.description,
            color: project.color,
            parent_project_id: project.parent_project_id,
            created_at: Utc::now(),
        };
        tables.projects.push(project.clone());
        Ok(project)
    }

    async fn find_project(&self, project_id: i32) -> Result<Option<Project>, StoreError> {
        Ok(self
            .tables()?
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .cloned())
    }

    async fn list_projects(&self, user_id: i32) -> Result<Vec<Project>, StoreError> {
        Ok(self
            .tables()?
            .projects
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl HealthProbe for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.tables().map(|_| ())
    }
}
