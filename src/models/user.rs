use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An authenticated end user, created on first Google sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub email: String,
    /// Subject id assigned by Google.
    pub google_id: Option<String>,
    pub profile_picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Profile attributes reported by the identity provider after a code exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider_subject_id: String,
    pub email: String,
    pub picture_url: Option<String>,
}

/// Body of `GET /api/users/me`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub profile_picture_url: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            profile_picture_url: user.profile_picture_url,
        }
    }
}
