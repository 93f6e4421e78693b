use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

lazy_static! {
    // Hex color as sent by the project dialog, e.g. "#3b82f6"
    static ref COLOR_REGEX: regex::Regex = regex::Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
}

/// Represents a project entity as stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Project {
    pub id: i32,
    /// Identifier of the user who owns the project.
    pub user_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    /// Optional parent; always owned by the same user.
    pub parent_project_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Input structure for creating a project.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(regex(path = "COLOR_REGEX", message = "Color must be a hex value like #aabbcc"))]
    pub color: String,

    pub parent_project_id: Option<i32>,
}

/// Values the store needs to insert a project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub user_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub parent_project_id: Option<i32>,
}

impl NewProject {
    /// Empty descriptions are stored as `NULL`.
    pub fn new(input: CreateProjectRequest, user_id: i32) -> Self {
        Self {
            user_id,
            name: input.name,
            description: input.description.filter(|d| !d.trim().is_empty()),
            color: input.color,
            parent_project_id: input.parent_project_id,
        }
    }
}

/// A project as returned by the API.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub parent_project_id: Option<i32>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            color: project.color,
            parent_project_id: project.parent_project_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, color: &str) -> CreateProjectRequest {
        CreateProjectRequest {
            name: name.to_string(),
            description: Some("Groceries and errands".to_string()),
            color: color.to_string(),
            parent_project_id: None,
        }
    }

    #[test]
    fn test_project_validation() {
        assert!(request("Home", "#3b82f6").validate().is_ok());
        assert!(request("", "#3b82f6").validate().is_err());
        assert!(request(&"a".repeat(201), "#3b82f6").validate().is_err());
        assert!(request("Home", "blue").validate().is_err());
        assert!(request("Home", "#3b82f").validate().is_err());

        let mut long_description = request("Home", "#000000");
        long_description.description = Some("b".repeat(1001));
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn test_new_project_drops_blank_description() {
        let mut input = request("Work", "#ffffff");
        input.description = Some("   ".to_string());
        let new_project = NewProject::new(input, 5);
        assert_eq!(new_project.user_id, 5);
        assert!(new_project.description.is_none());
    }
}
