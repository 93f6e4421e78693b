pub mod project;
pub mod user;

pub use project::{CreateProjectRequest, NewProject, Project, ProjectResponse};
pub use user::{ProviderProfile, User, UserResponse};
