use crate::{
    auth::AuthContext,
    error::AppError,
    models::{CreateProjectRequest, NewProject, ProjectResponse},
    state::AppState,
};
use actix_web::{web, HttpResponse};
use validator::Validate;

/// Creates a new project owned by the authenticated user.
///
/// ## Request Body:
/// - `name`: 1 to 200 characters.
/// - `description` (optional): up to 1000 characters; blank is stored as null.
/// - `color`: hex color such as `#3b82f6`.
/// - `parent_project_id` (optional): must be one of the caller's projects.
///
/// ## Responses:
/// - `201 Created`: The created project.
/// - `403 Forbidden`: The parent project belongs to another user.
/// - `404 Not Found`: The parent project does not exist.
/// - `422 Unprocessable Entity`: Validation failed.
pub async fn create_project(
    state: web::Data<AppState>,
    auth: AuthContext,
    input: web::Json<CreateProjectRequest>,
) -> Result<HttpResponse, AppError> {
    input.validate()?;
    let input = input.into_inner();

    if let Some(parent_id) = input.parent_project_id {
        let parent = state
            .projects
            .find_project(parent_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Parent project not found".into()))?;
        if parent.user_id != auth.user_id {
            log::warn!(
                "user {} tried to nest a project under project {} of user {}",
                auth.user_id,
                parent.id,
                parent.user_id
            );
            return Err(AppError::Forbidden("Forbidden".into()));
        }
    }

    let project = state
        .projects
        .create_project(NewProject::new(input, auth.user_id))
        .await?;

    Ok(HttpResponse::Created().json(ProjectResponse::from(project)))
}

/// Lists the authenticated user's projects, oldest first.
pub async fn list_projects(
    state: web::Data<AppState>,
    auth: AuthContext,
) -> Result<HttpResponse, AppError> {
    let projects: Vec<ProjectResponse> = state
        .projects
        .list_projects(auth.user_id)
        .await?
        .into_iter()
        .map(ProjectResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(projects))
}
