use crate::{auth::AuthContext, error::AppError, models::UserResponse, state::AppState};
use actix_web::{web, HttpResponse};

/// Current user
///
/// Returns the profile of the authenticated caller.
///
/// ## Responses:
/// - `200 OK`: `{id, email, profile_picture_url}`.
/// - `401 Unauthorized`: No valid access credential.
/// - `404 Not Found`: The credential refers to a user that no longer exists.
pub async fn me(
    state: web::Data<AppState>,
    auth: AuthContext,
) -> Result<HttpResponse, AppError> {
    let user = state
        .subjects
        .find_subject(auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
