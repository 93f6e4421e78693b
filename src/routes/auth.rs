use actix_web::{get, http::header, post, web, HttpRequest, HttpResponse, ResponseError};
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::{
        cookies::{ACCESS_COOKIE, REFRESH_COOKIE, STATE_COOKIE},
        AuthContext, AuthError, CredentialExchange, RefreshRequest, TokenResponse,
    },
    error::AppError,
    state::AppState,
};

/// Query string Google appends to the callback redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set instead of `code` when the user denies consent.
    pub error: Option<String>,
}

/// Start Google sign-in
///
/// Remembers a fresh state value in the `oauth_state` cookie and redirects
/// the browser to Google's consent screen.
#[get("/google")]
pub async fn google_login(state: web::Data<AppState>) -> HttpResponse {
    let request = state.exchange.begin();
    HttpResponse::TemporaryRedirect()
        .insert_header((header::LOCATION, request.url))
        .cookie(state.cookies.state(request.state))
        .finish()
}

/// Google sign-in callback
///
/// On success sets the session cookies and redirects to the frontend. The
/// state cookie is cleared on every outcome.
#[get("/google/callback")]
pub async fn google_callback(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<CallbackQuery>,
) -> HttpResponse {
    let mut response = match complete_sign_in(&req, &state, &query).await {
        Ok(response) => response,
        Err(err) => err.error_response(),
    };

    if let Err(e) = response.add_cookie(&state.cookies.removal(STATE_COOKIE)) {
        log::warn!("failed to clear oauth state cookie: {}", e);
    }
    response
}

async fn complete_sign_in(
    req: &HttpRequest,
    state: &AppState,
    query: &CallbackQuery,
) -> Result<HttpResponse, AppError> {
    let remembered = req.cookie(STATE_COOKIE);
    let remembered = remembered.as_ref().map(|c| c.value());
    let presented = query.state.as_deref();

    CredentialExchange::verify_state(remembered, presented)?;

    if let Some(error) = &query.error {
        log::info!("google sign-in was not completed: {}", error);
        return Err(AppError::BadRequest("Authorization was denied".into()));
    }
    let code = query
        .code
        .as_deref()
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".into()))?;

    let user = state.exchange.complete(remembered, presented, code).await?;
    let pair = state.sessions.login(&user).await?;

    Ok(HttpResponse::TemporaryRedirect()
        .insert_header((header::LOCATION, state.frontend_url.as_str()))
        .cookie(state.cookies.access(pair.access_token))
        .cookie(state.cookies.refresh(pair.refresh_token))
        .finish())
}

/// Rotate the session
///
/// Reads the refresh secret from the `refresh_token` cookie, or from a JSON
/// body `{"refresh_token": "..."}` when no cookie is sent. The presented
/// secret is invalidated and a new pair is returned and set as cookies. A
/// dead secret clears both session cookies.
#[post("/refresh")]
pub async fn refresh(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let presented = match req
        .cookie(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
    {
        Some(secret) => secret,
        None => {
            let request: RefreshRequest = if body.is_empty() {
                RefreshRequest::default()
            } else {
                serde_json::from_slice(&body)
                    .map_err(|_| AppError::BadRequest("Invalid request".into()))?
            };
            request
                .refresh_token
                .filter(|secret| !secret.is_empty())
                .ok_or_else(|| AppError::BadRequest("Refresh token required".into()))?
        }
    };

    let pair = match state.sessions.refresh(&presented).await {
        Ok(pair) => pair,
        Err(AuthError::InvalidRefreshToken) => {
            let mut response = AppError::from(AuthError::InvalidRefreshToken).error_response();
            for name in [ACCESS_COOKIE, REFRESH_COOKIE] {
                if let Err(e) = response.add_cookie(&state.cookies.removal(name)) {
                    log::warn!("failed to clear {} cookie: {}", name, e);
                }
            }
            return Ok(response);
        }
        Err(err) => return Err(err.into()),
    };

    Ok(HttpResponse::Ok()
        .cookie(state.cookies.access(pair.access_token.clone()))
        .cookie(state.cookies.refresh(pair.refresh_token.clone()))
        .json(TokenResponse::from(pair)))
}

/// Log out
///
/// Revokes the refresh secret from the cookie, if any, and clears both
/// session cookies. Always succeeds.
#[get("/logout")]
pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Some(cookie) = req.cookie(REFRESH_COOKIE) {
        if !cookie.value().is_empty() {
            state.sessions.logout(cookie.value()).await;
        }
    }

    HttpResponse::Ok()
        .cookie(state.cookies.removal(ACCESS_COOKIE))
        .cookie(state.cookies.removal(REFRESH_COOKIE))
        .json(json!({ "message": "Successfully logged out" }))
}

/// Sign out everywhere
///
/// Revokes every refresh secret of the caller. Mounted behind `AuthMiddleware`.
pub async fn revoke_all(
    state: web::Data<AppState>,
    auth: AuthContext,
) -> Result<HttpResponse, AppError> {
    let revoked = state.sessions.revoke_all(auth.user_id).await?;

    Ok(HttpResponse::Ok()
        .cookie(state.cookies.removal(ACCESS_COOKIE))
        .cookie(state.cookies.removal(REFRESH_COOKIE))
        .json(json!({
            "message": "All tokens revoked successfully",
            "revoked": revoked
        })))
}
