use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use serde::Serialize;
use std::future::{ready, Ready};

use super::token::Claims;
use crate::error::AppError;

/// Identity of the caller, resolved once by `AuthMiddleware`.
///
/// Handlers on protected routes take this as an argument. Extraction fails
/// with 401 when the middleware did not run or found no valid credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    pub user_id: i32,
    pub email: String,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
        }
    }
}

impl FromRequest for AuthContext {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthContext>().cloned() {
            Some(context) => ready(Ok(context)),
            None => {
                let err = AppError::Unauthorized("User not authenticated".to_string());
                ready(Err(err.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_rt::test]
    async fn test_auth_context_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthContext {
            user_id: 123,
            email: "ada@example.com".into(),
        });

        let mut payload = Payload::None;
        let context = AuthContext::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(context.user_id, 123);
        assert_eq!(context.email, "ada@example.com");
    }

    #[actix_rt::test]
    async fn test_auth_context_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let result = AuthContext::from_request(&req, &mut payload).await;
        assert!(result.is_err());

        let response = result.unwrap_err().error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
