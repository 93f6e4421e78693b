use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use super::cookies::ACCESS_COOKIE;
use super::extractors::AuthContext;
use super::token::{TokenCodec, TokenKind};
use super::AuthError;
use crate::error::AppError;

/// Verifies the access credential and stores an [`AuthContext`] in the
/// request extensions.
///
/// The credential is read from `Authorization: Bearer <token>` (scheme is
/// case-insensitive), falling back to the `auth_token` cookie. A missing or
/// invalid credential is answered with 401.
#[derive(Clone)]
pub struct AuthMiddleware {
    codec: TokenCodec,
}

impl AuthMiddleware {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            codec: self.codec.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    codec: TokenCodec,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = extract_token(&req);

        let result = match token {
            Some(token) => self
                .codec
                .verify(&token, TokenKind::Access)
                .map(AuthContext::from)
                .map_err(|e| {
                    log::debug!("access token rejected on {}: {}", req.path(), e);
                    AppError::from(AuthError::from(e))
                }),
            None => Err(AppError::Unauthorized(
                "Authorization token required".into(),
            )),
        };

        match result {
            Ok(context) => {
                req.extensions_mut().insert(context);
            }
            Err(app_err) => {
                let (request, _) = req.into_parts();
                let response = app_err.error_response().map_into_right_body();
                return Box::pin(async move { Ok(ServiceResponse::new(request, response)) });
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

fn extract_token(req: &ServiceRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim().to_string())
        .filter(|token| !token.is_empty());

    from_header.or_else(|| {
        req.cookie(ACCESS_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    })
}
