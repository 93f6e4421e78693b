pub mod auth;
pub mod health;
pub mod projects;
pub mod users;

use actix_cors::Cors;
use actix_web::{http::header, web};

use crate::auth::{AuthMiddleware, TokenCodec};

/// Browser access from the frontend origin, with credentials, limited to the
/// methods the API mounts.
pub fn cors(allowed_origin: &str) -> Cors {
    Cors::default()
        .allowed_origin(allowed_origin)
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .supports_credentials()
        .max_age(3600)
}

/// Registers the `/api` routes. Every route outside `/auth` requires an
/// access credential; under `/auth` only `/revoke-all` does.
pub fn config(codec: TokenCodec) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(
            web::scope("/auth")
                .service(auth::google_login)
                .service(auth::google_callback)
                .service(auth::refresh)
                .service(auth::logout)
                .service(
                    web::resource("/revoke-all")
                        .wrap(AuthMiddleware::new(codec.clone()))
                        .route(web::post().to(auth::revoke_all)),
                ),
        )
        .service(
            web::scope("/users")
                .wrap(AuthMiddleware::new(codec.clone()))
                .route("/me", web::get().to(users::me)),
        )
        .service(
            web::scope("/projects")
                .wrap(AuthMiddleware::new(codec))
                .route("", web::post().to(projects::create_project))
                .route("", web::get().to(projects::list_projects)),
        );
    }
}
