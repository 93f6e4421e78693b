use std::io;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use odot::auth::{GoogleProvider, TokenCodec};
use odot::config::Config;
use odot::routes::{self, health};
use odot::store::PgStore;
use odot::{AppState, ServiceMetadata};

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    log::error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env().map_err(|e| {
        eprintln!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let store = PgStore::connect(&config.database_url, config.store_timeout)
        .await
        .map_err(|e| startup_error("Failed to connect to database", e))?;
    store
        .migrate()
        .await
        .map_err(|e| startup_error("Failed to run migrations", e))?;

    let provider = GoogleProvider::new(&config.google, config.provider_timeout)
        .map_err(|e| startup_error("Failed to configure Google sign-in", e))?;
    let codec = TokenCodec::new(&config.jwt_secret);

    let state = AppState::new(
        Arc::new(store),
        Arc::new(provider),
        codec.clone(),
        ServiceMetadata::new(config.environment.clone()),
    )
    .with_frontend_url(config.frontend_url.clone())
    .with_secure_cookies(config.cookie_secure);
    let state = web::Data::new(state);

    let allowed_origin = config.frontend_origin();
    log::info!(
        "Starting odot server at {} ({})",
        config.server_url(),
        config.environment
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(routes::cors(&allowed_origin))
            .wrap(Logger::new(
                "%a \"%r\" %s %b \"%{User-Agent}i\" %T",
            ))
            .service(health::health)
            .service(web::scope("/api").configure(routes::config(codec.clone())))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .shutdown_timeout(10)
    .run()
    .await
}
