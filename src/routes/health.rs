use std::collections::BTreeMap;

use actix_web::{get, http::StatusCode, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HealthQuery {
    #[serde(default)]
    pub simple: Option<String>,
}

/// Detailed health report.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub environment: String,
    /// Seconds since the service started.
    pub uptime: i64,
    pub timestamp: DateTime<Utc>,
    pub dependencies: BTreeMap<String, String>,
}

/// Health check endpoint
///
/// Pings the database. `?simple=true` returns only `{"status": ...}`.
/// Responds with 503 when a dependency is down.
#[get("/health")]
pub async fn health(state: web::Data<AppState>, query: web::Query<HealthQuery>) -> HttpResponse {
    let simple = query.simple.as_deref() == Some("true");

    let healthy = match state.health.ping().await {
        Ok(()) => true,
        Err(e) => {
            log::error!("health check: database ping failed: {}", e);
            false
        }
    };

    if simple {
        return if healthy {
            HttpResponse::Ok().json(json!({ "status": "ok" }))
        } else {
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "error",
                "error": "Database connection failed"
            }))
        };
    }

    let mut dependencies = BTreeMap::new();
    let database = if healthy { "ok" } else { "error" };
    dependencies.insert("database".to_string(), database.to_string());

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    HttpResponse::build(status).json(HealthStatus {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: state.metadata.version.clone(),
        environment: state.metadata.environment.clone(),
        uptime: state.metadata.uptime().num_seconds(),
        timestamp: Utc::now(),
        dependencies,
    })
}
