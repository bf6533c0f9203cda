use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::config::Config;
use crate::handlers;
use crate::services::ShortenerService;
use crate::types::{AppState, HealthStatus, ResponsePayload};

mod short_link;

#[derive(Debug, Deserialize)]
struct IndexQuery {
    s: Option<String>,
}

// Handler function for the root route "/". With `?s={code}` this is the
// query form of the redirect resolver; without it, a welcome payload.
async fn index(
    query: web::Query<IndexQuery>,
    service: web::Data<ShortenerService>,
    config: web::Data<Config>,
) -> impl Responder {
    if let Some(code) = &query.s {
        return handlers::resolve_to_response(code, &service, &config).await;
    }

    let welcome_message = ResponsePayload {
        status: 200,
        message: String::from("Welcome and have a great time!"),
    };

    // Return the struct as JSON
    HttpResponse::Ok().json(welcome_message)
}

// Handler function for the health check endpoint
async fn health_check(data: web::Data<AppState>) -> impl Responder {
    // Calculate uptime in seconds
    let uptime = data.start_time.elapsed().as_secs();

    let db_health = match &data.db {
        Some(db) => Some(db.health_check().await),
        None => None,
    };

    let status = HealthStatus {
        status: String::from("OK"),
        version: data.version.clone(),
        db_health,
        uptime_seconds: uptime,
    };

    // Return the status as JSON
    HttpResponse::Ok().json(status)
}

// Configure all routes function
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Register routes from individual modules
    cfg.route("/", web::get().to(index));
    cfg.route("/health", web::get().to(health_check));
    short_link::configure_routes(cfg);
}
