use std::time::Instant;

use actix_cors::Cors;
use actix_web::{
    http::header,
    middleware::{DefaultHeaders, Logger},
    web, App, HttpServer,
};
use env_logger::Env;
use log::{debug, info, warn};

use crate::{
    config::{Config, Environment},
    db::Database,
    errors::AppError,
    routes, services,
    types::AppState,
};

// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;

// Setup logging with custom format and configuration
fn setup_logging(config: &Config) -> Result<(), AppError> {
    // Configure log level based on environment and config
    let log_level = match config.app.environment {
        Environment::Development => config.app.log_level.clone(),
        Environment::Testing => "debug,actix_web=info".to_string(),
        Environment::Production => "info,actix_web=warn".to_string(),
    };

    let env = Env::default()
        .filter_or("RUST_LOG", log_level)
        .write_style_or("RUST_LOG_STYLE", "always");

    env_logger::try_init_from_env(env)
        .map_err(|e| AppError::Logger(format!("Failed to initialize logger: {}", e)))
}

/// Attempts the primary database connection.
///
/// Failure downgrades the service to the JSON file store instead of
/// aborting startup; the connect timeout keeps this fail-fast.
async fn connect_database(config: &Config) -> Option<Database> {
    let Some(url) = config.db.url.as_deref() else {
        info!("DATABASE_URL not set, using the JSON file store");
        return None;
    };

    match Database::connect(&config.db, url).await {
        Ok(db) => Some(db),
        Err(e) => {
            warn!("Database unavailable, using the JSON file store: {}", e);
            None
        }
    }
}

/// CORS for the shorten API: configured origins only; with none configured
/// the API is effectively same-origin.
fn build_cors(origins: &[String]) -> Cors {
    if origins.is_empty() {
        return Cors::default();
    }

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![header::CONTENT_TYPE])
        .supports_credentials()
        .max_age(3600);
    for origin in origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}

pub async fn server() -> AppResult<()> {
    // Load application configuration
    let config = Config::load()?;

    // Setup enhanced logging based on configuration
    setup_logging(&config)?;

    // Capture start time for uptime calculation
    let start_time = Instant::now();

    // Log startup information
    info!("Starting {} v{}", config.app.name, config.app.version);
    info!("Environment: {:?}", config.app.environment);
    info!(
        "Binding to {}:{} with {} workers",
        config.server.host, config.server.port, config.server.workers
    );

    if config.app.environment == Environment::Development {
        debug!("Debug logging enabled");
        debug!("Full configuration: {:?}", config);
    }

    let db = connect_database(&config).await;

    // One service instance shared across workers
    let service = web::Data::new(services::build(db.as_ref(), &config));

    // Retention sweep at startup; later sweeps piggyback on create calls
    if config.shortener.auto_purge_days > 0 {
        let purged = service.purge_expired().await;
        info!("Startup purge removed {} expired links", purged);
    }

    // Determine if we should enable more verbose logging
    let enable_debug_logging = config.app.environment != Environment::Production;

    // Create cloned handles for the closure
    let app_config = config.clone();
    let app_db = db.clone();

    // Determine log format based on environment
    let log_format = if enable_debug_logging {
        // Detailed format for development/testing
        "%a \"%r\" %s %b %T \"%{Referer}i\" \"%{User-Agent}i\" %{X-Request-ID}i"
    } else {
        // Simple format for production
        "%a \"%r\" %s %b %T"
    };

    // Start the HTTP server
    HttpServer::new(move || {
        let cors = build_cors(&app_config.shortener.cors_allowed_origins);

        App::new()
            .app_data(web::Data::new(AppState {
                start_time,
                db: app_db.clone(),
                version: app_config.app.version.clone(),
            }))
            // Make the full configuration available to handlers
            .app_data(web::Data::new(app_config.clone()))
            .app_data(service.clone())
            .wrap(Logger::new(log_format))
            // Add request tracking ID
            .wrap(DefaultHeaders::new().add(("X-Request-ID", uuid::Uuid::new_v4().to_string())))
            .wrap(cors)
            // Configure routes
            .configure(routes::configure_routes)
    })
    .workers(config.server.workers)
    .bind((config.server.host.to_string(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
