//! Codespeed results server - Main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{App, HttpServer, web};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use codespeed_lib::api;
use codespeed_lib::config::Config;
use codespeed_lib::middleware::RequestLogger;
use codespeed_lib::store::ResultStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Check for --health-check flag (used by Docker HEALTHCHECK)
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(if Config::from_env().is_ok() { 0 } else { 1 });
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - CODESPEED_USERS entries must look like name:sha256hex[:inactive]");
            error!("  - In production, CODESPEED_ENVIRONMENTS must be set");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Codespeed Results Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }
    if config.auth.allow_anonymous_post {
        warn!("Anonymous result submission is ENABLED");
    }
    if !config.auth.require_secure_auth {
        warn!("Credentials are accepted over plain HTTP");
    }
    info!(
        "{} submitter account(s), {} active",
        config.users.len(),
        config.users.active_count()
    );
    info!("Environments: {}", config.environments.join(", "));

    let store = ResultStore::with_environments(config.environments.iter().cloned());
    let bind_address = config.bind_address();
    let auth_settings = config.auth;
    let users = config.users.clone();
    let is_development = config.is_development();

    let worker_count = if is_development {
        4
    } else {
        num_cpus::get()
    };
    info!(
        "Starting server at http://{} ({} workers)",
        bind_address, worker_count
    );

    HttpServer::new(move || {
        let cors = if is_development {
            // Permissive CORS for a local dashboard
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        } else {
            // Same-origin only
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        };

        App::new()
            // CORS must be before other middleware
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(auth_settings))
            .app_data(web::Data::new(users.clone()))
            .configure(api::configure_routes)
    })
    .workers(worker_count)
    .bind(&bind_address)?
    .run()
    .await
}
