use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

mod handlers;

use handlers::{health, pokemon, predict};
use pokebattle::{AppConfig, BattlePredictor};

/// Application state shared across handlers
pub struct AppState {
    pub predictor: BattlePredictor,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Local overrides first; dotenvy never replaces variables already set
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = AppConfig::from_env();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!(
        "Loading reference data from {:?} and models from {:?}",
        config.data_dir, config.model_dir
    );

    // Missing or malformed artifacts are fatal: there is no degraded mode
    let predictor = BattlePredictor::load(&config.artifacts())
        .context("Failed to load battle predictor")?;

    let app_state = Arc::new(AppState { predictor });
    let addr = config.bind_addr();

    info!("Starting Pokemon Battle API server at http://{}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(handlers::json_config())
            .wrap(middleware::Logger::default())
            .route("/", web::get().to(health::index))
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/api")
                    .wrap(handlers::api_cors())
                    .route("/predict", web::post().to(predict::predict_battle))
                    .route("/pokemon", web::get().to(pokemon::list_pokemon))
                    .route("/pokemon/{name}", web::get().to(pokemon::get_pokemon)),
            )
    })
    .bind(&addr)
    .with_context(|| format!("Failed to bind {}", addr))?
    .run()
    .await
    .context("Server error")
}
