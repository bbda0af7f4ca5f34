use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

use crate::AppState;
use pokebattle::models::HealthResponse;

/// Plain-text banner
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Pokemon Battle Predictor API is running. POST /api/predict to predict a battle.")
}

/// Health check endpoint
pub async fn health_check(state: web::Data<Arc<AppState>>) -> impl Responder {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        species_loaded: state.predictor.species_count(),
        model_backend: state.predictor.backend().to_string(),
    };

    HttpResponse::Ok().json(response)
}
