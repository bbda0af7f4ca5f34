use actix_cors::Cors;
use actix_web::{http::header, web};

use pokebattle::error::AppError;

pub mod health;
pub mod pokemon;
pub mod predict;

/// CORS policy of the `/api` scope: any origin may call the JSON endpoints
pub fn api_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600)
}

/// JSON bodies are parsed whatever the content type; parse failures use the API error shape
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}
