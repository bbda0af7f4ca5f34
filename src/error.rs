use thiserror::Error;

#[cfg(feature = "api")]
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
#[cfg(feature = "api")]
use std::fmt;

#[cfg(feature = "api")]
use crate::models::ErrorResponse;

/// Maximum number of Pokemon per team in team mode
pub const MAX_ROSTER_SIZE: usize = 3;

/// Prediction core errors
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Invalid Pokemon: {0}")]
    UnknownSpecies(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Reference data error: {0}")]
    Data(String),

    #[error("Model artifact error: {0}")]
    Model(String),

    #[error("Classifier failed: {0}")]
    Classifier(String),
}

impl From<polars::prelude::PolarsError> for PredictError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        PredictError::Data(err.to_string())
    }
}

/// Application error types
#[cfg(feature = "api")]
#[derive(Debug)]
pub enum AppError {
    /// Invalid request data
    ValidationError(String),
    /// Requested resource does not exist
    NotFound(String),
    /// Model or prediction error
    PredictionError(String),
    /// Internal server error
    InternalError(String),
}

#[cfg(feature = "api")]
impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::PredictionError(msg) => write!(f, "Prediction error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

#[cfg(feature = "api")]
impl std::error::Error for AppError {}

#[cfg(feature = "api")]
impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::UnknownSpecies(_) | PredictError::InvalidInput(_) => {
                AppError::ValidationError(err.to_string())
            }
            other => AppError::PredictionError(other.to_string()),
        }
    }
}

#[cfg(feature = "api")]
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PredictionError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            AppError::ValidationError(msg) => ("validation_error", msg.clone()),
            AppError::NotFound(msg) => ("not_found", msg.clone()),
            AppError::PredictionError(msg) => ("prediction_error", msg.clone()),
            AppError::InternalError(msg) => ("internal_error", msg.clone()),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error_code.to_string(),
            message,
        })
    }
}

/// Validation functions
#[cfg(feature = "api")]
pub fn validate_roster_size(team: &str, len: usize) -> Result<(), AppError> {
    if len == 0 {
        return Err(AppError::ValidationError(
            "Both teams must have at least one Pokemon".to_string(),
        ));
    }
    if len > MAX_ROSTER_SIZE {
        return Err(AppError::ValidationError(format!(
            "Teams can have maximum {} Pokemon, {} has {}",
            MAX_ROSTER_SIZE, team, len
        )));
    }
    Ok(())
}

#[cfg(feature = "api")]
pub fn validate_species_pair(pokemon1: &str, pokemon2: &str) -> Result<(), AppError> {
    if pokemon1.is_empty() || pokemon2.is_empty() {
        return Err(AppError::ValidationError(
            "Both Pokemon must be selected".to_string(),
        ));
    }
    if pokemon1 == pokemon2 {
        return Err(AppError::ValidationError(
            "Pokemon must be different".to_string(),
        ));
    }
    Ok(())
}
