//! Conversion of forecast failures into `{ "error": ... }` responses.

use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use forecast_core::ForecastError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("{0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

/// Query strings axum cannot deserialize, e.g. a repeated `location` key.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        match err {
            ForecastError::MissingParameters(_) | ForecastError::InvalidParameter { .. } => {
                Self::BadRequest(err.to_string())
            }
            ForecastError::MissingCredential => Self::Internal(
                "Server configuration error: weather API key is not configured".into(),
            ),
            // Only the provider's own message is passed through; status lines and
            // transport detail stay in the logs.
            ForecastError::UpstreamExhausted { attempts, failure } => {
                Self::Internal(match failure.upstream_message {
                    Some(msg) => {
                        format!("Failed to fetch weather data after {attempts} attempts: {msg}")
                    }
                    None => format!("Failed to fetch weather data after {attempts} attempts"),
                })
            }
            ForecastError::MalformedResponse(_) => {
                Self::Internal("Weather provider returned an unexpected response".into())
            }
            ForecastError::NoForecastForDate(date) => {
                Self::NotFound(format!("No forecast available for {date}"))
            }
            ForecastError::DeadlineExceeded(_) => {
                Self::Internal("Weather provider did not respond in time".into())
            }
        }
    }
}
