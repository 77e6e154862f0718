use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::tts::SpeechError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Text parameter is required")]
    MissingText,

    #[error("{0}")]
    Generation(#[from] SpeechError),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::MissingText => StatusCode::BAD_REQUEST,
            AppError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = self.to_string();

        tracing::error!("Request failed: {} - {}", status.as_u16(), message);

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
