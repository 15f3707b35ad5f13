use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use thiserror::Error;

use tickets::models::ErrorEnvelope;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Variables de entorno ClickUp no configuradas")]
    MissingConfig,

    #[error("Título y descripción son requeridos")]
    MissingFields,

    #[error("Error obteniendo tickets")]
    ListFailed { details: String },

    #[error("Error procesando ticket")]
    CreateFailed { details: String },

    #[error("Method not allowed. Use GET or POST.")]
    MethodNotAllowed,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let (details, timestamp) = match &self {
            AppError::ListFailed { details } => (Some(details.clone()), None),
            AppError::CreateFailed { details } => (Some(details.clone()), Some(Utc::now())),
            _ => (None, None),
        };

        let body = ErrorEnvelope {
            success: false,
            error: self.to_string(),
            details,
            timestamp,
        };

        (status, Json(body)).into_response()
    }
}
