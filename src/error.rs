use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Validation(String),
    #[error("No active email configuration. Set up SMTP in settings first.")]
    EmailNotConfigured,
    #[error("SMTP connection failed: {0}")]
    SmtpConnect(String),
    #[error("SMTP authentication failed: {0}")]
    SmtpAuth(String),
    #[error("SMTP transmission failed: {0}")]
    SmtpSend(String),
    #[error("Not found")]
    NotFound,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Validation(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg, None)
            }
            AppError::EmailNotConfigured => {
                tracing::warn!("Dispatch attempted without an active email configuration");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "No active email configuration. Set up SMTP in settings first.".to_string(),
                    None,
                )
            }
            AppError::SmtpConnect(detail) => {
                tracing::error!(error = %detail, "SMTP connection failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not connect to the SMTP server. Check the email configuration.".to_string(),
                    Some(detail),
                )
            }
            AppError::SmtpAuth(detail) => {
                tracing::error!(error = %detail, "SMTP authentication rejected");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SMTP authentication failed. Check the SMTP username and password.".to_string(),
                    Some(detail),
                )
            }
            AppError::SmtpSend(detail) => {
                tracing::error!(error = %detail, "Email transmission failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send the email".to_string(),
                    Some(detail),
                )
            }
            AppError::NotFound => {
                tracing::debug!("Resource not found");
                (StatusCode::NOT_FOUND, "Not found".to_string(), None)
            }
        };

        let body = match details {
            Some(details) => json!({ "error": message, "details": details }),
            None => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}
