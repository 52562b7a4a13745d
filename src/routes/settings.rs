use axum::extract::State;
use axum::Json;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::{AppError, Result};
use crate::models::email_config::{EmailConfig, EmailConfigInput};
use crate::services::email_config_service;

/// Settings as returned to the panel. The SMTP password never leaves the
/// server.
#[derive(Debug, Serialize)]
pub struct EmailConfigResponse {
    pub id: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_secure: bool,
    pub smtp_user: String,
    pub email_from: String,
    pub email_from_name: String,
    pub active: bool,
    pub updated_at: i64,
}

impl From<EmailConfig> for EmailConfigResponse {
    fn from(config: EmailConfig) -> Self {
        Self {
            id: config.id,
            smtp_host: config.smtp_host,
            smtp_port: config.smtp_port,
            smtp_secure: config.smtp_secure,
            smtp_user: config.smtp_user,
            email_from: config.email_from,
            email_from_name: config.email_from_name,
            active: config.active,
            updated_at: config.updated_at,
        }
    }
}

pub async fn get_email_settings(
    State(pool): State<SqlitePool>,
) -> Result<Json<EmailConfigResponse>> {
    let config = email_config_service::get_active(&pool)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(config.into()))
}

pub async fn put_email_settings(
    State(pool): State<SqlitePool>,
    Json(input): Json<EmailConfigInput>,
) -> Result<Json<EmailConfigResponse>> {
    let config = email_config_service::upsert_active(&pool, &input).await?;
    Ok(Json(config.into()))
}
