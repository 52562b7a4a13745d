//! End-to-end dispatch: load the active profile, verify the relay, send
//! exactly once. Failures map straight to HTTP-facing errors.

use std::time::Duration;

use sqlx::SqlitePool;

use crate::error::{AppError, Result};
use crate::models::outbound::OutboundMessage;
use crate::services::email_config_service;
use crate::smtp::MailRelay;

pub async fn dispatch(
    pool: &SqlitePool,
    timeout: Duration,
    message: &OutboundMessage,
) -> Result<String> {
    let config = email_config_service::get_active(pool)
        .await?
        .ok_or(AppError::EmailNotConfigured)?;

    let relay = MailRelay::connect(&config, timeout).await?;
    let message_id = relay.send(message).await?;

    tracing::info!(to = %message.to, %message_id, "email dispatched");
    Ok(message_id)
}
