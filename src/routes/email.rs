use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::outbound::{MessageAttachment, OutboundMessage};
use crate::services::dispatch_service;

/// JSON shape of a dispatch request. Everything is optional here; the
/// required-field check happens after normalization so that empty strings
/// and absent fields fail the same way.
#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub html: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub success: bool,
    pub message_id: String,
    pub message: String,
}

/// POST /api/email/send. Accepts either a JSON body or a multipart form
/// with `attachmentCount` plus `attachment_0..n-1` file parts; both shapes
/// normalize into one outbound message before anything touches the relay.
pub async fn send_email(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    req: Request,
) -> Result<Json<SendEmailResponse>> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let message = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?;
        from_multipart(multipart).await?
    } else {
        let Json(body) = Json::<SendEmailRequest>::from_request(req, &())
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?;
        OutboundMessage::build(body.to, body.subject, body.html, body.text, Vec::new())?
    };

    let message_id = dispatch_service::dispatch(&pool, config.smtp_timeout(), &message).await?;

    Ok(Json(SendEmailResponse {
        success: true,
        message_id,
        message: "Email sent successfully".to_string(),
    }))
}

async fn from_multipart(mut multipart: Multipart) -> Result<OutboundMessage> {
    let mut to = None;
    let mut subject = None;
    let mut html = None;
    let mut text = None;
    let mut declared = 0usize;
    let mut files: BTreeMap<usize, MessageAttachment> = BTreeMap::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "to" => to = Some(field.text().await.map_err(multipart_err)?),
            "subject" => subject = Some(field.text().await.map_err(multipart_err)?),
            "html" => html = Some(field.text().await.map_err(multipart_err)?),
            "text" => text = Some(field.text().await.map_err(multipart_err)?),
            "attachmentCount" => {
                let raw = field.text().await.map_err(multipart_err)?;
                declared = raw.trim().parse().unwrap_or(0);
            }
            other => {
                let Some(index) = other
                    .strip_prefix("attachment_")
                    .and_then(|s| s.parse::<usize>().ok())
                else {
                    continue;
                };
                let filename = field.file_name().unwrap_or("attachment").to_string();
                let content = field.bytes().await.map_err(multipart_err)?.to_vec();
                files.insert(index, MessageAttachment { filename, content });
            }
        }
    }

    // The declared count is the contract: extra parts are dropped, missing
    // indices are skipped.
    let attachments = (0..declared).filter_map(|i| files.remove(&i)).collect();
    OutboundMessage::build(to, subject, html, text, attachments)
}

fn multipart_err(e: MultipartError) -> AppError {
    AppError::Validation(e.to_string())
}
