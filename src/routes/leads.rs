use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::db::now_epoch;
use crate::error::{AppError, Result};
use crate::models::lead::{Lead, LeadHistory, LeadStatus, NewLead};
use crate::services::lead_service::{self, PipelineRow};

#[derive(Debug, Deserialize)]
pub struct UpdateLead {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub inquiry_type: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub assigned_seller_id: Option<String>,
    pub suggested_package_id: Option<String>,
    pub internal_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConvertLead {
    pub client_id: String,
}

#[derive(Debug, Deserialize)]
pub struct NewHistoryEntry {
    pub action: String,
    pub description: Option<String>,
    pub actor: Option<String>,
}

/// Lead plus the display names the board needs, resolved in one query.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct LeadListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub lead: Lead,
    pub assigned_seller_name: Option<String>,
    pub suggested_package_name: Option<String>,
}

pub async fn list_leads(State(pool): State<SqlitePool>) -> Result<Json<Vec<LeadListItem>>> {
    let leads = sqlx::query_as::<_, LeadListItem>(
        "SELECT l.*,
                s.first_name || ' ' || s.last_name AS assigned_seller_name,
                p.name AS suggested_package_name
         FROM leads l
         LEFT JOIN sellers s ON s.id = l.assigned_seller_id
         LEFT JOIN packages p ON p.id = l.suggested_package_id
         WHERE l.converted = 0
         ORDER BY l.entered_at DESC",
    )
    .fetch_all(&pool)
    .await?;
    Ok(Json(leads))
}

pub async fn get_lead(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<Lead>> {
    let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = ?")
        .bind(&id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(lead))
}

pub async fn create_lead(
    State(pool): State<SqlitePool>,
    Json(input): Json<NewLead>,
) -> Result<Json<Lead>> {
    let lead = lead_service::create_lead(&pool, input).await?;
    Ok(Json(lead))
}

pub async fn update_lead(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
    Json(input): Json<UpdateLead>,
) -> Result<Json<Lead>> {
    let existing = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = ?")
        .bind(&id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound)?;

    let now = now_epoch();

    // A status change counts as an interaction and leaves a trail entry.
    let status_change = input
        .status
        .map(|s| LeadStatus::from_str(&s).as_str().to_string())
        .filter(|s| *s != existing.status);
    let status = status_change.clone().unwrap_or(existing.status);
    let last_interaction_at = if status_change.is_some() {
        Some(now)
    } else {
        existing.last_interaction_at
    };

    sqlx::query(
        "UPDATE leads
         SET first_name = ?, last_name = ?, email = ?, phone = ?, country = ?, city = ?,
             inquiry_type = ?, source = ?, status = ?, assigned_seller_id = ?,
             suggested_package_id = ?, internal_notes = ?, last_interaction_at = ?,
             updated_at = ?
         WHERE id = ?",
    )
    .bind(input.first_name.unwrap_or(existing.first_name))
    .bind(input.last_name.unwrap_or(existing.last_name))
    .bind(input.email.unwrap_or(existing.email))
    .bind(input.phone.or(existing.phone))
    .bind(input.country.or(existing.country))
    .bind(input.city.or(existing.city))
    .bind(input.inquiry_type.unwrap_or(existing.inquiry_type))
    .bind(input.source.unwrap_or(existing.source))
    .bind(&status)
    .bind(input.assigned_seller_id.or(existing.assigned_seller_id))
    .bind(input.suggested_package_id.or(existing.suggested_package_id))
    .bind(input.internal_notes.or(existing.internal_notes))
    .bind(last_interaction_at)
    .bind(now)
    .bind(&id)
    .execute(&pool)
    .await?;

    if let Some(new_status) = status_change {
        lead_service::add_history(
            &pool,
            &id,
            &format!("Status changed to {new_status}"),
            None,
            None,
        )
        .await?;
    }

    let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = ?")
        .bind(&id)
        .fetch_one(&pool)
        .await?;
    Ok(Json(lead))
}

/// Hard delete; the history trail goes with the lead.
pub async fn delete_lead(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM lead_history WHERE lead_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM leads WHERE id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(Json(json!({ "success": true })))
}

pub async fn convert_lead(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
    Json(input): Json<ConvertLead>,
) -> Result<Json<Lead>> {
    let lead = lead_service::convert_lead(&pool, &id, &input.client_id).await?;
    Ok(Json(lead))
}

pub async fn pipeline(State(pool): State<SqlitePool>) -> Result<Json<Vec<PipelineRow>>> {
    let rows = lead_service::pipeline(&pool).await?;
    Ok(Json(rows))
}

pub async fn list_history(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<Vec<LeadHistory>>> {
    ensure_lead_exists(&pool, &id).await?;
    let history = sqlx::query_as::<_, LeadHistory>(
        "SELECT * FROM lead_history WHERE lead_id = ? ORDER BY created_at DESC",
    )
    .bind(&id)
    .fetch_all(&pool)
    .await?;
    Ok(Json(history))
}

pub async fn add_history(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
    Json(input): Json<NewHistoryEntry>,
) -> Result<Json<LeadHistory>> {
    ensure_lead_exists(&pool, &id).await?;
    let entry = lead_service::add_history(
        &pool,
        &id,
        &input.action,
        input.description.as_deref(),
        input.actor.as_deref(),
    )
    .await?;
    Ok(Json(entry))
}

async fn ensure_lead_exists(pool: &SqlitePool, id: &str) -> Result<()> {
    let exists: Option<String> = sqlx::query_scalar("SELECT id FROM leads WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    exists.map(|_| ()).ok_or(AppError::NotFound)
}
