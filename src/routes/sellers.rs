use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::now_epoch;
use crate::error::{AppError, Result};
use crate::models::seller::Seller;

#[derive(Debug, Deserialize)]
pub struct CreateSeller {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub whatsapp: Option<String>,
    pub branch_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSeller {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub branch_id: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct SellerListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub seller: Seller,
    pub branch_name: Option<String>,
}

/// Per-seller lead counters, mirroring the sales dashboard. Conversion rate
/// is a percentage rounded to one decimal.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct SellerStats {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub branch_name: Option<String>,
    pub total_leads: i64,
    pub leads_new: i64,
    pub leads_in_progress: i64,
    pub leads_quoted: i64,
    pub leads_converted: i64,
    pub conversion_rate: f64,
}

pub async fn list_sellers(State(pool): State<SqlitePool>) -> Result<Json<Vec<SellerListItem>>> {
    let sellers = sqlx::query_as::<_, SellerListItem>(
        "SELECT s.*, b.name AS branch_name
         FROM sellers s
         LEFT JOIN branches b ON b.id = s.branch_id
         WHERE s.active = 1
         ORDER BY s.first_name ASC",
    )
    .fetch_all(&pool)
    .await?;
    Ok(Json(sellers))
}

pub async fn seller_stats(State(pool): State<SqlitePool>) -> Result<Json<Vec<SellerStats>>> {
    let stats = sqlx::query_as::<_, SellerStats>(
        "SELECT s.id,
                s.first_name,
                s.last_name,
                b.name AS branch_name,
                COUNT(l.id) AS total_leads,
                SUM(CASE WHEN l.status = 'new' THEN 1 ELSE 0 END) AS leads_new,
                SUM(CASE WHEN l.status = 'in_progress' THEN 1 ELSE 0 END) AS leads_in_progress,
                SUM(CASE WHEN l.status = 'quoted' THEN 1 ELSE 0 END) AS leads_quoted,
                SUM(CASE WHEN l.converted = 1 THEN 1 ELSE 0 END) AS leads_converted,
                CASE WHEN COUNT(l.id) = 0 THEN 0.0
                     ELSE ROUND(100.0 * SUM(CASE WHEN l.converted = 1 THEN 1 ELSE 0 END) / COUNT(l.id), 1)
                END AS conversion_rate
         FROM sellers s
         LEFT JOIN branches b ON b.id = s.branch_id
         LEFT JOIN leads l ON l.assigned_seller_id = s.id
         WHERE s.active = 1
         GROUP BY s.id
         ORDER BY total_leads DESC",
    )
    .fetch_all(&pool)
    .await?;
    Ok(Json(stats))
}

pub async fn get_seller(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<Seller>> {
    let seller = sqlx::query_as::<_, Seller>("SELECT * FROM sellers WHERE id = ?")
        .bind(&id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(seller))
}

pub async fn create_seller(
    State(pool): State<SqlitePool>,
    Json(input): Json<CreateSeller>,
) -> Result<Json<Seller>> {
    let id = Uuid::new_v4().to_string();
    let now = now_epoch();

    sqlx::query(
        "INSERT INTO sellers (id, first_name, last_name, email, whatsapp, branch_id, active, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(&id)
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.email)
    .bind(&input.whatsapp)
    .bind(input.branch_id.as_deref().filter(|b| !b.is_empty()))
    .bind(now)
    .bind(now)
    .execute(&pool)
    .await?;

    let seller = sqlx::query_as::<_, Seller>("SELECT * FROM sellers WHERE id = ?")
        .bind(&id)
        .fetch_one(&pool)
        .await?;
    Ok(Json(seller))
}

pub async fn update_seller(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
    Json(input): Json<UpdateSeller>,
) -> Result<Json<Seller>> {
    let existing = sqlx::query_as::<_, Seller>("SELECT * FROM sellers WHERE id = ?")
        .bind(&id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound)?;

    sqlx::query(
        "UPDATE sellers
         SET first_name = ?, last_name = ?, email = ?, whatsapp = ?, branch_id = ?,
             active = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(input.first_name.unwrap_or(existing.first_name))
    .bind(input.last_name.unwrap_or(existing.last_name))
    .bind(input.email.unwrap_or(existing.email))
    .bind(input.whatsapp.or(existing.whatsapp))
    .bind(input.branch_id.or(existing.branch_id))
    .bind(input.active.unwrap_or(existing.active))
    .bind(now_epoch())
    .bind(&id)
    .execute(&pool)
    .await?;

    let seller = sqlx::query_as::<_, Seller>("SELECT * FROM sellers WHERE id = ?")
        .bind(&id)
        .fetch_one(&pool)
        .await?;
    Ok(Json(seller))
}

pub async fn delete_seller(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let result =
        sqlx::query("UPDATE sellers SET active = 0, updated_at = ? WHERE id = ? AND active = 1")
            .bind(now_epoch())
            .bind(&id)
            .execute(&pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(Json(json!({ "success": true })))
}
