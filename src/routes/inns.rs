use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::now_epoch;
use crate::error::{AppError, Result};
use crate::models::inn::Inn;

#[derive(Debug, Deserialize)]
pub struct CreateInn {
    pub name: String,
    pub location: Option<String>,
    pub stars: Option<i64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub reference_price: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInn {
    pub name: Option<String>,
    pub location: Option<String>,
    pub stars: Option<i64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub reference_price: Option<f64>,
    pub notes: Option<String>,
    pub active: Option<bool>,
}

pub async fn list_inns(State(pool): State<SqlitePool>) -> Result<Json<Vec<Inn>>> {
    let inns = sqlx::query_as::<_, Inn>("SELECT * FROM inns ORDER BY name ASC")
        .fetch_all(&pool)
        .await?;
    Ok(Json(inns))
}

pub async fn get_inn(State(pool): State<SqlitePool>, Path(id): Path<String>) -> Result<Json<Inn>> {
    let inn = sqlx::query_as::<_, Inn>("SELECT * FROM inns WHERE id = ?")
        .bind(&id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(inn))
}

pub async fn create_inn(
    State(pool): State<SqlitePool>,
    Json(input): Json<CreateInn>,
) -> Result<Json<Inn>> {
    let id = Uuid::new_v4().to_string();
    let now = now_epoch();

    sqlx::query(
        "INSERT INTO inns (id, name, location, stars, phone, email, reference_price, notes, active, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(&id)
    .bind(&input.name)
    .bind(&input.location)
    .bind(input.stars.unwrap_or(0))
    .bind(&input.phone)
    .bind(&input.email)
    .bind(input.reference_price.unwrap_or(0.0))
    .bind(&input.notes)
    .bind(now)
    .bind(now)
    .execute(&pool)
    .await?;

    let inn = sqlx::query_as::<_, Inn>("SELECT * FROM inns WHERE id = ?")
        .bind(&id)
        .fetch_one(&pool)
        .await?;
    Ok(Json(inn))
}

pub async fn update_inn(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
    Json(input): Json<UpdateInn>,
) -> Result<Json<Inn>> {
    let existing = sqlx::query_as::<_, Inn>("SELECT * FROM inns WHERE id = ?")
        .bind(&id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound)?;

    sqlx::query(
        "UPDATE inns
         SET name = ?, location = ?, stars = ?, phone = ?, email = ?, reference_price = ?,
             notes = ?, active = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(input.name.unwrap_or(existing.name))
    .bind(input.location.or(existing.location))
    .bind(input.stars.unwrap_or(existing.stars))
    .bind(input.phone.or(existing.phone))
    .bind(input.email.or(existing.email))
    .bind(input.reference_price.unwrap_or(existing.reference_price))
    .bind(input.notes.or(existing.notes))
    .bind(input.active.unwrap_or(existing.active))
    .bind(now_epoch())
    .bind(&id)
    .execute(&pool)
    .await?;

    let inn = sqlx::query_as::<_, Inn>("SELECT * FROM inns WHERE id = ?")
        .bind(&id)
        .fetch_one(&pool)
        .await?;
    Ok(Json(inn))
}

pub async fn delete_inn(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let result = sqlx::query("DELETE FROM inns WHERE id = ?")
        .bind(&id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(Json(json!({ "success": true })))
}
