use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::now_epoch;
use crate::error::{AppError, Result};
use crate::models::branch::Branch;

#[derive(Debug, Deserialize)]
pub struct CreateBranch {
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBranch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub active: Option<bool>,
}

pub async fn list_branches(State(pool): State<SqlitePool>) -> Result<Json<Vec<Branch>>> {
    let branches =
        sqlx::query_as::<_, Branch>("SELECT * FROM branches WHERE active = 1 ORDER BY name ASC")
            .fetch_all(&pool)
            .await?;
    Ok(Json(branches))
}

pub async fn get_branch(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<Branch>> {
    let branch = sqlx::query_as::<_, Branch>("SELECT * FROM branches WHERE id = ?")
        .bind(&id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(branch))
}

pub async fn create_branch(
    State(pool): State<SqlitePool>,
    Json(input): Json<CreateBranch>,
) -> Result<Json<Branch>> {
    let id = Uuid::new_v4().to_string();
    let now = now_epoch();

    sqlx::query(
        "INSERT INTO branches (id, name, code, address, city, country, phone, email, active, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(&id)
    .bind(&input.name)
    .bind(&input.code)
    .bind(&input.address)
    .bind(&input.city)
    .bind(&input.country)
    .bind(&input.phone)
    .bind(&input.email)
    .bind(now)
    .bind(now)
    .execute(&pool)
    .await?;

    let branch = sqlx::query_as::<_, Branch>("SELECT * FROM branches WHERE id = ?")
        .bind(&id)
        .fetch_one(&pool)
        .await?;
    Ok(Json(branch))
}

pub async fn update_branch(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
    Json(input): Json<UpdateBranch>,
) -> Result<Json<Branch>> {
    let existing = sqlx::query_as::<_, Branch>("SELECT * FROM branches WHERE id = ?")
        .bind(&id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound)?;

    sqlx::query(
        "UPDATE branches
         SET name = ?, code = ?, address = ?, city = ?, country = ?, phone = ?, email = ?,
             active = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(input.name.unwrap_or(existing.name))
    .bind(input.code.unwrap_or(existing.code))
    .bind(input.address.or(existing.address))
    .bind(input.city.or(existing.city))
    .bind(input.country.or(existing.country))
    .bind(input.phone.or(existing.phone))
    .bind(input.email.or(existing.email))
    .bind(input.active.unwrap_or(existing.active))
    .bind(now_epoch())
    .bind(&id)
    .execute(&pool)
    .await?;

    let branch = sqlx::query_as::<_, Branch>("SELECT * FROM branches WHERE id = ?")
        .bind(&id)
        .fetch_one(&pool)
        .await?;
    Ok(Json(branch))
}

/// Soft delete. The branch disappears from listings but stays referencable
/// from sellers that pointed at it.
pub async fn delete_branch(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let result = sqlx::query("UPDATE branches SET active = 0, updated_at = ? WHERE id = ? AND active = 1")
        .bind(now_epoch())
        .bind(&id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(Json(json!({ "success": true })))
}
