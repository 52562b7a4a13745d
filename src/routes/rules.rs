use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::now_epoch;
use crate::error::{AppError, Result};
use crate::models::rule::AssignmentRule;

#[derive(Debug, Deserialize)]
pub struct CreateRule {
    pub name: String,
    pub condition_field: String,
    pub condition_value: String,
    pub seller_id: String,
    pub priority: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRule {
    pub name: Option<String>,
    pub condition_field: Option<String>,
    pub condition_value: Option<String>,
    pub seller_id: Option<String>,
    pub priority: Option<i64>,
    pub active: Option<bool>,
}

pub async fn list_rules(State(pool): State<SqlitePool>) -> Result<Json<Vec<AssignmentRule>>> {
    let rules = sqlx::query_as::<_, AssignmentRule>(
        "SELECT * FROM assignment_rules WHERE active = 1 ORDER BY priority DESC, created_at ASC",
    )
    .fetch_all(&pool)
    .await?;
    Ok(Json(rules))
}

pub async fn get_rule(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<AssignmentRule>> {
    let rule = sqlx::query_as::<_, AssignmentRule>("SELECT * FROM assignment_rules WHERE id = ?")
        .bind(&id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(rule))
}

pub async fn create_rule(
    State(pool): State<SqlitePool>,
    Json(input): Json<CreateRule>,
) -> Result<Json<AssignmentRule>> {
    let id = Uuid::new_v4().to_string();
    let now = now_epoch();

    sqlx::query(
        "INSERT INTO assignment_rules
         (id, name, condition_field, condition_value, seller_id, priority, active, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(&id)
    .bind(&input.name)
    .bind(&input.condition_field)
    .bind(&input.condition_value)
    .bind(&input.seller_id)
    .bind(input.priority.unwrap_or(0))
    .bind(now)
    .bind(now)
    .execute(&pool)
    .await?;

    let rule = sqlx::query_as::<_, AssignmentRule>("SELECT * FROM assignment_rules WHERE id = ?")
        .bind(&id)
        .fetch_one(&pool)
        .await?;
    Ok(Json(rule))
}

pub async fn update_rule(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
    Json(input): Json<UpdateRule>,
) -> Result<Json<AssignmentRule>> {
    let existing =
        sqlx::query_as::<_, AssignmentRule>("SELECT * FROM assignment_rules WHERE id = ?")
            .bind(&id)
            .fetch_optional(&pool)
            .await?
            .ok_or(AppError::NotFound)?;

    sqlx::query(
        "UPDATE assignment_rules
         SET name = ?, condition_field = ?, condition_value = ?, seller_id = ?,
             priority = ?, active = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(input.name.unwrap_or(existing.name))
    .bind(input.condition_field.unwrap_or(existing.condition_field))
    .bind(input.condition_value.unwrap_or(existing.condition_value))
    .bind(input.seller_id.unwrap_or(existing.seller_id))
    .bind(input.priority.unwrap_or(existing.priority))
    .bind(input.active.unwrap_or(existing.active))
    .bind(now_epoch())
    .bind(&id)
    .execute(&pool)
    .await?;

    let rule = sqlx::query_as::<_, AssignmentRule>("SELECT * FROM assignment_rules WHERE id = ?")
        .bind(&id)
        .fetch_one(&pool)
        .await?;
    Ok(Json(rule))
}

pub async fn delete_rule(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let result = sqlx::query("DELETE FROM assignment_rules WHERE id = ?")
        .bind(&id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(Json(json!({ "success": true })))
}
