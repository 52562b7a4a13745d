use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::now_epoch;
use crate::error::{AppError, Result};
use crate::models::room::Room;

#[derive(Debug, Deserialize)]
pub struct CreateRoom {
    pub name: String,
    pub room_type: Option<String>,
    pub capacity: Option<i64>,
    pub price_per_night: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoom {
    pub name: Option<String>,
    pub room_type: Option<String>,
    pub capacity: Option<i64>,
    pub price_per_night: Option<f64>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

pub async fn list_rooms(State(pool): State<SqlitePool>) -> Result<Json<Vec<Room>>> {
    let rooms = sqlx::query_as::<_, Room>("SELECT * FROM rooms ORDER BY name ASC")
        .fetch_all(&pool)
        .await?;
    Ok(Json(rooms))
}

pub async fn get_room(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<Room>> {
    let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
        .bind(&id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(room))
}

pub async fn create_room(
    State(pool): State<SqlitePool>,
    Json(input): Json<CreateRoom>,
) -> Result<Json<Room>> {
    let id = Uuid::new_v4().to_string();
    let now = now_epoch();

    sqlx::query(
        "INSERT INTO rooms (id, name, room_type, capacity, price_per_night, description, active, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(&id)
    .bind(&input.name)
    .bind(&input.room_type)
    .bind(input.capacity.unwrap_or(1))
    .bind(input.price_per_night.unwrap_or(0.0))
    .bind(&input.description)
    .bind(now)
    .bind(now)
    .execute(&pool)
    .await?;

    let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
        .bind(&id)
        .fetch_one(&pool)
        .await?;
    Ok(Json(room))
}

pub async fn update_room(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
    Json(input): Json<UpdateRoom>,
) -> Result<Json<Room>> {
    let existing = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
        .bind(&id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound)?;

    sqlx::query(
        "UPDATE rooms
         SET name = ?, room_type = ?, capacity = ?, price_per_night = ?, description = ?,
             active = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(input.name.unwrap_or(existing.name))
    .bind(input.room_type.or(existing.room_type))
    .bind(input.capacity.unwrap_or(existing.capacity))
    .bind(input.price_per_night.unwrap_or(existing.price_per_night))
    .bind(input.description.or(existing.description))
    .bind(input.active.unwrap_or(existing.active))
    .bind(now_epoch())
    .bind(&id)
    .execute(&pool)
    .await?;

    let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
        .bind(&id)
        .fetch_one(&pool)
        .await?;
    Ok(Json(room))
}

pub async fn delete_room(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let result = sqlx::query("DELETE FROM rooms WHERE id = ?")
        .bind(&id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(Json(json!({ "success": true })))
}
