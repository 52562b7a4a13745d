use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::now_epoch;
use crate::error::{AppError, Result};
use crate::models::package::{Package, PackageKind};
use crate::services::availability_service::{self, Availability};

#[derive(Debug, Deserialize)]
pub struct CreatePackage {
    pub name: String,
    pub destination: String,
    pub kind: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub seats: Option<i64>,
    pub price_adult: Option<f64>,
    pub price_child: Option<f64>,
    pub currency: Option<String>,
    pub fare: Option<String>,
    pub services: Option<String>,
    pub policies: Option<String>,
    pub image: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePackage {
    pub name: Option<String>,
    pub destination: Option<String>,
    pub kind: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub seats: Option<i64>,
    pub seats_available: Option<i64>,
    pub price_adult: Option<f64>,
    pub price_child: Option<f64>,
    pub currency: Option<String>,
    pub fare: Option<String>,
    pub services: Option<String>,
    pub policies: Option<String>,
    pub image: Option<String>,
    pub notes: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CheckAvailability {
    pub party_size: i64,
}

pub async fn list_packages(State(pool): State<SqlitePool>) -> Result<Json<Vec<Package>>> {
    let packages = sqlx::query_as::<_, Package>(
        "SELECT * FROM packages WHERE active = 1 ORDER BY created_at DESC",
    )
    .fetch_all(&pool)
    .await?;
    Ok(Json(packages))
}

/// Packages that can still be sold: active and with open seats, soonest
/// departure first.
pub async fn available_packages(State(pool): State<SqlitePool>) -> Result<Json<Vec<Package>>> {
    let packages = sqlx::query_as::<_, Package>(
        "SELECT * FROM packages WHERE active = 1 AND seats_available > 0 ORDER BY start_date ASC",
    )
    .fetch_all(&pool)
    .await?;
    Ok(Json(packages))
}

pub async fn get_package(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<Package>> {
    let package = sqlx::query_as::<_, Package>("SELECT * FROM packages WHERE id = ?")
        .bind(&id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(package))
}

pub async fn create_package(
    State(pool): State<SqlitePool>,
    Json(input): Json<CreatePackage>,
) -> Result<Json<Package>> {
    let id = Uuid::new_v4().to_string();
    let now = now_epoch();
    let kind = PackageKind::from_str(input.kind.as_deref().unwrap_or_default());
    let seats = input.seats.unwrap_or(0);

    // A new package starts fully open: every seat is available.
    sqlx::query(
        "INSERT INTO packages
         (id, name, destination, kind, start_date, end_date, seats, seats_available,
          price_adult, price_child, currency, fare, services, policies, image, notes,
          active, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(&id)
    .bind(&input.name)
    .bind(&input.destination)
    .bind(kind.as_str())
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(seats)
    .bind(seats)
    .bind(input.price_adult.unwrap_or(0.0))
    .bind(input.price_child)
    .bind(input.currency.unwrap_or_else(|| "USD".to_string()))
    .bind(&input.fare)
    .bind(&input.services)
    .bind(&input.policies)
    .bind(&input.image)
    .bind(&input.notes)
    .bind(now)
    .bind(now)
    .execute(&pool)
    .await?;

    let package = sqlx::query_as::<_, Package>("SELECT * FROM packages WHERE id = ?")
        .bind(&id)
        .fetch_one(&pool)
        .await?;
    Ok(Json(package))
}

pub async fn update_package(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
    Json(input): Json<UpdatePackage>,
) -> Result<Json<Package>> {
    let existing = sqlx::query_as::<_, Package>("SELECT * FROM packages WHERE id = ?")
        .bind(&id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound)?;

    let kind = match input.kind {
        Some(kind) => PackageKind::from_str(&kind).as_str().to_string(),
        None => existing.kind,
    };

    sqlx::query(
        "UPDATE packages
         SET name = ?, destination = ?, kind = ?, start_date = ?, end_date = ?,
             seats = ?, seats_available = ?, price_adult = ?, price_child = ?,
             currency = ?, fare = ?, services = ?, policies = ?, image = ?, notes = ?,
             active = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(input.name.unwrap_or(existing.name))
    .bind(input.destination.unwrap_or(existing.destination))
    .bind(kind)
    .bind(input.start_date.or(existing.start_date))
    .bind(input.end_date.or(existing.end_date))
    .bind(input.seats.unwrap_or(existing.seats))
    .bind(input.seats_available.unwrap_or(existing.seats_available))
    .bind(input.price_adult.unwrap_or(existing.price_adult))
    .bind(input.price_child.or(existing.price_child))
    .bind(input.currency.unwrap_or(existing.currency))
    .bind(input.fare.or(existing.fare))
    .bind(input.services.or(existing.services))
    .bind(input.policies.or(existing.policies))
    .bind(input.image.or(existing.image))
    .bind(input.notes.or(existing.notes))
    .bind(input.active.unwrap_or(existing.active))
    .bind(now_epoch())
    .bind(&id)
    .execute(&pool)
    .await?;

    let package = sqlx::query_as::<_, Package>("SELECT * FROM packages WHERE id = ?")
        .bind(&id)
        .fetch_one(&pool)
        .await?;
    Ok(Json(package))
}

pub async fn delete_package(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let result =
        sqlx::query("UPDATE packages SET active = 0, updated_at = ? WHERE id = ? AND active = 1")
            .bind(now_epoch())
            .bind(&id)
            .execute(&pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(Json(json!({ "success": true })))
}

pub async fn check_availability(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
    Json(input): Json<CheckAvailability>,
) -> Result<Json<Availability>> {
    if input.party_size < 1 {
        return Err(AppError::Validation(
            "party_size must be at least 1".to_string(),
        ));
    }
    let availability =
        availability_service::check_availability(&pool, &id, input.party_size).await?;
    Ok(Json(availability))
}
