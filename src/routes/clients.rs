use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::now_epoch;
use crate::error::{AppError, Result};
use crate::models::client::{Client, ClientHistory};

#[derive(Debug, Deserialize)]
pub struct CreateClient {
    pub name: String,
    pub email: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub client_type: Option<String>,
    pub document_type: Option<String>,
    pub document_id: Option<String>,
    pub preferred_destinations: Option<String>,
    pub travel_kinds: Option<Vec<String>>,
    pub avg_budget: Option<String>,
    pub travel_frequency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateClient {
    pub name: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub client_type: Option<String>,
    pub document_type: Option<String>,
    pub document_id: Option<String>,
    pub preferred_destinations: Option<String>,
    pub travel_kinds: Option<Vec<String>>,
    pub avg_budget: Option<String>,
    pub travel_frequency: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct NewHistoryEntry {
    pub event: String,
    pub description: Option<String>,
    pub actor: Option<String>,
}

/// API shape of a client: `travel_kinds` goes out as a real array instead of
/// the stored JSON string.
#[derive(Debug, Serialize)]
pub struct ClientResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub client_type: Option<String>,
    pub document_type: Option<String>,
    pub document_id: Option<String>,
    pub preferred_destinations: Option<String>,
    pub travel_kinds: Vec<String>,
    pub avg_budget: Option<String>,
    pub travel_frequency: Option<String>,
    pub total_leads: i64,
    pub converted_at: Option<i64>,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        let travel_kinds = client.travel_kinds_list();
        Self {
            id: client.id,
            name: client.name,
            email: client.email,
            city: client.city,
            country: client.country,
            phone: client.phone,
            whatsapp: client.whatsapp,
            client_type: client.client_type,
            document_type: client.document_type,
            document_id: client.document_id,
            preferred_destinations: client.preferred_destinations,
            travel_kinds,
            avg_budget: client.avg_budget,
            travel_frequency: client.travel_frequency,
            total_leads: client.total_leads,
            converted_at: client.converted_at,
            active: client.active,
            created_at: client.created_at,
            updated_at: client.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClientDetail {
    #[serde(flatten)]
    pub client: ClientResponse,
    pub history: Vec<ClientHistory>,
}

fn encode_kinds(kinds: &[String]) -> String {
    serde_json::to_string(kinds).unwrap_or_else(|_| "[]".to_string())
}

pub async fn list_clients(State(pool): State<SqlitePool>) -> Result<Json<Vec<ClientResponse>>> {
    let clients = sqlx::query_as::<_, Client>(
        "SELECT * FROM clients WHERE active = 1 ORDER BY created_at DESC",
    )
    .fetch_all(&pool)
    .await?;
    Ok(Json(clients.into_iter().map(ClientResponse::from).collect()))
}

pub async fn get_client(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<ClientDetail>> {
    let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = ?")
        .bind(&id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound)?;

    let history = sqlx::query_as::<_, ClientHistory>(
        "SELECT * FROM client_history WHERE client_id = ? ORDER BY created_at DESC",
    )
    .bind(&id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(ClientDetail {
        client: client.into(),
        history,
    }))
}

pub async fn create_client(
    State(pool): State<SqlitePool>,
    Json(input): Json<CreateClient>,
) -> Result<Json<ClientResponse>> {
    let id = Uuid::new_v4().to_string();
    let now = now_epoch();
    let travel_kinds = encode_kinds(input.travel_kinds.as_deref().unwrap_or_default());

    sqlx::query(
        "INSERT INTO clients
         (id, name, email, city, country, phone, whatsapp, client_type, document_type,
          document_id, preferred_destinations, travel_kinds, avg_budget, travel_frequency,
          total_leads, active, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 1, ?, ?)",
    )
    .bind(&id)
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.city)
    .bind(&input.country)
    .bind(&input.phone)
    .bind(&input.whatsapp)
    .bind(&input.client_type)
    .bind(&input.document_type)
    .bind(&input.document_id)
    .bind(&input.preferred_destinations)
    .bind(&travel_kinds)
    .bind(&input.avg_budget)
    .bind(&input.travel_frequency)
    .bind(now)
    .bind(now)
    .execute(&pool)
    .await?;

    let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = ?")
        .bind(&id)
        .fetch_one(&pool)
        .await?;
    Ok(Json(client.into()))
}

pub async fn update_client(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
    Json(input): Json<UpdateClient>,
) -> Result<Json<ClientResponse>> {
    let existing = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = ?")
        .bind(&id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound)?;

    let travel_kinds = match input.travel_kinds {
        Some(kinds) => encode_kinds(&kinds),
        None => existing.travel_kinds,
    };

    sqlx::query(
        "UPDATE clients
         SET name = ?, email = ?, city = ?, country = ?, phone = ?, whatsapp = ?,
             client_type = ?, document_type = ?, document_id = ?, preferred_destinations = ?,
             travel_kinds = ?, avg_budget = ?, travel_frequency = ?, active = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(input.name.unwrap_or(existing.name))
    .bind(input.email.unwrap_or(existing.email))
    .bind(input.city.or(existing.city))
    .bind(input.country.or(existing.country))
    .bind(input.phone.or(existing.phone))
    .bind(input.whatsapp.or(existing.whatsapp))
    .bind(input.client_type.or(existing.client_type))
    .bind(input.document_type.or(existing.document_type))
    .bind(input.document_id.or(existing.document_id))
    .bind(input.preferred_destinations.or(existing.preferred_destinations))
    .bind(&travel_kinds)
    .bind(input.avg_budget.or(existing.avg_budget))
    .bind(input.travel_frequency.or(existing.travel_frequency))
    .bind(input.active.unwrap_or(existing.active))
    .bind(now_epoch())
    .bind(&id)
    .execute(&pool)
    .await?;

    let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = ?")
        .bind(&id)
        .fetch_one(&pool)
        .await?;
    Ok(Json(client.into()))
}

pub async fn delete_client(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let result =
        sqlx::query("UPDATE clients SET active = 0, updated_at = ? WHERE id = ? AND active = 1")
            .bind(now_epoch())
            .bind(&id)
            .execute(&pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(Json(json!({ "success": true })))
}

pub async fn list_history(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ClientHistory>>> {
    ensure_client_exists(&pool, &id).await?;
    let history = sqlx::query_as::<_, ClientHistory>(
        "SELECT * FROM client_history WHERE client_id = ? ORDER BY created_at DESC",
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
) -> Result<Json<ClientHistory>> {
    ensure_client_exists(&pool, &id).await?;

    let entry_id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO client_history (id, client_id, event, description, actor, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&entry_id)
    .bind(&id)
    .bind(&input.event)
    .bind(&input.description)
    .bind(input.actor.as_deref().unwrap_or("user"))
    .bind(now_epoch())
    .execute(&pool)
    .await?;

    let entry = sqlx::query_as::<_, ClientHistory>("SELECT * FROM client_history WHERE id = ?")
        .bind(&entry_id)
        .fetch_one(&pool)
        .await?;
    Ok(Json(entry))
}

async fn ensure_client_exists(pool: &SqlitePool, id: &str) -> Result<()> {
    let exists: Option<String> = sqlx::query_scalar("SELECT id FROM clients WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    exists.map(|_| ()).ok_or(AppError::NotFound)
}
