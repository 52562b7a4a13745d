use serde::{Deserialize, Serialize};

/// Client row. `travel_kinds` is stored as a JSON string array; the API layer
/// maps it to a real list.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
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
    pub travel_kinds: String,
    pub avg_budget: Option<String>,
    pub travel_frequency: Option<String>,
    pub total_leads: i64,
    pub converted_at: Option<i64>,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Client {
    pub fn travel_kinds_list(&self) -> Vec<String> {
        serde_json::from_str(&self.travel_kinds).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClientHistory {
    pub id: String,
    pub client_id: String,
    pub event: String,
    pub description: Option<String>,
    pub actor: String,
    pub created_at: i64,
}
