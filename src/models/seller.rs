use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Seller {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub whatsapp: Option<String>,
    pub branch_id: Option<String>,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}
