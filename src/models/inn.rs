use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Inn {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub stars: i64,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub reference_price: f64,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}
