use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    InProgress,
    Quoted,
    ClosedWon,
    ClosedLost,
}

impl LeadStatus {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "in_progress" => Self::InProgress,
            "quoted" => Self::Quoted,
            "closed_won" => Self::ClosedWon,
            "closed_lost" => Self::ClosedLost,
            _ => Self::New,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Quoted => "quoted",
            Self::ClosedWon => "closed_won",
            Self::ClosedLost => "closed_lost",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lead {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub inquiry_type: String,
    pub source: String,
    pub status: String,
    pub assigned_seller_id: Option<String>,
    pub suggested_package_id: Option<String>,
    pub internal_notes: Option<String>,
    pub entered_at: i64,
    pub last_interaction_at: Option<i64>,
    pub converted: bool,
    pub client_id: Option<String>,
    pub converted_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Payload for creating a lead. Seller assignment is optional; when absent the
/// active assignment rules decide.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLead {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub inquiry_type: String,
    pub source: String,
    pub status: Option<String>,
    pub assigned_seller_id: Option<String>,
    pub suggested_package_id: Option<String>,
    pub internal_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeadHistory {
    pub id: String,
    pub lead_id: String,
    pub action: String,
    pub description: Option<String>,
    pub actor: String,
    pub created_at: i64,
}
