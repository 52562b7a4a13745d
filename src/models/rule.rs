use serde::{Deserialize, Serialize};

/// Auto-assignment rule: when a new lead's `condition_field` equals
/// `condition_value`, the lead goes to `seller_id`. Higher priority wins.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AssignmentRule {
    pub id: String,
    pub name: String,
    pub condition_field: String,
    pub condition_value: String,
    pub seller_id: String,
    pub priority: i64,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}
