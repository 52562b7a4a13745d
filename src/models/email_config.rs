use serde::{Deserialize, Serialize};

/// The single active SMTP profile. `smtp_secure` selects implicit TLS on
/// connect; otherwise STARTTLS is negotiated opportunistically.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmailConfig {
    pub id: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_secure: bool,
    pub smtp_user: String,
    #[serde(skip_serializing)]
    pub smtp_password: String,
    pub email_from: String,
    pub email_from_name: String,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfigInput {
    pub smtp_host: String,
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_secure: bool,
    pub smtp_user: String,
    pub smtp_password: String,
    pub email_from: String,
    pub email_from_name: String,
}
