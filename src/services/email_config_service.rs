//! Email settings store. A single active SMTP profile backs every dispatch;
//! saving settings replaces that profile in place.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::now_epoch;
use crate::error::Result;
use crate::models::email_config::{EmailConfig, EmailConfigInput};

pub async fn get_active(pool: &SqlitePool) -> Result<Option<EmailConfig>> {
    let config = sqlx::query_as::<_, EmailConfig>("SELECT * FROM email_config WHERE active = 1")
        .fetch_optional(pool)
        .await?;
    Ok(config)
}

/// Update the active profile in place, or insert the first one. Runs in a
/// transaction so concurrent saves cannot leave two active rows; the partial
/// unique index on `active = 1` backs that up.
pub async fn upsert_active(pool: &SqlitePool, input: &EmailConfigInput) -> Result<EmailConfig> {
    let now = now_epoch();
    let mut tx = pool.begin().await?;

    let existing: Option<String> =
        sqlx::query_scalar("SELECT id FROM email_config WHERE active = 1")
            .fetch_optional(&mut *tx)
            .await?;

    let id = match existing {
        Some(id) => {
            sqlx::query(
                "UPDATE email_config
                 SET smtp_host = ?, smtp_port = ?, smtp_secure = ?, smtp_user = ?,
                     smtp_password = ?, email_from = ?, email_from_name = ?, updated_at = ?
                 WHERE id = ?",
            )
            .bind(&input.smtp_host)
            .bind(input.smtp_port)
            .bind(input.smtp_secure)
            .bind(&input.smtp_user)
            .bind(&input.smtp_password)
            .bind(&input.email_from)
            .bind(&input.email_from_name)
            .bind(now)
            .bind(&id)
            .execute(&mut *tx)
            .await?;
            id
        }
        None => {
            let id = Uuid::new_v4().to_string();
            sqlx::query(
                "INSERT INTO email_config
                 (id, smtp_host, smtp_port, smtp_secure, smtp_user, smtp_password,
                  email_from, email_from_name, active, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
            )
            .bind(&id)
            .bind(&input.smtp_host)
            .bind(input.smtp_port)
            .bind(input.smtp_secure)
            .bind(&input.smtp_user)
            .bind(&input.smtp_password)
            .bind(&input.email_from)
            .bind(&input.email_from_name)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            id
        }
    };

    tx.commit().await?;

    let config = sqlx::query_as::<_, EmailConfig>("SELECT * FROM email_config WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await?;
    Ok(config)
}
