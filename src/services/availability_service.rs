//! Availability checks. A package with a flight leg needs enough open
//! seats; a package with lodging needs at least one room that fits the
//! whole group. Advisory only, nothing gets reserved here.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::{AppError, Result};
use crate::models::package::Package;

#[derive(Debug, Serialize)]
pub struct Availability {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub async fn check_availability(
    pool: &SqlitePool,
    package_id: &str,
    party_size: i64,
) -> Result<Availability> {
    let package = sqlx::query_as::<_, Package>("SELECT * FROM packages WHERE id = ? AND active = 1")
        .bind(package_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)?;

    if package.kind().includes_flight() && package.seats_available < party_size {
        return Ok(Availability {
            available: false,
            reason: Some(format!(
                "Not enough seats available. Seats left: {}",
                package.seats_available
            )),
        });
    }

    if package.kind().includes_lodging() {
        let fitting_rooms: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM rooms WHERE active = 1 AND capacity >= ?")
                .bind(party_size)
                .fetch_one(pool)
                .await?;
        if fitting_rooms == 0 {
            return Ok(Availability {
                available: false,
                reason: Some(format!("No room can host a group of {party_size}")),
            });
        }
    }

    Ok(Availability {
        available: true,
        reason: None,
    })
}
