//! Lead lifecycle: creation with rule-based auto-assignment, history trail,
//! conversion into a client, and the sales pipeline aggregate.

use chrono::{Datelike, Days, NaiveTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::now_epoch;
use crate::error::{AppError, Result};
use crate::models::lead::{Lead, LeadHistory, LeadStatus, NewLead};
use crate::models::rule::AssignmentRule;

pub async fn create_lead(pool: &SqlitePool, input: NewLead) -> Result<Lead> {
    let id = Uuid::new_v4().to_string();
    let now = now_epoch();
    let status = LeadStatus::from_str(input.status.as_deref().unwrap_or("new"))
        .as_str()
        .to_string();

    let mut assigned = input.assigned_seller_id.clone().filter(|s| !s.is_empty());
    let suggested = input.suggested_package_id.clone().filter(|s| !s.is_empty());

    let mut applied_rule = None;
    if assigned.is_none() {
        if let Some((seller_id, rule_name)) = auto_assign(pool, &input).await? {
            assigned = Some(seller_id);
            applied_rule = Some(rule_name);
        }
    }

    sqlx::query(
        "INSERT INTO leads
         (id, first_name, last_name, email, phone, country, city, inquiry_type, source,
          status, assigned_seller_id, suggested_package_id, internal_notes,
          entered_at, converted, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(&id)
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.country)
    .bind(&input.city)
    .bind(&input.inquiry_type)
    .bind(&input.source)
    .bind(&status)
    .bind(&assigned)
    .bind(&suggested)
    .bind(&input.internal_notes)
    .bind(now)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    add_history(pool, &id, "Lead created", None, Some("system")).await?;
    if let Some(rule_name) = applied_rule {
        add_history(
            pool,
            &id,
            "Seller assigned",
            Some(&format!("Assigned automatically by rule {rule_name}")),
            Some("system"),
        )
        .await?;
    }

    let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await?;
    Ok(lead)
}

pub async fn add_history(
    pool: &SqlitePool,
    lead_id: &str,
    action: &str,
    description: Option<&str>,
    actor: Option<&str>,
) -> Result<LeadHistory> {
    let id = Uuid::new_v4().to_string();
    let now = now_epoch();

    sqlx::query(
        "INSERT INTO lead_history (id, lead_id, action, description, actor, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(lead_id)
    .bind(action)
    .bind(description)
    .bind(actor.unwrap_or("user"))
    .bind(now)
    .execute(pool)
    .await?;

    let entry = sqlx::query_as::<_, LeadHistory>("SELECT * FROM lead_history WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await?;
    Ok(entry)
}

/// Mark a lead as converted and credit the client. Both rows change in one
/// transaction; converting twice is a validation error.
pub async fn convert_lead(pool: &SqlitePool, lead_id: &str, client_id: &str) -> Result<Lead> {
    let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = ?")
        .bind(lead_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)?;

    if lead.converted {
        return Err(AppError::Validation("lead is already converted".to_string()));
    }

    let client: Option<String> =
        sqlx::query_scalar("SELECT id FROM clients WHERE id = ? AND active = 1")
            .bind(client_id)
            .fetch_optional(pool)
            .await?;
    if client.is_none() {
        return Err(AppError::NotFound);
    }

    let now = now_epoch();
    let mut tx = pool.begin().await?;
    sqlx::query(
        "UPDATE leads SET converted = 1, client_id = ?, converted_at = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(client_id)
    .bind(now)
    .bind(now)
    .bind(lead_id)
    .execute(&mut *tx)
    .await?;
    sqlx::query(
        "UPDATE clients SET total_leads = total_leads + 1, converted_at = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(now)
    .bind(now)
    .bind(client_id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    add_history(pool, lead_id, "Lead converted to client", None, Some("system")).await?;
    sqlx::query(
        "INSERT INTO client_history (id, client_id, event, description, actor, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(client_id)
    .bind("Converted from lead")
    .bind(format!("{} {}", lead.first_name, lead.last_name))
    .bind("system")
    .bind(now)
    .execute(pool)
    .await?;

    let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = ?")
        .bind(lead_id)
        .fetch_one(pool)
        .await?;
    Ok(lead)
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PipelineRow {
    pub status: String,
    pub count: i64,
    pub new_this_week: i64,
    pub new_this_month: i64,
}

/// Open leads grouped by status, with fresh-this-week and fresh-this-month
/// counters. Week starts on Monday.
pub async fn pipeline(pool: &SqlitePool) -> Result<Vec<PipelineRow>> {
    let today = Utc::now().date_naive();
    let week_start = today
        .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))
        .unwrap_or(today);
    let month_start = today.with_day(1).unwrap_or(today);
    let week_epoch = week_start.and_time(NaiveTime::MIN).and_utc().timestamp();
    let month_epoch = month_start.and_time(NaiveTime::MIN).and_utc().timestamp();

    let rows = sqlx::query_as::<_, PipelineRow>(
        "SELECT status,
                COUNT(*) AS count,
                SUM(CASE WHEN entered_at >= ? THEN 1 ELSE 0 END) AS new_this_week,
                SUM(CASE WHEN entered_at >= ? THEN 1 ELSE 0 END) AS new_this_month
         FROM leads
         WHERE converted = 0
         GROUP BY status
         ORDER BY count DESC",
    )
    .bind(week_epoch)
    .bind(month_epoch)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn auto_assign(pool: &SqlitePool, lead: &NewLead) -> Result<Option<(String, String)>> {
    let rules = sqlx::query_as::<_, AssignmentRule>(
        "SELECT * FROM assignment_rules WHERE active = 1 ORDER BY priority DESC, created_at ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(matching_rule(&rules, lead).map(|r| (r.seller_id.clone(), r.name.clone())))
}

fn lead_field<'a>(lead: &'a NewLead, field: &str) -> Option<&'a str> {
    match field {
        "source" => Some(lead.source.as_str()),
        "inquiry_type" => Some(lead.inquiry_type.as_str()),
        "country" => lead.country.as_deref(),
        "city" => lead.city.as_deref(),
        _ => None,
    }
}

fn matching_rule<'a>(rules: &'a [AssignmentRule], lead: &NewLead) -> Option<&'a AssignmentRule> {
    rules.iter().find(|rule| {
        lead_field(lead, &rule.condition_field)
            .map_or(false, |value| value.eq_ignore_ascii_case(&rule.condition_value))
    })
}
