mod support;

use axum::http::StatusCode;
use axum::Router;
use serde_json::{json, Value};

use support::{send_json, test_app, test_pool};

async fn create_branch(app: &Router, name: &str, code: &str) -> String {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/branches",
        Some(json!({ "name": name, "code": code, "city": "Caracas" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

async fn create_seller(app: &Router, first: &str, branch_id: Option<&str>) -> String {
    let mut payload = json!({
        "first_name": first,
        "last_name": "Rojas",
        "email": format!("{}@marea.test", first.to_lowercase()),
    });
    if let Some(branch_id) = branch_id {
        payload["branch_id"] = json!(branch_id);
    }
    let (status, body) = send_json(app, "POST", "/api/sellers", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

async fn create_client(app: &Router, name: &str) -> String {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/clients",
        Some(json!({ "name": name, "email": "cliente@marea.test" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

async fn create_lead(app: &Router, source: &str, extra: Value) -> Value {
    let mut payload = json!({
        "first_name": "Ana",
        "last_name": "Paredes",
        "email": "ana@example.com",
        "inquiry_type": "paquete",
        "source": source,
    });
    if let Value::Object(extra) = extra {
        for (k, v) in extra {
            payload[k] = v;
        }
    }
    let (status, body) = send_json(app, "POST", "/api/leads", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn branch_crud_with_soft_delete() {
    let app = test_app(test_pool().await);

    let id = create_branch(&app, "Caracas Centro", "CCS").await;

    let (status, list) = send_json(&app, "GET", "/api/branches", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, updated) = send_json(
        &app,
        "PATCH",
        &format!("/api/branches/{id}"),
        Some(json!({ "name": "Caracas Este" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], json!("Caracas Este"));
    assert_eq!(updated["code"], json!("CCS"));

    let (status, deleted) = send_json(&app, "DELETE", &format!("/api/branches/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["success"], json!(true));

    // Gone from listings, still fetchable by id.
    let (_, list) = send_json(&app, "GET", "/api/branches", None).await;
    assert!(list.as_array().unwrap().is_empty());
    let (status, _) = send_json(&app, "GET", &format!("/api/branches/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(&app, "DELETE", &format!("/api/branches/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn seller_listing_resolves_branch_names() {
    let app = test_app(test_pool().await);

    let branch_id = create_branch(&app, "Valencia", "VLN").await;
    create_seller(&app, "Maria", Some(&branch_id)).await;
    create_seller(&app, "Pedro", None).await;

    let (status, list) = send_json(&app, "GET", "/api/sellers", None).await;
    assert_eq!(status, StatusCode::OK);
    let sellers = list.as_array().unwrap();
    assert_eq!(sellers.len(), 2);

    let maria = sellers
        .iter()
        .find(|s| s["first_name"] == json!("Maria"))
        .unwrap();
    assert_eq!(maria["branch_name"], json!("Valencia"));
    let pedro = sellers
        .iter()
        .find(|s| s["first_name"] == json!("Pedro"))
        .unwrap();
    assert!(pedro["branch_name"].is_null());
}

#[tokio::test]
async fn seller_stats_track_assigned_leads() {
    let app = test_app(test_pool().await);

    let seller_id = create_seller(&app, "Lucia", None).await;
    let first = create_lead(&app, "web", json!({ "assigned_seller_id": seller_id })).await;
    create_lead(&app, "web", json!({ "assigned_seller_id": seller_id })).await;

    let client_id = create_client(&app, "Carlos Blanco").await;
    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/api/leads/{}/convert", first["id"].as_str().unwrap()),
        Some(json!({ "client_id": client_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, stats) = send_json(&app, "GET", "/api/sellers/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    let row = stats
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] == json!(seller_id))
        .unwrap()
        .clone();
    assert_eq!(row["total_leads"], json!(2));
    assert_eq!(row["leads_converted"], json!(1));
    assert_eq!(row["conversion_rate"], json!(50.0));
}

#[tokio::test]
async fn new_packages_open_every_seat() {
    let app = test_app(test_pool().await);

    let (status, package) = send_json(
        &app,
        "POST",
        "/api/packages",
        Some(json!({
            "name": "Margarita 5D",
            "destination": "Isla Margarita",
            "kind": "flight_lodging",
            "seats": 10,
            "price_adult": 450.0,
            "start_date": "2026-10-01",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(package["seats"], json!(10));
    assert_eq!(package["seats_available"], json!(10));
    let id = package["id"].as_str().unwrap().to_string();

    let (_, available) = send_json(&app, "GET", "/api/packages/available", None).await;
    assert_eq!(available.as_array().unwrap().len(), 1);

    let (status, _) = send_json(
        &app,
        "PATCH",
        &format!("/api/packages/{id}"),
        Some(json!({ "seats_available": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, available) = send_json(&app, "GET", "/api/packages/available", None).await;
    assert!(available.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn availability_check_covers_seats_rooms_and_validation() {
    let app = test_app(test_pool().await);

    let (_, package) = send_json(
        &app,
        "POST",
        "/api/packages",
        Some(json!({
            "name": "Canaima Full",
            "destination": "Canaima",
            "kind": "flight_lodging",
            "seats": 10,
        })),
    )
    .await;
    let id = package["id"].as_str().unwrap().to_string();
    let check = format!("/api/packages/{id}/check-availability");

    let (_, room) = send_json(
        &app,
        "POST",
        "/api/rooms",
        Some(json!({ "name": "Cabana Familiar", "capacity": 4 })),
    )
    .await;
    assert!(room["id"].as_str().is_some());

    let (status, result) = send_json(&app, "POST", &check, Some(json!({ "party_size": 2 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["available"], json!(true));
    assert!(result.get("reason").is_none());

    let (status, result) = send_json(&app, "POST", &check, Some(json!({ "party_size": 12 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["available"], json!(false));
    assert!(result["reason"].as_str().unwrap().contains("seats"));

    let (status, result) = send_json(&app, "POST", &check, Some(json!({ "party_size": 5 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["available"], json!(false));
    assert!(result["reason"].as_str().unwrap().contains("room"));

    let (status, _) = send_json(&app, "POST", &check, Some(json!({ "party_size": 0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/packages/nope/check-availability",
        Some(json!({ "party_size": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Flight-only packages never look at rooms.
    let (_, flight) = send_json(
        &app,
        "POST",
        "/api/packages",
        Some(json!({
            "name": "Solo Vuelo CCS-MIA",
            "destination": "Miami",
            "kind": "flight_only",
            "seats": 6,
        })),
    )
    .await;
    let flight_id = flight["id"].as_str().unwrap();
    let (status, result) = send_json(
        &app,
        "POST",
        &format!("/api/packages/{flight_id}/check-availability"),
        Some(json!({ "party_size": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["available"], json!(true));

    // Lodging-only packages only care about a room that fits.
    let (_, lodging) = send_json(
        &app,
        "POST",
        "/api/packages",
        Some(json!({
            "name": "Posada Fin de Semana",
            "destination": "Choroni",
            "kind": "lodging_only",
        })),
    )
    .await;
    let lodging_id = lodging["id"].as_str().unwrap();
    let (status, result) = send_json(
        &app,
        "POST",
        &format!("/api/packages/{lodging_id}/check-availability"),
        Some(json!({ "party_size": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["available"], json!(true));
}

#[tokio::test]
async fn lead_auto_assignment_applies_matching_rule() {
    let app = test_app(test_pool().await);

    let seller_id = create_seller(&app, "Jose", None).await;
    let (status, _) = send_json(
        &app,
        "POST",
        "/api/rules",
        Some(json!({
            "name": "Instagram a Jose",
            "condition_field": "source",
            "condition_value": "instagram",
            "seller_id": seller_id,
            "priority": 10,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let lead = create_lead(&app, "Instagram", json!({})).await;
    assert_eq!(lead["assigned_seller_id"], json!(seller_id));

    let lead_id = lead["id"].as_str().unwrap();
    let (status, history) =
        send_json(&app, "GET", &format!("/api/leads/{lead_id}/history"), None).await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["action"].as_str().unwrap())
        .collect();
    assert!(actions.contains(&"Lead created"));
    assert!(actions.contains(&"Seller assigned"));

    // No matching rule: lead stays unassigned.
    let other = create_lead(&app, "walk-in", json!({})).await;
    assert!(other["assigned_seller_id"].is_null());
}

#[tokio::test]
async fn explicit_assignment_wins_over_rules() {
    let app = test_app(test_pool().await);

    let rule_seller = create_seller(&app, "Jose", None).await;
    let chosen_seller = create_seller(&app, "Marta", None).await;
    send_json(
        &app,
        "POST",
        "/api/rules",
        Some(json!({
            "name": "Instagram a Jose",
            "condition_field": "source",
            "condition_value": "instagram",
            "seller_id": rule_seller,
            "priority": 10,
        })),
    )
    .await;

    let lead = create_lead(
        &app,
        "Instagram",
        json!({ "assigned_seller_id": chosen_seller }),
    )
    .await;
    assert_eq!(lead["assigned_seller_id"], json!(chosen_seller));
}

#[tokio::test]
async fn status_change_stamps_interaction_and_history() {
    let app = test_app(test_pool().await);

    let lead = create_lead(&app, "web", json!({})).await;
    let id = lead["id"].as_str().unwrap().to_string();
    assert!(lead["last_interaction_at"].is_null());

    let (status, updated) = send_json(
        &app,
        "PATCH",
        &format!("/api/leads/{id}"),
        Some(json!({ "status": "in_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], json!("in_progress"));
    assert!(updated["last_interaction_at"].is_i64());

    let (_, history) = send_json(&app, "GET", &format!("/api/leads/{id}/history"), None).await;
    let actions: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["action"].as_str().unwrap())
        .collect();
    assert!(actions.contains(&"Status changed to in_progress"));

    // Same status again leaves no extra trail entry.
    let before = history.as_array().unwrap().len();
    send_json(
        &app,
        "PATCH",
        &format!("/api/leads/{id}"),
        Some(json!({ "status": "in_progress" })),
    )
    .await;
    let (_, history) = send_json(&app, "GET", &format!("/api/leads/{id}/history"), None).await;
    assert_eq!(history.as_array().unwrap().len(), before);
}

#[tokio::test]
async fn converting_a_lead_credits_the_client() {
    let app = test_app(test_pool().await);

    let lead = create_lead(&app, "web", json!({})).await;
    let lead_id = lead["id"].as_str().unwrap().to_string();
    let client_id = create_client(&app, "Carlos Blanco").await;

    let (status, converted) = send_json(
        &app,
        "POST",
        &format!("/api/leads/{lead_id}/convert"),
        Some(json!({ "client_id": client_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(converted["converted"], json!(true));
    assert_eq!(converted["client_id"], json!(client_id));
    assert!(converted["converted_at"].is_i64());

    let (_, detail) = send_json(&app, "GET", &format!("/api/clients/{client_id}"), None).await;
    assert_eq!(detail["total_leads"], json!(1));
    let events: Vec<&str> = detail["history"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["event"].as_str().unwrap())
        .collect();
    assert!(events.contains(&"Converted from lead"));

    // Converted leads drop off the board.
    let (_, list) = send_json(&app, "GET", "/api/leads", None).await;
    assert!(list.as_array().unwrap().is_empty());

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/leads/{lead_id}/convert"),
        Some(json!({ "client_id": client_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already converted"));
}

#[tokio::test]
async fn pipeline_groups_open_leads_by_status() {
    let app = test_app(test_pool().await);

    create_lead(&app, "web", json!({})).await;
    create_lead(&app, "web", json!({})).await;
    let quoted = create_lead(&app, "web", json!({ "status": "quoted" })).await;

    let (status, pipeline) = send_json(&app, "GET", "/api/leads/pipeline", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = pipeline.as_array().unwrap();
    let new_row = rows.iter().find(|r| r["status"] == json!("new")).unwrap();
    assert_eq!(new_row["count"], json!(2));
    assert_eq!(new_row["new_this_week"], json!(2));
    assert_eq!(new_row["new_this_month"], json!(2));
    let quoted_row = rows.iter().find(|r| r["status"] == json!("quoted")).unwrap();
    assert_eq!(quoted_row["count"], json!(1));

    // Conversion removes the lead from the pipeline.
    let client_id = create_client(&app, "Carlos Blanco").await;
    send_json(
        &app,
        "POST",
        &format!("/api/leads/{}/convert", quoted["id"].as_str().unwrap()),
        Some(json!({ "client_id": client_id })),
    )
    .await;

    let (_, pipeline) = send_json(&app, "GET", "/api/leads/pipeline", None).await;
    let rows = pipeline.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], json!("new"));
}

#[tokio::test]
async fn deleting_a_lead_removes_its_history() {
    let pool = test_pool().await;
    let app = test_app(pool.clone());

    let lead = create_lead(&app, "web", json!({})).await;
    let id = lead["id"].as_str().unwrap().to_string();

    let (status, _) = send_json(&app, "DELETE", &format!("/api/leads/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(&app, "GET", &format!("/api/leads/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let orphaned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lead_history WHERE lead_id = ?")
        .bind(&id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(orphaned, 0);
}

#[tokio::test]
async fn client_travel_kinds_round_trip_as_arrays() {
    let app = test_app(test_pool().await);

    let (status, client) = send_json(
        &app,
        "POST",
        "/api/clients",
        Some(json!({
            "name": "Luisa Mendez",
            "email": "luisa@example.com",
            "travel_kinds": ["playa", "aventura"],
            "avg_budget": "medio",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(client["travel_kinds"], json!(["playa", "aventura"]));
    assert_eq!(client["avg_budget"], json!("medio"));
    let id = client["id"].as_str().unwrap().to_string();

    let (_, updated) = send_json(
        &app,
        "PATCH",
        &format!("/api/clients/{id}"),
        Some(json!({ "travel_kinds": ["crucero"] })),
    )
    .await;
    assert_eq!(updated["travel_kinds"], json!(["crucero"]));

    let (status, entry) = send_json(
        &app,
        "POST",
        &format!("/api/clients/{id}/history"),
        Some(json!({ "event": "Llamada de seguimiento", "actor": "maria" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["actor"], json!("maria"));

    let (_, detail) = send_json(&app, "GET", &format!("/api/clients/{id}"), None).await;
    assert_eq!(detail["travel_kinds"], json!(["crucero"]));
    assert_eq!(detail["history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn rules_list_is_active_only_by_priority() {
    let app = test_app(test_pool().await);
    let seller_id = create_seller(&app, "Jose", None).await;

    let (_, low) = send_json(
        &app,
        "POST",
        "/api/rules",
        Some(json!({
            "name": "Web general",
            "condition_field": "source",
            "condition_value": "web",
            "seller_id": seller_id,
            "priority": 5,
        })),
    )
    .await;
    send_json(
        &app,
        "POST",
        "/api/rules",
        Some(json!({
            "name": "Instagram prioritario",
            "condition_field": "source",
            "condition_value": "instagram",
            "seller_id": seller_id,
            "priority": 10,
        })),
    )
    .await;

    let (_, list) = send_json(&app, "GET", "/api/rules", None).await;
    let rules = list.as_array().unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0]["name"], json!("Instagram prioritario"));

    let low_id = low["id"].as_str().unwrap();
    send_json(
        &app,
        "PATCH",
        &format!("/api/rules/{low_id}"),
        Some(json!({ "active": false })),
    )
    .await;

    let (_, list) = send_json(&app, "GET", "/api/rules", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn rooms_and_inns_are_hard_deleted() {
    let app = test_app(test_pool().await);

    let (status, room) = send_json(
        &app,
        "POST",
        "/api/rooms",
        Some(json!({ "name": "Doble Vista Mar", "capacity": 2, "price_per_night": 80.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let room_id = room["id"].as_str().unwrap().to_string();

    let (status, inn) = send_json(
        &app,
        "POST",
        "/api/inns",
        Some(json!({ "name": "Posada El Faro", "location": "Choroni", "stars": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let inn_id = inn["id"].as_str().unwrap().to_string();

    let (_, updated) = send_json(
        &app,
        "PATCH",
        &format!("/api/rooms/{room_id}"),
        Some(json!({ "price_per_night": 95.0 })),
    )
    .await;
    assert_eq!(updated["price_per_night"], json!(95.0));

    let (status, _) = send_json(&app, "DELETE", &format!("/api/rooms/{room_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send_json(&app, "GET", &format!("/api/rooms/{room_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(&app, "DELETE", &format!("/api/inns/{inn_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = send_json(&app, "GET", "/api/inns", None).await;
    assert!(list.as_array().unwrap().is_empty());
}
