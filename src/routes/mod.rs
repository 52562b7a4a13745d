use std::sync::Arc;

use axum::extract::FromRef;
use axum::routing::get;
use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::AppState;

pub mod branches;
pub mod clients;
pub mod email;
pub mod inns;
pub mod leads;
pub mod packages;
pub mod rooms;
pub mod rules;
pub mod sellers;
pub mod settings;

/// All API routes, generic over the state so tests can assemble their own.
pub fn routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    SqlitePool: FromRef<S>,
    Arc<Config>: FromRef<S>,
{
    Router::new()
        .route(
            "/api/branches",
            get(branches::list_branches).post(branches::create_branch),
        )
        .route(
            "/api/branches/:id",
            get(branches::get_branch)
                .patch(branches::update_branch)
                .delete(branches::delete_branch),
        )
        .route(
            "/api/sellers",
            get(sellers::list_sellers).post(sellers::create_seller),
        )
        .route("/api/sellers/stats", get(sellers::seller_stats))
        .route(
            "/api/sellers/:id",
            get(sellers::get_seller)
                .patch(sellers::update_seller)
                .delete(sellers::delete_seller),
        )
        .route(
            "/api/packages",
            get(packages::list_packages).post(packages::create_package),
        )
        .route("/api/packages/available", get(packages::available_packages))
        .route(
            "/api/packages/:id",
            get(packages::get_package)
                .patch(packages::update_package)
                .delete(packages::delete_package),
        )
        .route(
            "/api/packages/:id/check-availability",
            axum::routing::post(packages::check_availability),
        )
        .route(
            "/api/clients",
            get(clients::list_clients).post(clients::create_client),
        )
        .route(
            "/api/clients/:id",
            get(clients::get_client)
                .patch(clients::update_client)
                .delete(clients::delete_client),
        )
        .route(
            "/api/clients/:id/history",
            get(clients::list_history).post(clients::add_history),
        )
        .route("/api/leads", get(leads::list_leads).post(leads::create_lead))
        .route("/api/leads/pipeline", get(leads::pipeline))
        .route(
            "/api/leads/:id",
            get(leads::get_lead)
                .patch(leads::update_lead)
                .delete(leads::delete_lead),
        )
        .route("/api/leads/:id/convert", axum::routing::post(leads::convert_lead))
        .route(
            "/api/leads/:id/history",
            get(leads::list_history).post(leads::add_history),
        )
        .route("/api/rules", get(rules::list_rules).post(rules::create_rule))
        .route(
            "/api/rules/:id",
            get(rules::get_rule)
                .patch(rules::update_rule)
                .delete(rules::delete_rule),
        )
        .route("/api/rooms", get(rooms::list_rooms).post(rooms::create_room))
        .route(
            "/api/rooms/:id",
            get(rooms::get_room)
                .patch(rooms::update_room)
                .delete(rooms::delete_room),
        )
        .route("/api/inns", get(inns::list_inns).post(inns::create_inn))
        .route(
            "/api/inns/:id",
            get(inns::get_inn).patch(inns::update_inn).delete(inns::delete_inn),
        )
        .route(
            "/api/settings/email",
            get(settings::get_email_settings).put(settings::put_email_settings),
        )
        .route("/api/email/send", axum::routing::post(email::send_email))
}

/// The full application: health probe, API routes, request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .merge(routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
