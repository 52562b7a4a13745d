use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use marea_crm::config::Config;
use marea_crm::{db, routes, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,marea_crm=debug")),
        )
        .init();

    let config = Config::from_env();
    let db_url = normalize_sqlite_url(&config.database_url);

    // File-backed sqlite fails to open on some setups unless the file exists
    if let Some(path) = db_file_path(&db_url) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        if !path.exists() {
            std::fs::File::create(&path).ok();
        }
    }

    let pool = sqlx::SqlitePool::connect(&db_url).await?;

    if let Err(e) = db::run_migrations(&pool).await {
        let msg = e.to_string();
        if msg.contains("already exists") {
            tracing::info!("migration benign: {msg}");
        } else {
            return Err(e);
        }
    }

    let port = config.port;
    let state = AppState {
        pool,
        config: Arc::new(config),
    };
    let app = routes::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;
    let ctrl_c = async {
        signal::ctrl_c().await.ok();
    };
    #[cfg(unix)]
    let term = async {
        if let Ok(mut s) = signal::unix::signal(signal::unix::SignalKind::terminate()) {
            s.recv().await;
        }
    };
    #[cfg(not(unix))]
    let term = std::future::pending::<()>();
    tokio::select! { _ = ctrl_c => {}, _ = term => {} }
}

// Accept sqlite:foo.db, file:foo.db or a bare path and produce sqlite://path.
fn normalize_sqlite_url(input: &str) -> String {
    if input.starts_with("sqlite://") || input.starts_with("sqlite::memory:") {
        return input.to_string();
    }
    if input.starts_with("sqlite:") {
        let rest = input.trim_start_matches("sqlite:");
        return format!("sqlite://{}", rest.trim_start_matches('/'));
    }
    if input.starts_with("file:") {
        return format!("sqlite://{}", input.trim_start_matches("file:"));
    }
    format!("sqlite://{input}")
}

fn db_file_path(url: &str) -> Option<std::path::PathBuf> {
    if let Some(rest) = url.strip_prefix("sqlite://") {
        if rest == ":memory:" {
            return None;
        }
        return Some(std::path::PathBuf::from(rest));
    }
    None
}
