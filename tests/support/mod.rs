#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tower::ServiceExt;

use marea_crm::config::Config;
use marea_crm::{db, routes, AppState};

pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::run_migrations(&pool).await.unwrap();
    pool
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        port: 0,
        smtp_timeout_secs: 2,
    }
}

pub fn test_app(pool: SqlitePool) -> Router {
    routes::app(AppState {
        pool,
        config: Arc::new(test_config()),
    })
}

pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    read_json(response).await
}

pub async fn send_multipart(
    app: &Router,
    uri: &str,
    boundary: &str,
    body: Vec<u8>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    read_json(response).await
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };
    (status, value)
}

/// Raw multipart/form-data body with the given text fields and file parts.
pub fn multipart_body(
    boundary: &str,
    fields: &[(&str, &str)],
    files: &[(&str, &str, &[u8])],
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    for (name, filename, content) in files {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

/// Store an SMTP profile pointing at the given relay.
pub async fn seed_email_config(app: &Router, relay_addr: SocketAddr) {
    let (status, _) = send_json(
        app,
        "PUT",
        "/api/settings/email",
        Some(json!({
            "smtp_host": "127.0.0.1",
            "smtp_port": relay_addr.port(),
            "smtp_secure": false,
            "smtp_user": "crm@test",
            "smtp_password": "secret",
            "email_from": "noreply@marea.test",
            "email_from_name": "Marea CRM",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

/// True when the base64 encoding of `content` appears in the raw message,
/// ignoring the line wrapping of the transfer encoding.
pub fn mime_contains_bytes(raw: &str, content: &[u8]) -> bool {
    let encoded = STANDARD.encode(content);
    let flat: String = raw.chars().filter(|c| *c != '\r' && *c != '\n').collect();
    flat.contains(&encoded)
}

/// In-process SMTP server speaking just enough of the protocol for lettre:
/// greets, advertises AUTH, accepts (or rejects) credentials and records
/// everything submitted via DATA.
pub struct StubRelay {
    pub addr: SocketAddr,
    messages: Arc<Mutex<Vec<String>>>,
    connections: Arc<AtomicUsize>,
}

impl StubRelay {
    pub async fn captured(&self) -> Vec<String> {
        self.messages.lock().await.clone()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

pub async fn start_stub_relay(reject_auth: bool) -> StubRelay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let messages = Arc::new(Mutex::new(Vec::new()));
    let connections = Arc::new(AtomicUsize::new(0));

    let task_messages = messages.clone();
    let task_connections = connections.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            task_connections.fetch_add(1, Ordering::SeqCst);
            let messages = task_messages.clone();
            tokio::spawn(async move {
                let _ = serve_session(stream, messages, reject_auth).await;
            });
        }
    });

    StubRelay {
        addr,
        messages,
        connections,
    }
}

async fn serve_session(
    stream: TcpStream,
    messages: Arc<Mutex<Vec<String>>>,
    reject_auth: bool,
) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    writer.write_all(b"220 stub ESMTP ready\r\n").await?;

    let mut in_data = false;
    let mut current = String::new();

    while let Some(line) = lines.next_line().await? {
        if in_data {
            if line == "." {
                messages.lock().await.push(current.clone());
                current.clear();
                in_data = false;
                writer.write_all(b"250 2.0.0 OK queued\r\n").await?;
            } else {
                current.push_str(&line);
                current.push_str("\r\n");
            }
            continue;
        }

        let upper = line.to_uppercase();
        if upper.starts_with("EHLO") || upper.starts_with("HELO") {
            writer
                .write_all(b"250-stub greets you\r\n250-AUTH PLAIN LOGIN\r\n250 OK\r\n")
                .await?;
        } else if upper.starts_with("AUTH") {
            if reject_auth {
                writer
                    .write_all(b"535 5.7.8 Authentication credentials invalid\r\n")
                    .await?;
            } else {
                writer
                    .write_all(b"235 2.7.0 Authentication successful\r\n")
                    .await?;
            }
        } else if upper.starts_with("MAIL FROM") || upper.starts_with("RCPT TO") {
            writer.write_all(b"250 OK\r\n").await?;
        } else if upper == "DATA" {
            in_data = true;
            writer
                .write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n")
                .await?;
        } else if upper == "QUIT" {
            writer.write_all(b"221 Bye\r\n").await?;
            break;
        } else {
            writer.write_all(b"250 OK\r\n").await?;
        }
    }
    Ok(())
}
