//! Caller-side dispatch helper. A thin client for the send endpoint that
//! never returns `Err`: failures land in the outcome and in `last_error`,
//! and `is_sending` reports an in-flight request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use reqwest::multipart::{Form, Part};
use serde::Serialize;

pub struct DispatchClient {
    http: reqwest::Client,
    endpoint: String,
    sending: AtomicBool,
    last_error: Mutex<Option<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl DispatchOutcome {
    fn failed(error: String) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error),
        }
    }
}

impl DispatchClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/api/email/send", base_url.trim_end_matches('/')),
            sending: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    /// Whether a send is currently in flight.
    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::SeqCst)
    }

    /// The error of the most recent failed send, cleared when a new send
    /// starts.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().ok().and_then(|guard| guard.clone())
    }

    pub async fn send(&self, email: &OutgoingEmail) -> DispatchOutcome {
        self.begin();
        let outcome = match self.http.post(&self.endpoint).json(email).send().await {
            Ok(response) => read_outcome(response).await,
            Err(e) => DispatchOutcome::failed(format!("Request failed: {e}")),
        };
        self.finish(outcome)
    }

    pub async fn send_with_attachments(
        &self,
        email: &OutgoingEmail,
        attachments: Vec<(String, Vec<u8>)>,
    ) -> DispatchOutcome {
        self.begin();

        let mut form = Form::new()
            .text("to", email.to.clone())
            .text("subject", email.subject.clone());
        if let Some(html) = &email.html {
            form = form.text("html", html.clone());
        }
        if let Some(text) = &email.text {
            form = form.text("text", text.clone());
        }
        form = form.text("attachmentCount", attachments.len().to_string());
        for (index, (filename, content)) in attachments.into_iter().enumerate() {
            form = form.part(
                format!("attachment_{index}"),
                Part::bytes(content).file_name(filename),
            );
        }

        let outcome = match self.http.post(&self.endpoint).multipart(form).send().await {
            Ok(response) => read_outcome(response).await,
            Err(e) => DispatchOutcome::failed(format!("Request failed: {e}")),
        };
        self.finish(outcome)
    }

    fn begin(&self) {
        self.sending.store(true, Ordering::SeqCst);
        self.set_error(None);
    }

    fn finish(&self, outcome: DispatchOutcome) -> DispatchOutcome {
        if let Some(error) = &outcome.error {
            tracing::warn!(%error, "email dispatch failed");
            self.set_error(Some(error.clone()));
        }
        self.sending.store(false, Ordering::SeqCst);
        outcome
    }

    fn set_error(&self, error: Option<String>) {
        if let Ok(mut guard) = self.last_error.lock() {
            *guard = error;
        }
    }
}

async fn read_outcome(response: reqwest::Response) -> DispatchOutcome {
    let status = response.status();
    let body: serde_json::Value = match response.json().await {
        Ok(v) => v,
        Err(e) => return DispatchOutcome::failed(format!("Invalid response: {e}")),
    };

    if status.is_success() {
        let message_id = body
            .get("messageId")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        DispatchOutcome {
            success: true,
            message_id,
            error: None,
        }
    } else {
        let error = body.get("error").and_then(|v| v.as_str()).map_or_else(
            || format!("Request failed with status {status}"),
            str::to_string,
        );
        DispatchOutcome::failed(error)
    }
}
