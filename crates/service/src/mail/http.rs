use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, instrument};

use super::{EmailMessage, MailError, Mailer};

/// Delivers mail by POSTing JSON to a transactional mail API.
///
/// Body: `{"from","to","subject","html"}`, authenticated with a bearer key.
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

impl HttpMailer {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), api_url: api_url.into(), api_key: api_key.into(), from: from.into() }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    #[instrument(skip_all, fields(to = %message.to))]
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let body = SendRequest { from: &self.from, to: &message.to, subject: &message.subject, html: &message.html };
        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MailError::Rejected { status: status.as_u16(), body });
        }
        info!(status = status.as_u16(), "mail_sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::{HeaderMap, StatusCode}, routing::post, Json, Router};
    use std::sync::Arc;
    use tokio::{net::TcpListener, sync::Mutex};

    type Seen = Arc<Mutex<Vec<(Option<String>, serde_json::Value)>>>;

    async fn fake_api(status: StatusCode) -> anyhow::Result<(String, Seen)> {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .route(
                "/send",
                post(move |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                    let auth = headers.get("authorization").and_then(|v| v.to_str().ok()).map(str::to_string);
                    seen.lock().await.push((auth, body));
                    status
                }),
            )
            .with_state(Arc::clone(&seen));
        let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok((format!("http://{addr}/send"), seen))
    }

    #[tokio::test]
    async fn posts_json_with_bearer_key() -> anyhow::Result<()> {
        let (url, seen) = fake_api(StatusCode::ACCEPTED).await?;
        let mailer = HttpMailer::new(url, "key-123", "robot@example.com");
        let msg = EmailMessage { to: "u@example.com".into(), subject: "Hi".into(), html: "<b>x</b>".into() };
        mailer.send(&msg).await?;

        let seen = seen.lock().await;
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.as_deref(), Some("Bearer key-123"));
        assert_eq!(seen[0].1, serde_json::json!({"from": "robot@example.com", "to": "u@example.com", "subject": "Hi", "html": "<b>x</b>"}));
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() -> anyhow::Result<()> {
        let (url, _seen) = fake_api(StatusCode::UNPROCESSABLE_ENTITY).await?;
        let mailer = HttpMailer::new(url, "key", "robot@example.com");
        let msg = EmailMessage { to: "u@example.com".into(), subject: "Hi".into(), html: "x".into() };
        assert!(matches!(mailer.send(&msg).await, Err(MailError::Rejected { status: 422, .. })));
        Ok(())
    }
}
