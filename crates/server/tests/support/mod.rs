#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use configs::AppConfig;
use serde_json::Value;
use service::{auth::repository::mock::InMemoryUserRepository, mail::mock::RecordingMailer};
use tower::Service;
use uuid::Uuid;

pub struct TestApp {
    pub app: Router,
    pub users: Arc<InMemoryUserRepository>,
    pub mailer: Arc<RecordingMailer>,
    pub dir: PathBuf,
}

/// Router over an in-memory user store, a recording mailer and a scratch directory.
pub async fn spawn_app() -> anyhow::Result<TestApp> {
    let dir = std::env::temp_dir().join(format!("contacts_api_test_{}", Uuid::new_v4()));
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_secret = "test-secret".into();
    cfg.mail.public_base_url = "http://localhost:8080".into();
    cfg.storage.contacts_path = dir.join("data").join("contacts.json");
    cfg.storage.public_dir = dir.join("public");
    cfg.storage.avatars_dir = dir.join("public").join("avatars");
    cfg.storage.tmp_dir = dir.join("tmp");

    let users = Arc::new(InMemoryUserRepository::default());
    let mailer = Arc::new(RecordingMailer::default());
    let state = server::startup::build_state(&cfg, users.clone(), mailer.clone()).await?;
    Ok(TestApp { app: server::startup::build_app(state), users, mailer, dir })
}

impl TestApp {
    pub async fn call(&self, req: Request<Body>) -> anyhow::Result<Response> {
        Ok(self.app.clone().call(req).await?)
    }

    pub async fn send_json(&self, method: &str, uri: &str, token: Option<&str>, body: Value) -> anyhow::Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri).header("content-type", "application/json");
        if let Some(t) = token {
            builder = builder.header("authorization", format!("Bearer {t}"));
        }
        let resp = self.call(builder.body(Body::from(serde_json::to_vec(&body)?))?).await?;
        read_json(resp).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> anyhow::Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(t) = token {
            builder = builder.header("authorization", format!("Bearer {t}"));
        }
        let resp = self.call(builder.body(Body::empty())?).await?;
        read_json(resp).await
    }

    /// Token from the most recent verification email.
    pub async fn last_verification_token(&self) -> Option<String> {
        let sent = self.mailer.sent().await;
        let html = &sent.last()?.html;
        let start = html.find("/users/verify/")? + "/users/verify/".len();
        let rest = &html[start..];
        let end = rest.find('"')?;
        Some(rest[..end].to_string())
    }

    /// Sign up, verify and log in; returns the session token.
    pub async fn verified_session(&self, email: &str, password: &str) -> anyhow::Result<String> {
        let body = serde_json::json!({ "email": email, "password": password });
        let (status, _) = self.send_json("POST", "/users/signup", None, body.clone()).await?;
        assert_eq!(status, StatusCode::CREATED);
        let vt = self.last_verification_token().await.expect("verification mail");
        let (status, _) = self.get(&format!("/users/verify/{vt}"), None).await?;
        assert_eq!(status, StatusCode::OK);
        let (status, json) = self.send_json("POST", "/users/login", None, body).await?;
        assert_eq!(status, StatusCode::OK);
        Ok(json["token"].as_str().expect("token").to_string())
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

/// Body as JSON; an empty body reads as `Null`.
pub async fn read_json(resp: Response) -> anyhow::Result<(StatusCode, Value)> {
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    if bytes.is_empty() {
        return Ok((status, Value::Null));
    }
    Ok((status, serde_json::from_slice(&bytes)?))
}
