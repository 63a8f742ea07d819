use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::{
    auth::{
        repo::seaorm::SeaOrmUserRepository,
        repository::{mock::InMemoryUserRepository, UserRepository},
        service::{AuthConfig, AuthService},
        token::TokenIssuer,
    },
    avatar::AvatarProcessor,
    contacts::ContactsService,
    mail::{http::HttpMailer, LogMailer, Mailer},
    runtime,
};

use crate::{auth::ServerState, routes};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Pick the mail transport: HTTP API when configured, otherwise log only.
pub fn build_mailer(cfg: &AppConfig) -> Arc<dyn Mailer> {
    match &cfg.mail.api_url {
        Some(url) => Arc::new(HttpMailer::new(
            url.clone(),
            cfg.mail.api_key.clone().unwrap_or_default(),
            cfg.mail.from.clone(),
        )),
        None => Arc::new(LogMailer { from: cfg.mail.from.clone() }),
    }
}

/// Postgres-backed accounts when a database URL is configured, in-memory otherwise.
pub async fn build_user_repository(cfg: &AppConfig) -> anyhow::Result<Arc<dyn UserRepository>> {
    if !cfg.database.is_configured() {
        warn!(event = "in_memory_users", "no database url configured; accounts are kept in memory");
        return Ok(Arc::new(InMemoryUserRepository::default()));
    }
    let db = models::db::connect_and_migrate(&cfg.database).await?;
    Ok(Arc::new(SeaOrmUserRepository { db }))
}

/// Prepare storage directories and wire the services behind the router.
pub async fn build_state(
    cfg: &AppConfig,
    users: Arc<dyn UserRepository>,
    mailer: Arc<dyn Mailer>,
) -> anyhow::Result<ServerState> {
    let storage = &cfg.storage;
    runtime::ensure_env(&storage.public_dir, &storage.contacts_path, &storage.avatars_dir, &storage.tmp_dir).await?;

    let contacts = ContactsService::open(storage.contacts_path.clone()).await?;
    let tokens = TokenIssuer::new(&cfg.auth.jwt_secret, Duration::from_secs(cfg.auth.token_ttl_secs));
    let auth = AuthService::new(
        users,
        mailer,
        tokens,
        AuthConfig { public_base_url: cfg.mail.public_base_url.trim_end_matches('/').to_string() },
    );
    let avatars = AvatarProcessor::new(storage.tmp_dir.clone(), storage.avatars_dir.clone());

    Ok(ServerState { auth: Arc::new(auth), contacts, avatars: Arc::new(avatars) })
}

/// Build the complete application from a ready state.
pub fn build_app(state: ServerState) -> Router {
    routes::build_router(state, build_cors())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, draining connections");
}

/// Public entry: connect the database, build the app and serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let users = build_user_repository(&cfg).await?;
    let mailer = build_mailer(&cfg);

    let state = build_state(&cfg, users, mailer).await?;
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, event = "listening", "starting http server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::auth::domain::SignupInput;

    #[tokio::test]
    async fn runs_without_database_url() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("contacts_api_startup_{}", uuid::Uuid::new_v4()));
        let mut cfg = AppConfig::default();
        cfg.auth.jwt_secret = "test-secret".into();
        cfg.storage.contacts_path = dir.join("data/contacts.json");
        cfg.storage.public_dir = dir.join("public");
        cfg.storage.avatars_dir = dir.join("public/avatars");
        cfg.storage.tmp_dir = dir.join("tmp");

        let users = build_user_repository(&cfg).await?;
        let state = build_state(&cfg, users, build_mailer(&cfg)).await?;
        let user = state
            .auth
            .signup(SignupInput { email: "local@example.com".into(), password: "secret1".into() })
            .await?;
        assert_eq!(user.email, "local@example.com");

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
