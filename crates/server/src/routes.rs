use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::auth::{self, ServerState};
use crate::openapi::ApiDoc;

pub mod contacts;
pub mod users;

/// Upper bound for avatar uploads.
pub const AVATAR_BODY_LIMIT: usize = 5 * 1024 * 1024;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: health, users, contacts, static avatars and docs.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let avatars = ServeDir::new(state.avatars.avatars_dir());

    // Public routes
    let public = Router::new()
        .route("/health", get(health))
        .route("/users/signup", post(users::signup))
        .route("/users/login", post(users::login))
        .route("/users/verify/:verification_token", get(users::verify))
        .route("/users/verify", post(users::resend_verification));

    // Routes requiring a live session token
    let private = Router::new()
        .route("/users/logout", get(users::logout))
        .route("/users/current", get(users::current))
        .route("/users", patch(users::update_subscription))
        .route(
            "/users/avatars",
            patch(users::update_avatar).layer(DefaultBodyLimit::max(AVATAR_BODY_LIMIT)),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_user));

    let contacts = Router::new()
        .route("/api/contacts", get(contacts::list).post(contacts::create))
        .route(
            "/api/contacts/:id",
            get(contacts::get).put(contacts::update).delete(contacts::delete),
        );

    public
        .merge(private)
        .merge(contacts)
        .with_state(state)
        .nest_service("/avatars", avatars)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
