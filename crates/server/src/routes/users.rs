use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use common::types::Message;
use models::user::Subscription;
use serde::Serialize;
use service::auth::domain::{AuthSession, LoginInput, PublicUser, ResendVerificationInput, SignupInput, SubscriptionInput};
use tracing::info;

use crate::{
    auth::{CurrentUser, ServerState},
    errors::ApiError,
};

/// Multipart field carrying the avatar image.
pub const AVATAR_FIELD: &str = "avatar";

#[derive(Serialize)]
pub struct SignupResponse {
    pub user: PublicUser,
}

#[derive(Serialize)]
pub struct CurrentResponse {
    pub email: String,
    pub subscription: Subscription,
    #[serde(rename = "avatarURL")]
    pub avatar_url: String,
}

#[derive(Serialize)]
pub struct AvatarResponse {
    #[serde(rename = "avatarURL")]
    pub avatar_url: String,
}

#[utoipa::path(post, path = "/users/signup", tag = "users", request_body = crate::openapi::CredentialsDoc, responses((status = 201, description = "Created", body = crate::openapi::SignupResponseDoc), (status = 400, description = "Bad Request", body = crate::openapi::MessageDoc), (status = 409, description = "Email in use", body = crate::openapi::MessageDoc)))]
pub async fn signup(
    State(state): State<ServerState>,
    payload: Result<Json<SignupInput>, JsonRejection>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let Json(input) = payload?;
    let user = state.auth.signup(input).await?;
    Ok((StatusCode::CREATED, Json(SignupResponse { user })))
}

#[utoipa::path(post, path = "/users/login", tag = "users", request_body = crate::openapi::CredentialsDoc, responses((status = 200, description = "Logged In", body = crate::openapi::LoginResponseDoc), (status = 400, description = "Bad Request", body = crate::openapi::MessageDoc), (status = 401, description = "Email or password is wrong / Email not verified", body = crate::openapi::MessageDoc)))]
pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<AuthSession>, ApiError> {
    let Json(input) = payload?;
    let session = state.auth.login(input).await?;
    Ok(Json(session))
}

#[utoipa::path(get, path = "/users/logout", tag = "users", security(("bearer" = [])), responses((status = 204, description = "Logged out"), (status = 401, description = "Not authorized", body = crate::openapi::MessageDoc)))]
pub async fn logout(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<StatusCode, ApiError> {
    state.auth.logout(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/users/current", tag = "users", security(("bearer" = [])), responses((status = 200, description = "Current user", body = crate::openapi::CurrentResponseDoc), (status = 401, description = "Not authorized", body = crate::openapi::MessageDoc)))]
pub async fn current(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<CurrentResponse> {
    Json(CurrentResponse { email: user.email, subscription: user.subscription, avatar_url: user.avatar_url })
}

#[utoipa::path(patch, path = "/users", tag = "users", security(("bearer" = [])), request_body = crate::openapi::SubscriptionDoc, responses((status = 200, description = "Updated", body = crate::openapi::PublicUserDoc), (status = 400, description = "Invalid subscription", body = crate::openapi::MessageDoc), (status = 401, description = "Not authorized", body = crate::openapi::MessageDoc)))]
pub async fn update_subscription(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<SubscriptionInput>, JsonRejection>,
) -> Result<Json<PublicUser>, ApiError> {
    let Json(input) = payload?;
    let updated = state.auth.update_subscription(user.id, &input.subscription).await?;
    Ok(Json(updated))
}

#[utoipa::path(patch, path = "/users/avatars", tag = "users", security(("bearer" = [])), request_body(content = crate::openapi::AvatarUploadDoc, content_type = "multipart/form-data"), responses((status = 200, description = "Avatar replaced", body = crate::openapi::AvatarResponseDoc), (status = 400, description = "File not provided / Unsupported image", body = crate::openapi::MessageDoc), (status = 401, description = "Not authorized", body = crate::openapi::MessageDoc)))]
pub async fn update_avatar(
    State(state): State<ServerState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AvatarResponse>, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::bad_request("File not provided"))?;
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(AVATAR_FIELD) {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await?;
            upload = Some((file_name, bytes));
            break;
        }
    }
    let (file_name, bytes) = upload
        .filter(|(_, bytes)| !bytes.is_empty())
        .ok_or_else(|| ApiError::bad_request("File not provided"))?;

    let url = state.avatars.store(file_name.as_deref(), bytes.to_vec()).await?;
    let avatar_url = state.auth.update_avatar(user.id, url).await?;
    info!(user_id = %user.id, %avatar_url, "avatar_updated");
    Ok(Json(AvatarResponse { avatar_url }))
}

#[utoipa::path(get, path = "/users/verify/{verification_token}", tag = "users", params(("verification_token" = String, Path, description = "Token from the verification email")), responses((status = 200, description = "Verification successful", body = crate::openapi::MessageDoc), (status = 400, description = "Verification has already been passed", body = crate::openapi::MessageDoc), (status = 404, description = "User not found", body = crate::openapi::MessageDoc)))]
pub async fn verify(
    State(state): State<ServerState>,
    Path(verification_token): Path<String>,
) -> Result<Json<Message>, ApiError> {
    state.auth.verify_email(&verification_token).await?;
    Ok(Json(Message::new("Verification successful")))
}

#[utoipa::path(post, path = "/users/verify", tag = "users", request_body = crate::openapi::ResendVerificationDoc, responses((status = 200, description = "Verification email sent", body = crate::openapi::MessageDoc), (status = 400, description = "missing required field email / already verified", body = crate::openapi::MessageDoc), (status = 404, description = "User not found", body = crate::openapi::MessageDoc)))]
pub async fn resend_verification(
    State(state): State<ServerState>,
    payload: Result<Json<ResendVerificationInput>, JsonRejection>,
) -> Result<Json<Message>, ApiError> {
    let email = payload.ok().and_then(|Json(input)| input.email);
    state.auth.resend_verification(email.as_deref()).await?;
    Ok(Json(Message::new("Verification email sent")))
}
