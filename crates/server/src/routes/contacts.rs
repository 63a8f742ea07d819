use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use common::types::Message;
use serde_json::Value;
use service::contacts::Contact;

use crate::{auth::ServerState, errors::ApiError};

#[utoipa::path(get, path = "/api/contacts", tag = "contacts", responses((status = 200, description = "All contacts in file order", body = [crate::openapi::ContactDoc])))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Contact>>, ApiError> {
    Ok(Json(state.contacts.list_contacts().await?))
}

#[utoipa::path(get, path = "/api/contacts/{id}", tag = "contacts", params(("id" = String, Path, description = "Contact id")), responses((status = 200, description = "OK", body = crate::openapi::ContactDoc), (status = 404, description = "Not found", body = crate::openapi::MessageDoc)))]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Contact>, ApiError> {
    state.contacts.get_contact_by_id(&id).await?.map(Json).ok_or_else(ApiError::not_found)
}

#[utoipa::path(post, path = "/api/contacts", tag = "contacts", request_body = crate::openapi::ContactInputDoc, responses((status = 201, description = "Created", body = crate::openapi::ContactDoc), (status = 400, description = "missing fields", body = crate::openapi::MessageDoc)))]
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    let Json(body) = payload?;
    let contact = state.contacts.add_contact(body).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

#[utoipa::path(delete, path = "/api/contacts/{id}", tag = "contacts", params(("id" = String, Path, description = "Contact id")), responses((status = 200, description = "contact deleted", body = crate::openapi::MessageDoc), (status = 404, description = "Not found", body = crate::openapi::MessageDoc)))]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Message>, ApiError> {
    match state.contacts.remove_contact(&id).await? {
        Some(_) => Ok(Json(Message::new("contact deleted"))),
        None => Err(ApiError::not_found()),
    }
}

#[utoipa::path(put, path = "/api/contacts/{id}", tag = "contacts", params(("id" = String, Path, description = "Contact id")), request_body = crate::openapi::ContactInputDoc, responses((status = 200, description = "Updated", body = crate::openapi::ContactDoc), (status = 400, description = "missing fields", body = crate::openapi::MessageDoc), (status = 404, description = "Not found", body = crate::openapi::MessageDoc)))]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Contact>, ApiError> {
    let Json(body) = payload?;
    state.contacts.update_contact(&id, body).await?.map(Json).ok_or_else(ApiError::not_found)
}
