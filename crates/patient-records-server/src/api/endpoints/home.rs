//! Informational endpoints.

use axum::Json;

use crate::api::types::MessageResponse;

/// `GET /` — service greeting.
pub async fn welcome() -> Json<MessageResponse> {
    Json(MessageResponse::new("Patient Management System API"))
}

/// `GET /about` — service description.
pub async fn about() -> Json<MessageResponse> {
    Json(MessageResponse::new(
        "A fully functional API to manage your patient records",
    ))
}
