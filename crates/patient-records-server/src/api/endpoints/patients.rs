//! Patient record endpoints.
//!
//! - `GET /view` — full collection
//! - `GET /view/:id` — single record
//! - `GET /sort` — records ordered by height, weight or bmi
//! - `POST /create` — validate and insert
//! - `PUT /edit/:id` — partial update
//! - `DELETE /delete/:id` — remove

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use patient_records_core::{Collection, Fields, PatientUpdate, RecordEntry, SortOrder};
use serde::Deserialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, MessageResponse};

type Created = (StatusCode, Json<MessageResponse>);

#[derive(Deserialize)]
pub struct SortQuery {
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// `GET /view` — every stored record keyed by id.
pub async fn view(State(ctx): State<ApiContext>) -> Result<Json<Collection>, ApiError> {
    Ok(Json(ctx.registry.list()?))
}

/// `GET /view/:id` — one stored record.
pub async fn view_one(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<Fields>, ApiError> {
    Ok(Json(ctx.registry.get(&patient_id)?))
}

/// `GET /sort?sort_by=&order=` — `order` defaults to `asc`.
pub async fn sort(
    State(ctx): State<ApiContext>,
    Query(query): Query<SortQuery>,
) -> Result<Json<Vec<RecordEntry>>, ApiError> {
    let sort_by = query
        .sort_by
        .ok_or_else(|| ApiError::BadRequest("Missing query parameter: sort_by".into()))?;
    let order = query
        .order
        .unwrap_or_else(|| SortOrder::default().as_str().to_string());

    Ok(Json(ctx.registry.sorted(&sort_by, &order)?))
}

/// `POST /create` — insert a new patient.
pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Created, ApiError> {
    let fields = object_body(payload)?;
    ctx.registry.create(&fields)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Patient created successfully")),
    ))
}

/// `PUT /edit/:id` — apply the fields present in the body.
pub async fn edit(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Created, ApiError> {
    let update = PatientUpdate::new(object_body(payload)?);
    ctx.registry.update(&patient_id, &update)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Patient updated")),
    ))
}

/// `DELETE /delete/:id` — remove a patient.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Created, ApiError> {
    ctx.registry.delete(&patient_id)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Patient deleted")),
    ))
}

fn object_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Fields, ApiError> {
    let Json(value) = payload?;
    match value {
        Value::Object(fields) => Ok(fields),
        _ => Err(ApiError::BadRequest(
            "Request body must be a JSON object".into(),
        )),
    }
}
