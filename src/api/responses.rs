use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::api::AppState;
use crate::domain::NewResponse;
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct SaveResponseAck {
    pub message: &'static str,
}

/// `POST /save_response`: validate the body and store one response.
///
/// The body is parsed as JSON whatever its content type.
pub async fn save_response(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SaveResponseAck>, AppError> {
    let body = body.map_err(|rejection| {
        warn!("Failed to read response submission: {}", rejection);
        AppError::from(rejection)
    })?;

    let new = NewResponse::from_body(&body).map_err(|e| {
        warn!("Rejected response submission: {}", e);
        AppError::from(e)
    })?;

    let id = state.store.insert_response(&new).await.map_err(|e| {
        error!(square_id = %new.square_id, "Error saving response: {}", e);
        AppError::Storage(e)
    })?;

    info!(id, square_id = %new.square_id, "Response saved");

    Ok(Json(SaveResponseAck {
        message: "Response saved successfully!",
    }))
}
