use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::dto::{MessageRequest, StatusResponse};
use crate::error::AppError;

pub async fn receive_message(
    payload: Result<Json<MessageRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let Json(body) = payload?;
    if body.message.is_empty() {
        return Err(AppError::BadRequest("Invalid JSON payload".to_string()));
    }

    tracing::info!("Message from client: {}", body.message);

    Ok(Json(StatusResponse::success("Data received successfully")))
}
