//! Check-in handlers: players post a selfie, hosts list them in order.

use super::{AppState, error::ApiError, request_id::RequestId};
use crate::metrics;
use assassin::checkin::{CheckIn, ImageUpload};
use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub message: String,
    #[serde(rename = "checkIn")]
    pub check_in: CheckIn,
}

#[derive(Debug, Serialize)]
pub struct CheckInListResponse {
    #[serde(rename = "checkIns")]
    pub check_ins: Vec<CheckIn>,
}

/// Record a check-in.
///
/// # Form Fields
///
/// - `name`: Player name (required)
/// - `selfie`: Image file with an `image/*` content type (required)
///
/// # Errors
///
/// - `400 Bad Request`: Missing name or selfie, or the file is not an image
/// - `500 Internal Server Error`: The image or record could not be stored
pub async fn submit_check_in(
    State(state): State<AppState>,
    request_id: RequestId,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CheckInResponse>), ApiError> {
    let mut name = None;
    let mut selfie = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => name = Some(field.text().await?),
            "selfie" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?.to_vec();
                selfie = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ApiError::bad_request("Name is required"))?;
    let selfie = selfie.ok_or_else(|| ApiError::bad_request("Selfie is required"))?;

    let check_in = state.check_ins.submit(&name, selfie).await?;
    metrics::check_ins_total();
    tracing::debug!(request_id = %request_id.as_str(), id = %check_in.id, "Check-in stored");

    Ok((
        StatusCode::CREATED,
        Json(CheckInResponse {
            message: "Check-in recorded".to_string(),
            check_in,
        }),
    ))
}

/// All check-ins, oldest first.
///
/// # Example
///
/// ```bash
/// curl http://localhost:5001/api/v1/check-ins
/// # {"checkIns":[{"id":"...","name":"Ana","image_url":"...","submitted_at":"..."}]}
/// ```
pub async fn list_check_ins(
    State(state): State<AppState>,
) -> Result<Json<CheckInListResponse>, ApiError> {
    let check_ins = state.check_ins.list().await?;
    Ok(Json(CheckInListResponse { check_ins }))
}
