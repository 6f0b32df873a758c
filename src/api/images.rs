//! Image API endpoints.
//!
//! Unlike the people endpoints these speak raw bodies: GET returns JPEG
//! bytes and POST returns the new image's GUID as plain text, matching what
//! the browser client's uploader expects.

use axum::{
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::models::{is_unknown_guid, UNKNOWN_IMAGE_GUID};
use crate::AppState;

/// Multipart field name the client uploads the photo under.
const PHOTO_FIELD: &str = "photo";

/// Query parameters for image GET and DELETE.
#[derive(Debug, Deserialize)]
pub struct ImageParams {
    #[serde(default)]
    pub guid: Option<String>,
}

/// GET /api/image?guid=... - Fetch image bytes. Unknown or missing guids
/// serve the placeholder image.
pub async fn get_image(
    State(state): State<AppState>,
    Query(params): Query<ImageParams>,
) -> Response {
    match state.repo.get_image(params.guid.as_deref()).await {
        Ok(image) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/jpeg")],
            image.jpeg,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch image: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// POST /api/image - Store an uploaded JPEG, returning its new GUID as
/// plain text. Failures fall back to the unknown-image GUID so the client
/// always receives a usable identifier.
pub async fn upload_image(State(state): State<AppState>, mut multipart: Multipart) -> String {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Error reading multipart upload: {}", e);
                break;
            }
        };

        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }

        let bytes = match field.bytes().await {
            Ok(bytes) if !bytes.is_empty() => bytes,
            Ok(_) => break,
            Err(e) => {
                tracing::error!("Error reading upload body: {}", e);
                break;
            }
        };

        match state.repo.create_image(bytes.to_vec()).await {
            Ok(guid) => return guid,
            Err(e) => {
                tracing::error!("Error creating image: {}", e);
                break;
            }
        }
    }

    UNKNOWN_IMAGE_GUID.to_string()
}

/// DELETE /api/image?guid=... - Release one reference to the image. The
/// unknown placeholder is never deleted.
pub async fn delete_image(State(state): State<AppState>, Query(params): Query<ImageParams>) {
    if is_unknown_guid(params.guid.as_deref()) {
        return;
    }

    let guid = params.guid.unwrap_or_default();
    if let Err(e) = state.repo.update_image_count(&guid, -1).await {
        tracing::error!(%guid, "Failed to release image reference: {}", e);
    }
}
