use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    #[serde(rename = "fileUrl")]
    pub file_url: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_profile_image))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

/// POST /upload (multipart, field `profileImage`)
///
/// Stores the image publicly and returns its URL. The caller links the URL
/// to a user separately via POST /img.
#[instrument(skip(state, mp))]
pub async fn upload_profile_image(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file: Option<(Bytes, String)> = None;
    while let Ok(Some(field)) = mp.next_field().await {
        if field.name() == Some("profileImage") {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".into());
            let data = field.bytes().await.map_err(|e| {
                error!(error = %e, "reading multipart field failed");
                AppError::Validation("Invalid multipart body".into())
            })?;
            file = Some((data, content_type));
            break;
        }
    }

    let Some((body, content_type)) = file else {
        return Err(AppError::Validation("No file uploaded".into()));
    };

    let key = object_key(&content_type);
    let url = state
        .storage
        .put_public(&key, body, &content_type)
        .await
        .map_err(|e| {
            error!(error = %e, key = %key, "object storage upload failed");
            AppError::Upstream("Failed to upload file".into())
        })?;

    info!(key = %key, "profile image uploaded");
    Ok(Json(UploadResponse { file_url: url }))
}

fn object_key(content_type: &str) -> String {
    let ext = ext_from_mime(content_type).unwrap_or("bin");
    format!("profile-images/{}.{}", Uuid::new_v4(), ext)
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}
