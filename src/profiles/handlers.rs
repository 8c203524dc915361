use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{UpdateProfileRequest, UploadResponse},
    repo_types::Profile,
    services,
};
use crate::{
    auth::extractors::AuthUser,
    error::{ApiJson, AppError},
    images,
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/profiles", get(list_profiles))
        .route("/update-profile", put(update_profile))
}

pub const UPLOAD_LIMIT: usize = 10 * 1024 * 1024; // 10MB

pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_avatar))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Profile>, AppError> {
    let profile = services::get_by_user_id(&state, auth.id)
        .await
        .map_err(|e| e.with_message("Error fetching profile"))?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn list_profiles(State(state): State<AppState>) -> Result<Json<Vec<Profile>>, AppError> {
    let profiles = services::list_all(&state)
        .await
        .map_err(|e| e.with_message("Server error while fetching profiles"))?;
    Ok(Json(profiles))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    let profile = services::update_partial(&state, auth.id, payload)
        .await
        .map_err(|e| e.with_message("Error updating profile"))?;
    Ok(Json(profile))
}

/// POST /upload (multipart, field `image`)
#[instrument(skip(state, mp))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    auth: AuthUser,
    mp: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut mp = mp.map_err(|e| {
        warn!(error = %e, "upload without a multipart body");
        AppError::Validation("No file uploaded".into())
    })?;

    let mut file = None;
    while let Some(field) = mp.next_field().await? {
        if field.name() == Some("image") {
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await?;
            file = Some((data, content_type));
            break;
        }
    }
    let Some((data, content_type)) = file.filter(|(data, _)| !data.is_empty()) else {
        return Err(AppError::Validation("No file uploaded".into()));
    };

    let image = images::services::upload(&state, data, content_type.as_deref()).await?;

    match services::set_avatar_link(&state, auth.id, &image.url).await {
        Ok(_) => {}
        Err(AppError::ProfileNotFound) => {
            warn!(user_id = %auth.id, "avatar uploaded for missing profile; discarding");
            images::services::delete_by_url(&state, &image.url).await;
            return Err(AppError::ProfileNotFound);
        }
        Err(e) => return Err(e.with_message("Upload failed")),
    }

    info!(user_id = %auth.id, public_id = %image.public_id, "avatar updated");
    Ok(Json(UploadResponse {
        message: "Profile picture updated successfully!",
        image_url: image.url,
    }))
}
