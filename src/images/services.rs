use anyhow::Context;
use bytes::Bytes;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{error::AppError, state::AppState, storage::UploadedImage};

/// Host-assigned identifier encoded in a delivery URL: the path after
/// `/upload/`, minus an optional `v<digits>/` version segment and the file
/// extension.
pub fn public_id_from_url(url: &str) -> Option<String> {
    lazy_static! {
        static ref PUBLIC_ID_RE: Regex = Regex::new(r"/upload/(?:v\d+/)?([^.]+)").unwrap();
    }
    PUBLIC_ID_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn file_name_for(content_type: Option<&str>) -> &'static str {
    match content_type {
        Some("image/jpeg") | Some("image/jpg") => "avatar.jpg",
        Some("image/png") => "avatar.png",
        Some("image/webp") => "avatar.webp",
        Some("image/gif") => "avatar.gif",
        _ => "avatar",
    }
}

pub async fn upload(
    st: &AppState,
    body: Bytes,
    content_type: Option<&str>,
) -> Result<UploadedImage, AppError> {
    let size = body.len();
    let image = st
        .images
        .upload(body, file_name_for(content_type))
        .await
        .context("upload avatar")
        .map_err(AppError::Upload)?;
    info!(public_id = %image.public_id, size, "image uploaded");
    Ok(image)
}

/// Removes the image behind `url` if an identifier can be derived from it.
/// Never fails: nothing to delete and host errors are both only logged.
pub async fn delete_by_url(st: &AppState, url: &str) {
    let Some(public_id) = public_id_from_url(url) else {
        return;
    };
    match st.images.destroy(&public_id).await {
        Ok(()) => info!(%public_id, "image deleted"),
        Err(e) => warn!(error = %e, %public_id, "image delete failed; continuing"),
    }
}
