use tracing::info;
use uuid::Uuid;

use super::{dto::UpdateProfileRequest, repo_types::Profile};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

/// Applies the fields of `update` that carry a value: non-empty strings and
/// non-zero ages. Anything else leaves the stored value as it was, so an age
/// of 0 or an empty name can never be written through this path.
pub fn merge_truthy(profile: &mut Profile, update: UpdateProfileRequest) {
    if let Some(name) = update.name.filter(|s| !s.is_empty()) {
        profile.name = name;
    }
    if let Some(age) = update.age.filter(|a| *a != 0) {
        profile.age = age;
    }
    if let Some(biography) = update.biography.filter(|s| !s.is_empty()) {
        profile.biography = biography;
    }
}

pub async fn get_by_user_id(st: &AppState, user_id: Uuid) -> AppResult<Profile> {
    st.profiles
        .find_by_user_id(user_id)
        .await?
        .ok_or(AppError::ProfileNotFound)
}

pub async fn list_all(st: &AppState) -> AppResult<Vec<Profile>> {
    Ok(st.profiles.list_all().await?)
}

pub async fn update_partial(
    st: &AppState,
    user_id: Uuid,
    update: UpdateProfileRequest,
) -> AppResult<Profile> {
    let mut profile = get_by_user_id(st, user_id).await?;
    merge_truthy(&mut profile, update);
    let saved = st.profiles.save(&profile).await?;
    info!(%user_id, profile_id = %saved.id, "profile updated");
    Ok(saved)
}

pub async fn set_avatar_link(st: &AppState, user_id: Uuid, url: &str) -> AppResult<Profile> {
    st.profiles
        .set_link(user_id, url)
        .await?
        .ok_or(AppError::ProfileNotFound)
}
