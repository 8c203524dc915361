use tracing::{error, info, warn};
use uuid::Uuid;

use super::repo_types::{NewUser, User};
use crate::{
    auth::password::{hash_password, verify_password},
    error::{AppError, AppResult},
    images,
    profiles::repo_types::Profile,
    state::AppState,
};

/// Emails are stored and matched exactly as given.
pub async fn create_user(st: &AppState, name: &str, email: &str, password: &str) -> AppResult<User> {
    if name.is_empty() || email.is_empty() || password.is_empty() {
        warn!(%email, "registration with missing fields");
        return Err(AppError::Validation(
            "name, email and password are required".into(),
        ));
    }

    let password_hash = hash_password(password, &st.config.password)?;
    st.users
        .insert(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
        })
        .await
}

/// Creates the user and its profile. The two writes are separate; when the
/// profile write fails the user is removed again so no profile-less account
/// is left behind.
pub async fn register(
    st: &AppState,
    name: &str,
    email: &str,
    password: &str,
) -> AppResult<(User, Profile)> {
    let user = create_user(st, name, email, password).await?;

    match st.profiles.create_for_user(user.id).await {
        Ok(profile) => {
            info!(user_id = %user.id, email = %user.email, "user registered");
            Ok((user, profile))
        }
        Err(e) => {
            error!(error = %e, user_id = %user.id, "create profile failed; removing user");
            if let Err(cleanup) = st.users.delete_by_id(user.id).await {
                error!(error = %cleanup, user_id = %user.id, "cleanup of orphan user failed");
            }
            Err(e.context("create profile").into())
        }
    }
}

pub async fn authenticate(st: &AppState, email: &str, password: &str) -> AppResult<User> {
    let user = match st.users.find_by_email(email).await? {
        Some(u) => u,
        None => {
            warn!(%email, "login unknown email");
            return Err(AppError::UserNotFound);
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(AppError::BadCredentials);
    }

    Ok(user)
}

pub async fn get_by_id(st: &AppState, id: Uuid) -> AppResult<User> {
    st.users.find_by_id(id).await?.ok_or(AppError::UserNotFound)
}

pub async fn list_all(st: &AppState) -> AppResult<Vec<User>> {
    Ok(st.users.list_all().await?)
}

/// Loads the requester and fails with `Forbidden` unless it is an admin.
pub async fn require_admin(st: &AppState, requester_id: Uuid) -> AppResult<User> {
    match st.users.find_by_id(requester_id).await? {
        Some(u) if u.is_admin => Ok(u),
        _ => {
            warn!(%requester_id, "admin action denied");
            Err(AppError::Forbidden)
        }
    }
}

/// Removes `target_id` with its profile and avatar image. The image step is
/// best-effort; a missing target is not an error.
pub async fn delete_cascade(st: &AppState, target_id: Uuid) -> AppResult<()> {
    if let Some(profile) = st.profiles.find_by_user_id(target_id).await? {
        images::services::delete_by_url(st, &profile.link).await;
    }

    st.users.delete_by_id(target_id).await?;
    st.profiles.delete_by_user_id(target_id).await?;
    Ok(())
}
