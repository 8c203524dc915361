use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{dto::MeResponse, repo_types::User, services};
use crate::{
    auth::{dto::MessageResponse, extractors::AuthUser},
    error::AppError,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(get_me))
        .route("/get-users", get(list_users))
        .route("/deleteUser/:id", delete(delete_user))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let user = services::get_by_id(&state, auth.id)
        .await
        .map_err(|e| e.with_message("Error fetching user"))?;

    Ok(Json(MeResponse {
        id: user.id,
        name: user.name,
        is_admin: user.is_admin,
    }))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let users = services::list_all(&state)
        .await
        .map_err(|e| e.with_message("Error fetching users"))?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    services::require_admin(&state, auth.id)
        .await
        .map_err(|e| e.with_message("Error deleting user"))?;

    // Checked after the admin gate so non-admins see 403 whatever they send.
    let target_id = Uuid::parse_str(&id).map_err(|_| {
        warn!(%id, "delete user with malformed id");
        AppError::Validation("Invalid user id".into())
    })?;

    services::delete_cascade(&state, target_id)
        .await
        .map_err(|e| e.with_message("Error deleting user"))?;
    info!(requester_id = %auth.id, requester = %auth.email, %target_id, "user deleted");

    Ok(Json(MessageResponse {
        message: "User deleted successfully",
    }))
}
