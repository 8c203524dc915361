use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, MessageResponse, PublicUser, RegisterRequest},
        jwt::JwtKeys,
    },
    error::{ApiJson, AppError},
    state::AppState,
    users::services::{authenticate, register},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/add-user", post(add_user))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn add_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    register(&state, &payload.name, &payload.email, &payload.password)
        .await
        .map_err(|e| e.into_server_error("Error creating user"))?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created successfully!",
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = authenticate(&state, &payload.email, &payload.password)
        .await
        .map_err(|e| e.with_message("Error logging in"))?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys
        .sign(user.id, &user.email)
        .map_err(|e| AppError::from(e).with_message("Error logging in"))?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        message: "Login successful",
        token,
        user: PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
        },
    }))
}
