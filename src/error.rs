use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Every failure a handler can answer with.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No token provided")]
    MissingCredential,
    #[error("Invalid or expired token")]
    InvalidCredential,
    #[error("Access denied")]
    Forbidden,
    #[error("User not found")]
    UserNotFound,
    #[error("Profile not found")]
    ProfileNotFound,
    #[error("Invalid credentials")]
    BadCredentials,
    #[error("Email already registered")]
    DuplicateEmail,
    #[error("Payload too large")]
    PayloadTooLarge,
    #[error("{0}")]
    Validation(String),
    #[error("Upload to image host failed")]
    Upload(#[source] anyhow::Error),
    #[error("{message}")]
    Unexpected {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingCredential | AppError::BadCredentials => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredential | AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::UserNotFound | AppError::ProfileNotFound => StatusCode::NOT_FOUND,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upload(_) | AppError::Unexpected { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Replaces the generic 500 message with the one the calling handler owns.
    /// Other variants pass through untouched.
    pub fn with_message(self, message: &'static str) -> Self {
        match self {
            AppError::Unexpected { source, .. } => AppError::Unexpected { message, source },
            other => other,
        }
    }

    /// Turns any failure into a 500 with `message`, keeping the original as
    /// the logged source. For routes whose only failure answer is a 500.
    pub fn into_server_error(self, message: &'static str) -> Self {
        match self {
            AppError::Unexpected { source, .. } => AppError::Unexpected { message, source },
            other => AppError::Unexpected {
                message,
                source: anyhow::Error::new(other),
            },
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(source: anyhow::Error) -> Self {
        AppError::Unexpected {
            message: "Internal server error",
            source,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        AppError::Validation(e.body_text())
    }
}

/// `Json` extractor whose rejections answer with the usual `{message}` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::Upload(source) | AppError::Unexpected { source, .. } => {
                error!(error = ?source, message = %self, "request failed");
            }
            _ => {}
        }
        (status, Json(ErrorBody { message: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_map_to_distinct_statuses() {
        assert_eq!(AppError::MissingCredential.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidCredential.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::BadCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::DuplicateEmail.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn with_message_only_rewrites_unexpected() {
        let err = AppError::from(anyhow::anyhow!("connection reset"))
            .with_message("Error fetching users");
        assert_eq!(err.to_string(), "Error fetching users");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = AppError::ProfileNotFound.with_message("Error fetching profile");
        assert_eq!(err.to_string(), "Profile not found");
    }

    #[test]
    fn into_server_error_collapses_every_variant() {
        let err = AppError::DuplicateEmail.into_server_error("Error creating user");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Error creating user");
        match err {
            AppError::Unexpected { source, .. } => {
                assert_eq!(source.to_string(), "Email already registered")
            }
            other => panic!("unexpected variant: {other:?}"),
        }

        let err = AppError::Validation("name is required".into())
            .into_server_error("Error creating user");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn oversized_payload_is_413() {
        assert_eq!(
            AppError::PayloadTooLarge.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }
}
