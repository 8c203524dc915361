use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::error::AppError;

/// Identity taken from a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Token part of an `Authorization` value, i.e. whatever follows the scheme.
fn bearer_token(header: &str) -> Option<&str> {
    header
        .split_whitespace()
        .nth(1)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AppError::MissingCredential)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::InvalidCredential
        })?;

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::bearer_token;
    use crate::{auth::jwt::JwtKeys, test_support::TestContext};

    #[test]
    fn bearer_token_takes_second_part() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer   abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token(""), None);
    }

    #[tokio::test]
    async fn missing_header_is_401() {
        let ctx = TestContext::new();
        let res = ctx
            .app()
            .oneshot(Request::get("/profile").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = crate::test_support::json_body(res).await;
        assert_eq!(body["message"], "No token provided");
    }

    #[tokio::test]
    async fn scheme_without_token_is_401() {
        let ctx = TestContext::new();
        let res = ctx
            .app()
            .oneshot(
                Request::get("/user")
                    .header("authorization", "Bearer")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_token_is_403() {
        let ctx = TestContext::new();
        let res = ctx
            .app()
            .oneshot(
                Request::get("/profile")
                    .header("authorization", "Bearer not-a-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body = crate::test_support::json_body(res).await;
        assert_eq!(body["message"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn expired_token_is_403() {
        let ctx = TestContext::new();
        let keys = JwtKeys::new(&ctx.state.config.jwt);
        let issued = time::OffsetDateTime::now_utc() - time::Duration::hours(3);
        let token = keys.sign_at(Uuid::new_v4(), "a@x.com", issued).unwrap();
        let res = ctx
            .app()
            .oneshot(
                Request::get("/profile")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
