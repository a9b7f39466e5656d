//! Authenticated-user extraction.
//!
//! Authentication itself is owned by the fronting gateway, which
//! terminates the session and injects the caller's user id into the
//! `x-user-id` header. This extractor only reads that header; requests
//! arriving without it (or with a malformed id) are rejected.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use serde_json::json;
use uuid::Uuid;

use patungan_shared::AppError;

/// Header carrying the gateway-authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor for the authenticated user.
///
/// ```ignore
/// async fn handler(user: AuthUser) -> impl IntoResponse {
///     let user_id = user.user_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

impl AuthUser {
    /// Returns the authenticated user's id.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .map(AuthUser)
            .ok_or_else(|| {
                let err =
                    AppError::Unauthorized("Missing or invalid x-user-id header".to_string());
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": err.error_code(),
                        "message": err.to_string()
                    })),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequestParts;
    use axum::http::Request;

    #[tokio::test]
    async fn test_extracts_valid_user_id() {
        let id = Uuid::new_v4();
        let request = Request::builder()
            .header(USER_ID_HEADER, id.to_string())
            .body(())
            .unwrap();
        let (mut parts, ()) = request.into_parts();

        let user = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.user_id(), id);
    }

    #[tokio::test]
    async fn test_rejects_missing_header() {
        let request = Request::builder().body(()).unwrap();
        let (mut parts, ()) = request.into_parts();

        let result = AuthUser::from_request_parts(&mut parts, &()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_rejects_malformed_id() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "not-a-uuid")
            .body(())
            .unwrap();
        let (mut parts, ()) = request.into_parts();

        let result = AuthUser::from_request_parts(&mut parts, &()).await;
        assert!(result.is_err());
    }
}
