// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{AuthError, AuthenticatedUser, CredentialStore, TOKEN_KEYWORD};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Reads `Authorization: Token <key>` and resolves the key through the
/// configured [`CredentialStore`]. Rejects with [`AuthError`] before the
/// handler (and therefore any storage access) runs.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_todos(
///     Auth(user): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<Vec<TodoResponse>>, ApiError> {
///     // user.user_id is the requester passed to the repository
/// }
/// ```
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(&parts.headers, state.credentials.as_ref()).map_err(|e| {
            tracing::debug!(error_code = e.error_code(), "Request authentication failed");
            e
        })?;

        Ok(Auth(user))
    }
}

/// Extract the key from an `Authorization` header value.
///
/// The keyword is matched case-insensitively; exactly one key must follow.
pub fn parse_token_header(value: &str) -> Result<&str, AuthError> {
    let mut words = value.split_ascii_whitespace();

    match words.next() {
        Some(keyword) if keyword.eq_ignore_ascii_case(TOKEN_KEYWORD) => {}
        _ => return Err(AuthError::InvalidAuthHeader),
    }

    let key = words.next().ok_or(AuthError::InvalidAuthHeader)?;
    if words.next().is_some() {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(key)
}

/// Resolve the requester from request headers.
pub fn authenticate(
    headers: &HeaderMap,
    credentials: &dyn CredentialStore,
) -> Result<AuthenticatedUser, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let key = parse_token_header(header)?;

    credentials
        .resolve(key)
        .map(AuthenticatedUser::new)
        .ok_or(AuthError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenDirectory;
    use crate::models::UserId;
    use axum::http::Request;

    fn create_test_state() -> AppState {
        let directory = TokenDirectory::from_inline("key-alice=alice").unwrap();
        AppState::default().with_credentials(directory)
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn parses_token_header_variants() {
        assert_eq!(parse_token_header("Token abc").unwrap(), "abc");
        assert_eq!(parse_token_header("token   abc ").unwrap(), "abc");
        assert!(matches!(
            parse_token_header("Bearer abc"),
            Err(AuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            parse_token_header("Token"),
            Err(AuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            parse_token_header("Token a b"),
            Err(AuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            parse_token_header(""),
            Err(AuthError::InvalidAuthHeader)
        ));
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let state = create_test_state();
        let mut parts = parts_with_auth(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_issued_token() {
        let state = create_test_state();
        let mut parts = parts_with_auth(Some("Token key-alice"));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert_eq!(result.unwrap().0.user_id, UserId::from("alice"));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_unknown_token() {
        let state = create_test_state();
        let mut parts = parts_with_auth(Some("Token invalid_token"));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_other_schemes() {
        let state = create_test_state();
        let mut parts = parts_with_auth(Some("Bearer key-alice"));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_ignores_identity_in_extensions() {
        let state = create_test_state();
        let mut parts = parts_with_auth(None);
        parts.extensions.insert(AuthenticatedUser::new("alice"));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }
}
