// ABOUTME: Request extractors for member sessions and analysis identities
// ABOUTME: Resolves bearer tokens to live members and falls back to the guest header

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use laundrylens_core::constants::GUEST_ID_MAX_LEN;
use laundrylens_core::UsageIdentity;
use laundrylens_users::User;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the client generated guest identifier
pub const GUEST_ID_HEADER: &str = "x-guest-id";

/// Authenticated member; rejects the request with 401 otherwise
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Member when a bearer token is sent, `None` when no token is sent
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

/// Who an analysis is charged to
#[derive(Debug, Clone)]
pub struct AnalysisIdentity(pub UsageIdentity);

/// Token from `Authorization: Bearer <token>`. `Ok(None)` when the header is absent.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::Unauthorized("Malformed authorization header".to_string()))?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(Some(token.trim()))
        }
        _ => Err(AppError::Unauthorized(
            "Authorization header must use the Bearer scheme".to_string(),
        )),
    }
}

async fn resolve_member(parts: &Parts, state: &AppState) -> Result<Option<User>, AppError> {
    match bearer_token(parts)? {
        Some(token) => Ok(Some(state.auth.user_from_token(token).await?)),
        None => Ok(None),
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve_member(parts, state)
            .await?
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(resolve_member(parts, state).await?))
    }
}

impl FromRequestParts<AppState> for AnalysisIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let OptionalUser(Some(user)) = OptionalUser::from_request_parts(parts, state).await? {
            return Ok(AnalysisIdentity(UsageIdentity::Member(user.id)));
        }

        let guest_id = parts
            .headers
            .get(GUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .unwrap_or_default();

        if guest_id.is_empty() {
            return Err(AppError::Validation(format!(
                "Sign in or send a {} header",
                GUEST_ID_HEADER
            )));
        }
        if guest_id.chars().count() > GUEST_ID_MAX_LEN {
            return Err(AppError::Validation(format!(
                "{} must be at most {} characters",
                GUEST_ID_HEADER, GUEST_ID_MAX_LEN
            )));
        }

        Ok(AnalysisIdentity(UsageIdentity::Guest(guest_id.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts_with(None)).unwrap(), None);
        assert_eq!(
            bearer_token(&parts_with(Some("Bearer abc.def"))).unwrap(),
            Some("abc.def")
        );
        assert_eq!(
            bearer_token(&parts_with(Some("bearer  abc "))).unwrap(),
            Some("abc")
        );
        assert!(bearer_token(&parts_with(Some("Basic abc"))).is_err());
        assert!(bearer_token(&parts_with(Some("Bearer "))).is_err());
    }
}
