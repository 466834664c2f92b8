use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::domain::error::DomainError;
use crate::infrastructure::tokens::is_well_formed;
use crate::presentation::AppState;
use crate::presentation::app_error::AppError;

#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser {
    pub(crate) user_id: i64,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Resolves `Authorization: Token <key>` to a user.
///
/// Requests without the header pass through anonymously; a header that is
/// present but malformed or unknown is rejected outright.
pub(crate) async fn token_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(auth_header) = request.headers().get(header::AUTHORIZATION) else {
        return Ok(next.run(request).await);
    };
    let auth_header = auth_header.to_str().map_err(|_| AppError::Unauthorized)?;
    let key = parse_token_header(auth_header).ok_or(AppError::Unauthorized)?;
    if !is_well_formed(key) {
        return Err(AppError::Unauthorized);
    }

    let user = state
        .accounts
        .authenticate(key)
        .await
        .map_err(|err| match err {
            DomainError::Unauthenticated => {
                warn!("request with unknown token");
                AppError::Unauthorized
            }
            other => AppError::Domain(other),
        })?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id: user.id });

    Ok(next.run(request).await)
}

fn parse_token_header(value: &str) -> Option<&str> {
    let mut parts = value.split_whitespace();
    let scheme = parts.next()?;
    let key = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    if !scheme.eq_ignore_ascii_case("token") && !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::parse_token_header;

    #[test]
    fn accepts_token_and_bearer_schemes() {
        assert_eq!(parse_token_header("Token abc"), Some("abc"));
        assert_eq!(parse_token_header("bearer  abc"), Some("abc"));
    }

    #[test]
    fn rejects_malformed_headers() {
        assert_eq!(parse_token_header("Token"), None);
        assert_eq!(parse_token_header("Basic abc"), None);
        assert_eq!(parse_token_header("Token abc def"), None);
        assert_eq!(parse_token_header(""), None);
    }
}
