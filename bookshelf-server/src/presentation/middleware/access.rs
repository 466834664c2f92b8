use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::application::access::{Action, Policy};
use crate::presentation::app_error::AppError;
use crate::presentation::middleware::auth::AuthenticatedUser;

/// Gates a router by `Policy` before any extractor reads the body.
pub(crate) async fn enforce_policy(
    State(policy): State<Policy>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let action = action_for(request.method());
    let authenticated = request.extensions().get::<AuthenticatedUser>().is_some();

    if let Err(err) = policy.authorize(action, authenticated) {
        warn!(
            method = %request.method(),
            path = %request.uri().path(),
            ?policy,
            "access denied"
        );
        return Err(err.into());
    }

    Ok(next.run(request).await)
}

fn action_for(method: &Method) -> Action {
    if method == Method::GET || method == Method::HEAD || method == Method::OPTIONS {
        Action::Read
    } else {
        Action::Write
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Method;

    use super::action_for;
    use crate::application::access::Action;

    #[test]
    fn safe_methods_are_reads() {
        for method in [Method::GET, Method::HEAD, Method::OPTIONS] {
            assert_eq!(action_for(&method), Action::Read);
        }
        for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            assert_eq!(action_for(&method), Action::Write);
        }
    }
}
