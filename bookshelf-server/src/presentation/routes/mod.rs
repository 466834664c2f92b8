use axum::{Router, middleware};

use super::AppState;
use super::middleware::auth::token_auth_middleware;

pub(crate) mod accounts;
pub(crate) mod authors;
pub(crate) mod books;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/api/books", books::router())
        .nest("/api/authors", authors::router())
        .nest("/api/accounts", accounts::router())
        .layer(middleware::from_fn_with_state(state, token_auth_middleware))
}
