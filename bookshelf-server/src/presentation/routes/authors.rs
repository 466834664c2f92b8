use axum::Router;
use axum::middleware;
use axum::routing::get;

use crate::application::access::Policy;
use crate::presentation::AppState;
use crate::presentation::handlers::authors::{
    create_author, delete_author, get_author, list_authors,
};
use crate::presentation::middleware::access::enforce_policy;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_authors).post(create_author))
        .route("/{id}", get(get_author).delete(delete_author))
        .layer(middleware::from_fn_with_state(
            Policy::AuthenticatedOrReadOnly,
            enforce_policy,
        ))
}
