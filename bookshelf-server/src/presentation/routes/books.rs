use axum::Router;
use axum::middleware;
use axum::routing::get;

use crate::application::access::Policy;
use crate::presentation::AppState;
use crate::presentation::handlers::books::{
    create_book, delete_book, get_book, list_books, update_book,
};
use crate::presentation::middleware::access::enforce_policy;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .layer(middleware::from_fn_with_state(
            Policy::AuthenticatedOrReadOnly,
            enforce_policy,
        ))
}
