use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::application::access::Policy;
use crate::presentation::AppState;
use crate::presentation::handlers::accounts::{
    follow, get_profile, login, logout, register, unfollow, update_profile,
};
use crate::presentation::middleware::access::enforce_policy;

pub(crate) fn router() -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .layer(middleware::from_fn_with_state(
            Policy::AllowAny,
            enforce_policy,
        ));

    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/follow/{id}", post(follow).delete(unfollow))
        .layer(middleware::from_fn_with_state(
            Policy::Authenticated,
            enforce_policy,
        ));

    public.merge(protected)
}
