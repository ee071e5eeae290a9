use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::{require_admin, require_user};
use crate::state::AppState;
use crate::{auth, comments, cors, posts, users};

/// Assemble the full API under `prefix` (e.g. "/api"; "" or "/" mounts at the root).
pub fn build(state: AppState, prefix: &str) -> Router {
    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let user_routes = Router::new()
        .route("/user", get(users::list_users))
        .route("/user/{id}", get(users::user_detail).delete(users::user_detail))
        .route("/post", get(posts::list_posts))
        .route("/comment", get(comments::list_comments).post(comments::create_comment))
        .route(
            "/comment/{id}",
            get(comments::comment_detail).delete(comments::comment_detail),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    let admin_routes = Router::new()
        .route("/post", post(posts::create_post))
        .route("/post/{id}", get(posts::post_detail).delete(posts::post_detail))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let api = Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .with_state(state);

    let app = match prefix.trim_end_matches('/') {
        "" => api,
        prefix => Router::new().nest(prefix, api),
    };

    cors::apply(app)
}
