//! HTTP surface for the login and registration service.
//!
//! `build_router` wires the pages and form handlers behind the session
//! layer; `/success` additionally sits behind [`guard::require_user`].

mod error;
mod state;
mod util;

pub mod guard;
pub mod routes;
pub mod session;
pub mod views;

pub use error::ApiError;
pub use guard::CurrentUser;
pub use state::{AppState, SessionCookie};

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/success", get(routes::home::success))
        .route_layer(middleware::from_fn(guard::require_user));

    Router::new()
        .route("/", get(routes::home::index))
        .route("/users/create", post(routes::users::create_user))
        .route("/users/login", post(routes::users::login_user))
        .route("/users/logout", post(routes::users::logout_user))
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::session_layer,
        ))
        // health checks bypass the session layer
        .route("/health", get(routes::health::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
