use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};
use loginreg_auth::Session;
use tracing::debug;

use crate::{util::found, ApiError};

/// Identifier of the signed-in user, inserted by [`require_user`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i64);

/// Let the request through only when the session holds a user id; otherwise
/// redirect to the index page without running the handler.
pub async fn require_user(
    Extension(session): Extension<Session>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(user_id) = session.user_id().await? else {
        debug!(path = %request.uri().path(), "no signed-in user, redirecting to index");
        return Ok(found("/"));
    };

    request.extensions_mut().insert(CurrentUser(user_id));
    Ok(next.run(request).await)
}
