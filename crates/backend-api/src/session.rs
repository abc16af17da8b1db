//! Binds the client's session cookie to a [`Session`] for each request.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use loginreg_auth::{Session, SessionChange};
use tracing::debug;

use crate::{ApiError, AppState};

/// Open the session for the presented cookie and expose it to handlers as an
/// `Extension<Session>`.
///
/// The cookie is only issued once a fresh session has been written to, and
/// is removed once the session is cleared or turns out to be stale.
pub async fn session_layer(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = jar
        .get(state.cookie().name())
        .map(|cookie| cookie.value().to_owned());

    let session = state.sessions().open(presented.as_deref()).await?;
    request.extensions_mut().insert(session.clone());

    let response = next.run(request).await;

    let jar = settle_cookie(&state, jar, &session, presented.is_some());
    Ok((jar, response).into_response())
}

fn settle_cookie(state: &AppState, jar: CookieJar, session: &Session, presented: bool) -> CookieJar {
    match session.change() {
        SessionChange::Written if session.is_new() => {
            debug!("issuing session cookie");
            jar.add(state.cookie().issue(session.token().to_owned()))
        }
        SessionChange::Cleared if presented => jar.remove(state.cookie().removal()),
        SessionChange::Untouched if presented && session.is_new() => {
            jar.remove(state.cookie().removal())
        }
        _ => jar,
    }
}
