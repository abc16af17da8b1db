//! Registration, login and logout handlers.
//!
//! Recoverable failures re-render the index page with field messages on the
//! form that was submitted; store failures end on the error page.

use axum::{
    extract::{Extension, State},
    response::{Html, IntoResponse, Response},
    Form,
};
use loginreg_auth::{AuthError, LoginCredentials, RegistrationForm, Session};

use crate::{
    util::found,
    views::{self, FormState, IndexView},
    ApiError, AppState,
};

pub async fn create_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, ApiError> {
    match state.authenticator().register(&form).await {
        Ok(user) => {
            session.set_user_id(user.id).await?;
            Ok(found("/success"))
        }
        Err(error) => rejected(error, |errors| {
            IndexView::with_registration(FormState::rejected(&form.email, errors))
        }),
    }
}

pub async fn login_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(credentials): Form<LoginCredentials>,
) -> Result<Response, ApiError> {
    match state.authenticator().login(&credentials).await {
        Ok(user) => {
            session.set_user_id(user.id).await?;
            Ok(found("/success"))
        }
        Err(error) => rejected(error, |errors| {
            IndexView::with_login(FormState::rejected(&credentials.email, errors))
        }),
    }
}

pub async fn logout_user(Extension(session): Extension<Session>) -> Result<Response, ApiError> {
    session.clear().await?;
    Ok(found("/"))
}

fn rejected(
    error: AuthError,
    view: impl FnOnce(loginreg_auth::FieldErrors) -> IndexView,
) -> Result<Response, ApiError> {
    match error.field_errors() {
        Some(errors) => Ok(Html(views::index_page(&view(errors))).into_response()),
        None => Err(ApiError::from(error)),
    }
}
