use axum::{
    extract::{Extension, State},
    response::Html,
};
use tracing::warn;

use crate::{guard::CurrentUser, views, ApiError, AppState};

pub async fn index() -> Html<String> {
    Html(views::index_page(&views::IndexView::default()))
}

pub async fn success(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Html<String>, ApiError> {
    let user = state.authenticator().user_profile(user_id).await?;
    if user.is_none() {
        warn!(user_id, "session refers to a missing user");
    }

    Ok(Html(views::success_page(
        user.as_ref().map(|user| user.email.as_str()),
    )))
}
