use axum::http::{header::CACHE_CONTROL, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use loginreg_auth::AuthError;
use loginreg_database::DatabaseError;
use tracing::error;
use uuid::Uuid;

use crate::views;

/// Failure that ends a request on the generic error page.
///
/// The page only shows the correlation id; the underlying error is logged
/// under the same id.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub correlation_id: Uuid,
}

impl ApiError {
    pub fn internal_server_error() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            correlation_id: Uuid::new_v4(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let page = views::error_page(&self.correlation_id.to_string());
        (self.status, [(CACHE_CONTROL, "no-store")], Html(page)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(error: DatabaseError) -> Self {
        let api_error = Self::internal_server_error();
        error!(
            correlation_id = %api_error.correlation_id,
            error = ?error,
            "database error"
        );
        api_error
    }
}

/// Form-level rejections are re-rendered by the handlers and never get here.
impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        if let AuthError::Database(error) = error {
            return Self::from(error);
        }

        let api_error = Self::internal_server_error();
        error!(
            correlation_id = %api_error.correlation_id,
            error = ?error,
            "auth error"
        );
        api_error
    }
}
