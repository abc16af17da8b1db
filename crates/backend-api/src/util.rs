use axum::http::{header::LOCATION, StatusCode};
use axum::response::{IntoResponse, Response};

/// `302 Found` pointing at `location`.
pub fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}
