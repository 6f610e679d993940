// File: src/response.rs
// Purpose: Transport-neutral response value produced by the dispatcher

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;

/// Status code and body handed back to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub body: String,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "404 Not Found")
    }

    /// 500 with an optional client-safe detail, e.g. `(TemplateNotFound)`
    pub fn internal_error(detail: Option<&str>) -> Self {
        let body = match detail {
            Some(detail) => format!("500 Internal Server Error ({})", detail),
            None => "500 Internal Server Error".to_string(),
        };
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, body)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        let mut response = (self.status, self.body).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        response
    }
}
