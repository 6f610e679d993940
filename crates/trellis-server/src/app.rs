use crate::controllers;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{Method, Uri},
    response::IntoResponse,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use trellis::{Config, Dispatcher};

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
}

/// Builds the dispatcher from config and checks every route's handler exists
pub fn build_dispatcher(config: &Config) -> Result<Dispatcher> {
    let routes = config.route_table()?;
    Dispatcher::try_new(routes, controllers::registry(), config.template_engine())
        .context("Route table references an unregistered handler")
}

/// Every request goes through the dispatcher; axum only does transport
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .fallback(dispatch_handler)
        .with_state(AppState { dispatcher })
        .layer(TraceLayer::new_for_http())
}

async fn dispatch_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> impl IntoResponse {
    // Uri::path() excludes the query string
    state.dispatcher.handle(method.as_str(), uri.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;
    use trellis::{MemorySource, TemplateEngine};

    fn create_test_app() -> Router {
        let templates = TemplateEngine::new(
            MemorySource::new()
                .with_template("home", "<h1>Hello, {{ name }}!</h1>")
                .with_template("about", "<p>The year is {{ year }}.</p>"),
        );
        let routes = Config::default().route_table().unwrap();
        let dispatcher = Dispatcher::try_new(routes, controllers::registry(), templates).unwrap();
        router(Arc::new(dispatcher))
    }

    async fn send(method: &str, uri: &str) -> (StatusCode, String) {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_hello_route() {
        let (status, body) = send("GET", "/hello/Ada").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>Hello, Ada!</h1>");
    }

    #[tokio::test]
    async fn test_query_string_is_ignored() {
        let (status, body) = send("GET", "/hello/Ada?x=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>Hello, Ada!</h1>");
    }

    #[tokio::test]
    async fn test_index_defaults_to_world() {
        let (_, body) = send("GET", "/").await;
        assert_eq!(body, "<h1>Hello, World!</h1>");
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let (status, body) = send("GET", "/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "404 Not Found");
    }

    #[tokio::test]
    async fn test_unrouted_method_is_404() {
        let (status, _) = send("POST", "/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_about_renders_year() {
        let (status, body) = send("GET", "/about").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("<p>The year is 20"));
    }

    #[test]
    fn test_build_dispatcher_rejects_unknown_handler() {
        let config = Config::from_toml(
            r#"
            [[routes]]
            pattern = "/admin"
            handler = "Admin.index"
            "#,
        )
        .unwrap();
        assert!(build_dispatcher(&config).is_err());
    }
}
