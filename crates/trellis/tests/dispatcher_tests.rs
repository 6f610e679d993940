//! Integration tests for request dispatch and template rendering
//!
//! Covers:
//! - End-to-end dispatch (match → handler → render → response)
//! - Not-found, wiring and render failures mapped to status codes
//! - Filesystem templates, including path-traversal attempts

use pretty_assertions::assert_eq;
use std::fs;
use trellis::*;

const HOME: &str = "<h1>Hello, {{ name }}!</h1>\n<p>Welcome to our MVC demo.</p>\n";
const ABOUT: &str = "<h1>About</h1>\n<p>The year is {{ year }}.</p>\n";

fn home_controller() -> Controller {
    Controller::new("Home").action("index", |params: &Params| {
        let name = params.get("name").map(String::as_str).unwrap_or("World");
        View::new("home").with("name", name)
    })
}

fn about_controller() -> Controller {
    Controller::new("About").action("info", |_: &Params| View::new("about").with("year", 2026))
}

fn demo_dispatcher() -> Dispatcher {
    let routes = RouteTable::from_routes([
        ("GET", "/", "Home.index"),
        ("GET", "/about", "About.info"),
        ("GET", "/hello/{name}", "Home.index"),
    ])
    .unwrap();
    let handlers = HandlerRegistry::new()
        .controller(home_controller())
        .controller(about_controller());
    let templates = TemplateEngine::new(
        MemorySource::new()
            .with_template("home", HOME)
            .with_template("about", ABOUT),
    );
    Dispatcher::try_new(routes, handlers, templates).unwrap()
}

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn test_hello_with_name() {
    let response = demo_dispatcher().handle("GET", "/hello/Ada");
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Hello, Ada!"));
}

#[test]
fn test_root_uses_default_name() {
    let response = demo_dispatcher().handle("GET", "/");
    assert_eq!(
        response,
        Response::ok("<h1>Hello, World!</h1>\n<p>Welcome to our MVC demo.</p>\n")
    );
}

#[test]
fn test_about_renders_year() {
    let response = demo_dispatcher().handle("GET", "/about");
    assert_eq!(response.body, "<h1>About</h1>\n<p>The year is 2026.</p>\n");
}

#[test]
fn test_missing_route_is_404() {
    let response = demo_dispatcher().handle("GET", "/missing");
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, "404 Not Found");
}

#[test]
fn test_wrong_method_is_404() {
    let response = demo_dispatcher().handle("POST", "/about");
    assert_eq!(response, Response::not_found());
}

// ============================================================================
// Wiring errors
// ============================================================================

#[test]
fn test_validate_reports_missing_controller() {
    let routes = RouteTable::new().with_route("GET", "/", "Home.index").unwrap();
    let err = Dispatcher::try_new(
        routes,
        HandlerRegistry::new(),
        TemplateEngine::new(MemorySource::new()),
    )
    .unwrap_err();
    assert!(matches!(err, DispatchError::HandlerNotFound(c) if c == "Home"));
}

#[test]
fn test_validate_reports_missing_action() {
    let routes = RouteTable::new().with_route("GET", "/", "Home.show").unwrap();
    let err = Dispatcher::try_new(
        routes,
        HandlerRegistry::new().controller(home_controller()),
        TemplateEngine::new(MemorySource::new()),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::ActionNotFound { controller, action } if controller == "Home" && action == "show"
    ));
}

#[test]
fn test_unvalidated_wiring_error_is_generic_500() {
    let routes = RouteTable::new().with_route("GET", "/", "Admin.index").unwrap();
    let dispatcher = Dispatcher::new(
        routes,
        HandlerRegistry::new(),
        TemplateEngine::new(MemorySource::new()),
    );
    let response = dispatcher.handle("GET", "/");
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, "500 Internal Server Error");
}

// ============================================================================
// Render errors
// ============================================================================

fn single_route(template: &str, source: MemorySource) -> Dispatcher {
    let template = template.to_string();
    let routes = RouteTable::new().with_route("GET", "/", "Page.show").unwrap();
    let handlers = HandlerRegistry::new().controller(
        Controller::new("Page").action("show", move |_: &Params| View::new(template.clone())),
    );
    Dispatcher::try_new(routes, handlers, TemplateEngine::new(source)).unwrap()
}

#[test]
fn test_missing_template_is_500() {
    let response = single_route("nowhere", MemorySource::new()).handle("GET", "/");
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, "500 Internal Server Error (TemplateNotFound)");
}

#[test]
fn test_undefined_variable_is_500() {
    let source = MemorySource::new().with_template("home", "<h1>Hello, {{ name }}!</h1>");
    let response = single_route("home", source).handle("GET", "/");
    assert_eq!(response.body, "500 Internal Server Error (UndefinedVariable)");
}

#[test]
fn test_unsupported_expression_is_500() {
    let source = MemorySource::new().with_template("home", "{{ $name }}");
    let response = single_route("home", source).handle("GET", "/");
    assert_eq!(response.body, "500 Internal Server Error (UnsupportedExpression)");
}

#[test]
fn test_invalid_template_name_is_500() {
    let response = single_route("../secret", MemorySource::new()).handle("GET", "/");
    assert_eq!(response.body, "500 Internal Server Error (InvalidTemplateName)");
}

// ============================================================================
// Template engine
// ============================================================================

#[test]
fn test_missing_variable_scenario() {
    let engine = TemplateEngine::new(
        MemorySource::new().with_template("home", "<h1>Hello, {{ name }}!</h1>"),
    );
    let err = engine.render("home", &TemplateVars::new()).unwrap_err();
    assert!(matches!(err, RenderError::UndefinedVariable(name) if name == "name"));
}

#[test]
fn test_single_marker_replaced_and_nothing_else() {
    let text = "before {{x}} after {not a marker} }}";
    let engine = TemplateEngine::new(MemorySource::new().with_template("t", text));
    let mut vars = TemplateVars::new();
    vars.insert("x".to_string(), Value::from("5"));
    assert_eq!(
        engine.render("t", &vars).unwrap(),
        "before 5 after {not a marker} }}"
    );
}

#[test]
fn test_plain_template_is_unchanged_for_any_vars() {
    let text = "<p>No markers here.</p>";
    let engine = TemplateEngine::new(MemorySource::new().with_template("t", text));
    let mut vars = TemplateVars::new();
    assert_eq!(engine.render("t", &vars).unwrap(), text);
    vars.insert("unused".to_string(), Value::from(1));
    assert_eq!(engine.render("t", &vars).unwrap(), text);
}

#[test]
fn test_filesystem_templates_and_traversal() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("templates");
    fs::create_dir_all(root.join("users")).unwrap();
    fs::write(root.join("home.html"), HOME).unwrap();
    fs::write(root.join("users/show.html"), "<p>{{ user.name }}</p>").unwrap();
    fs::write(dir.path().join("secret.html"), "top secret").unwrap();

    let engine = TemplateEngine::new(FileSystemSource::new(&root));

    let mut vars = TemplateVars::new();
    vars.insert("name".to_string(), Value::from("Ada"));
    assert!(engine.render("home", &vars).unwrap().contains("Hello, Ada!"));

    let user = [("name".to_string(), Value::from("Bob"))].into_iter().collect();
    let mut vars = TemplateVars::new();
    vars.insert("user".to_string(), Value::Object(user));
    assert_eq!(engine.render("users/show", &vars).unwrap(), "<p>Bob</p>");

    assert!(matches!(
        engine.render("../secret", &vars),
        Err(RenderError::InvalidTemplateName(name)) if name == "../secret"
    ));
    let absolute = dir.path().join("secret").to_string_lossy().into_owned();
    assert!(matches!(
        engine.render(&absolute, &vars),
        Err(RenderError::InvalidTemplateName(_))
    ));
    assert!(matches!(
        engine.render("missing", &vars),
        Err(RenderError::TemplateNotFound(name)) if name == "missing"
    ));
}

#[cfg(unix)]
#[test]
fn test_symlink_out_of_root_is_not_followed() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("templates");
    fs::create_dir_all(&root).unwrap();
    fs::write(dir.path().join("secret.html"), "top secret").unwrap();
    std::os::unix::fs::symlink(dir.path().join("secret.html"), root.join("leak.html")).unwrap();

    let engine = TemplateEngine::new(FileSystemSource::new(&root));
    assert!(matches!(
        engine.render("leak", &TemplateVars::new()),
        Err(RenderError::TemplateNotFound(name)) if name == "leak"
    ));
}

#[test]
fn test_dispatcher_is_shareable_across_threads() {
    let dispatcher = std::sync::Arc::new(demo_dispatcher());
    let handles: Vec<_> = ["Ada", "Grace", "Linus"]
        .into_iter()
        .map(|name| {
            let dispatcher = dispatcher.clone();
            std::thread::spawn(move || dispatcher.handle("GET", &format!("/hello/{name}")))
        })
        .collect();

    for (handle, name) in handles.into_iter().zip(["Ada", "Grace", "Linus"]) {
        let response = handle.join().unwrap();
        assert!(response.body.contains(&format!("Hello, {name}!")));
    }
}
