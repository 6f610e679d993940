use chrono::Datelike;
use trellis::{Controller, HandlerRegistry, Params, View};

/// `Home.index`: greets `{name}` from the route, or the world
fn home_index(params: &Params) -> View {
    let name = params.get("name").map(String::as_str).unwrap_or("World");
    View::new("home").with("name", name)
}

/// `About.info`: shows the current year
fn about_info(_params: &Params) -> View {
    View::new("about").with("year", chrono::Local::now().year())
}

/// Controllers served by the reference server
pub fn registry() -> HandlerRegistry {
    HandlerRegistry::new()
        .controller(Controller::new("Home").action("index", home_index))
        .controller(Controller::new("About").action("info", about_info))
}
