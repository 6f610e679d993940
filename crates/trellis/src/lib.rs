// Trellis - minimal request dispatch and template interpolation
// Routes (method, path) pairs to controller actions and renders {{ }} templates

pub mod value;
pub mod error;
pub mod expression;

// Framework modules
pub mod renderer;
pub mod template_loader;
pub mod controller;
pub mod dispatcher;
pub mod response;
pub mod config;

// Re-export framework types
pub use config::{Config, RouteConfig};
pub use controller::{Controller, Handler, HandlerRegistry, View};
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, RenderError};
pub use renderer::{CompiledTemplate, TemplateEngine};
pub use response::Response;
pub use template_loader::{FileSystemSource, MemorySource, TemplateSource};
pub use value::{TemplateVars, Value};

// Re-export router types
pub use trellis_router::{HandlerRef, MatchResult, Params, Route, RouteError, RouteTable};

// Re-export commonly used types from dependencies
pub use axum::http::StatusCode;
