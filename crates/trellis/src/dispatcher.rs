// File: src/dispatcher.rs
// Purpose: Route a request, run its handler and render the resulting view

use crate::controller::HandlerRegistry;
use crate::error::DispatchError;
use crate::renderer::TemplateEngine;
use crate::response::Response;
use trellis_router::{HandlerRef, MatchResult, Params, RouteTable};
use tracing::{debug, error, warn};

/// Request dispatcher: the single place errors turn into responses
///
/// Holds the route table, the handler registry and the template engine.
/// Everything but the template cache is read-only after construction, so a
/// dispatcher can be shared across threads behind an `Arc`.
#[derive(Debug)]
pub struct Dispatcher {
    routes: RouteTable,
    handlers: HandlerRegistry,
    templates: TemplateEngine,
}

impl Dispatcher {
    pub fn new(routes: RouteTable, handlers: HandlerRegistry, templates: TemplateEngine) -> Self {
        Self {
            routes,
            handlers,
            templates,
        }
    }

    /// [`Dispatcher::new`] followed by [`Dispatcher::validate`]
    pub fn try_new(
        routes: RouteTable,
        handlers: HandlerRegistry,
        templates: TemplateEngine,
    ) -> Result<Self, DispatchError> {
        let dispatcher = Self::new(routes, handlers, templates);
        dispatcher.validate()?;
        Ok(dispatcher)
    }

    /// Checks that every route points at a registered controller action
    pub fn validate(&self) -> Result<(), DispatchError> {
        self.routes
            .routes()
            .iter()
            .try_for_each(|route| self.handlers.resolve(&route.handler).map(|_| ()))
    }

    /// Handles one request; never fails, every error becomes a response
    pub fn handle(&self, method: &str, path: &str) -> Response {
        match self.routes.dispatch(method, path) {
            MatchResult::NoMatch => {
                warn!(method, path, "No route matched");
                Response::not_found()
            }
            MatchResult::Matched { handler, params } => {
                debug!(method, path, handler = %handler, ?params, "Route matched");
                match self.run(&handler, &params) {
                    Ok(body) => Response::ok(body),
                    Err(e) => self.error_response(&handler, e),
                }
            }
        }
    }

    /// Resolves and invokes the handler, then renders its view
    pub fn run(&self, handler: &HandlerRef, params: &Params) -> Result<String, DispatchError> {
        let view = self.handlers.resolve(handler)?.handle(params);
        let body = self.templates.render(&view.template, &view.vars)?;
        Ok(body)
    }

    fn error_response(&self, handler: &HandlerRef, e: DispatchError) -> Response {
        match e {
            DispatchError::Render(render) => {
                error!(handler = %handler, kind = render.kind(), error = %render, "Failed to render view");
                Response::internal_error(Some(render.kind()))
            }
            wiring => {
                error!(handler = %handler, error = %wiring, "Handler wiring error");
                Response::internal_error(None)
            }
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn templates(&self) -> &TemplateEngine {
        &self.templates
    }
}
