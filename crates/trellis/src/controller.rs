// File: src/controller.rs
// Purpose: Handler capability, controllers and the handler registry

use crate::error::DispatchError;
use crate::value::{TemplateVars, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use trellis_router::{HandlerRef, Params};

/// What a handler hands back: the template to render and its variables
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub template: String,
    pub vars: TemplateVars,
}

impl View {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            vars: TemplateVars::new(),
        }
    }

    /// Adds a template variable
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

/// A controller action: bound route params in, view out
///
/// Handlers never produce output themselves; the dispatcher owns rendering
/// and error handling.
pub trait Handler: Send + Sync {
    fn handle(&self, params: &Params) -> View;
}

impl<F> Handler for F
where
    F: Fn(&Params) -> View + Send + Sync,
{
    fn handle(&self, params: &Params) -> View {
        self(params)
    }
}

/// A named group of actions
///
/// ```
/// use trellis::{Controller, View};
///
/// let home = Controller::new("Home").action("index", |params: &trellis::Params| {
///     let name = params.get("name").map(String::as_str).unwrap_or("World");
///     View::new("home").with("name", name)
/// });
/// assert!(home.get("index").is_some());
/// ```
#[derive(Clone)]
pub struct Controller {
    name: String,
    actions: HashMap<String, Arc<dyn Handler>>,
}

impl Controller {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: HashMap::new(),
        }
    }

    /// Registers an action; a later action with the same name replaces it
    pub fn action(mut self, name: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.actions.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, action: &str) -> Option<&dyn Handler> {
        self.actions.get(action).map(|handler| handler.as_ref())
    }

    /// Action names, sorted
    pub fn actions(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("name", &self.name)
            .field("actions", &self.actions())
            .finish()
    }
}

/// Maps controller names to controllers; resolution is a plain lookup
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    controllers: HashMap<String, Controller>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a controller; a later controller with the same name replaces it
    pub fn controller(mut self, controller: Controller) -> Self {
        self.register(controller);
        self
    }

    pub fn register(&mut self, controller: Controller) {
        self.controllers.insert(controller.name.clone(), controller);
    }

    /// Finds the handler behind `handler`
    pub fn resolve(&self, handler: &HandlerRef) -> Result<&dyn Handler, DispatchError> {
        let controller = self
            .controllers
            .get(&handler.controller)
            .ok_or_else(|| DispatchError::HandlerNotFound(handler.controller.clone()))?;

        controller
            .get(&handler.action)
            .ok_or_else(|| DispatchError::ActionNotFound {
                controller: handler.controller.clone(),
                action: handler.action.clone(),
            })
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}
