//! # Trellis Router
//!
//! An ordered route table that maps `(method, path)` pairs to handler
//! references:
//! - Static segments (`/about`)
//! - Named captures (`/hello/{name}`)
//! - Case-sensitive method matching
//! - First-match-wins dispatch in registration order
//!
//! Routes are compiled once when they are registered and never mutated
//! afterwards, so a built table can be shared across threads without locking.
//!
//! ## Example
//!
//! ```
//! use trellis_router::{MatchResult, RouteTable};
//!
//! let routes = RouteTable::new()
//!     .with_route("GET", "/", "Home.index").unwrap()
//!     .with_route("GET", "/hello/{name}", "Home.index").unwrap();
//!
//! match routes.dispatch("GET", "/hello/Ada") {
//!     MatchResult::Matched { handler, params } => {
//!         assert_eq!(handler.to_string(), "Home.index");
//!         assert_eq!(params.get("name"), Some(&"Ada".to_string()));
//!     }
//!     MatchResult::NoMatch => unreachable!(),
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub mod route;

pub use route::pattern::{classify_segment, CompiledPattern, Params, PatternSegmentType};

// ============================================================================
// Errors
// ============================================================================

/// A route pattern that cannot be compiled
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("route pattern `{0}` must start with `/`")]
    MissingLeadingSlash(String),

    #[error("route pattern `{pattern}` declares capture `{name}` more than once")]
    DuplicateCapture { pattern: String, name: String },

    #[error("route pattern `{pattern}` has invalid capture name `{name}`")]
    InvalidCaptureName { pattern: String, name: String },

    #[error("route pattern `{pattern}` has unsupported segment `{segment}`")]
    StrayBrace { pattern: String, segment: String },
}

/// Errors raised while registering a route
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error(transparent)]
    InvalidPattern(#[from] PatternError),

    #[error("invalid handler reference `{0}`: expected `Controller.action`")]
    InvalidHandlerRef(String),
}

// ============================================================================
// Core Types
// ============================================================================

/// Reference to a controller action, written `Controller.action`
///
/// # Examples
///
/// ```
/// use trellis_router::HandlerRef;
///
/// let handler: HandlerRef = "Home.index".parse().unwrap();
/// assert_eq!(handler.controller, "Home");
/// assert_eq!(handler.action, "index");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerRef {
    pub controller: String,
    pub action: String,
}

impl HandlerRef {
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
        }
    }
}

impl FromStr for HandlerRef {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((controller, action))
                if !controller.is_empty() && !action.is_empty() && !action.contains('.') =>
            {
                Ok(Self::new(controller, action))
            }
            _ => Err(RouteError::InvalidHandlerRef(s.to_string())),
        }
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.controller, self.action)
    }
}

/// A single registered route
#[derive(Debug, Clone)]
pub struct Route {
    /// HTTP method, compared case-sensitively
    pub method: String,
    /// Compiled path pattern like "/hello/{name}"
    pub pattern: CompiledPattern,
    /// Handler invoked when this route matches
    pub handler: HandlerRef,
}

impl Route {
    /// Builds a route, compiling the pattern and parsing the handler reference
    ///
    /// # Examples
    ///
    /// ```
    /// use trellis_router::Route;
    ///
    /// let route = Route::new("GET", "/users/{id}", "Users.show").unwrap();
    /// assert_eq!(route.pattern.as_str(), "/users/{id}");
    /// assert!(Route::new("GET", "/users/{id}", "Users").is_err());
    /// ```
    pub fn new(
        method: impl Into<String>,
        pattern: &str,
        handler: &str,
    ) -> Result<Self, RouteError> {
        Ok(Self {
            method: method.into(),
            pattern: CompiledPattern::compile(pattern)?,
            handler: handler.parse()?,
        })
    }

    /// Matches this route against a request (method is case-sensitive)
    pub fn matches(&self, method: &str, path: &str) -> Option<Params> {
        if self.method != method {
            return None;
        }
        self.pattern.matches(path)
    }
}

/// Outcome of dispatching a request against the route table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    NoMatch,
    Matched { handler: HandlerRef, params: Params },
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }
}

// ============================================================================
// Route Table
// ============================================================================

/// Ordered list of routes; the first route that matches wins
///
/// Shadowed or duplicate routes are accepted silently, ordering them is
/// the registrant's job.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(method, pattern, handler)` tuples, keeping their order
    ///
    /// # Examples
    ///
    /// ```
    /// use trellis_router::RouteTable;
    ///
    /// let routes = RouteTable::from_routes([
    ///     ("GET", "/", "Home.index"),
    ///     ("GET", "/about", "About.info"),
    /// ])
    /// .unwrap();
    /// assert_eq!(routes.len(), 2);
    /// ```
    pub fn from_routes<I, M, P, H>(routes: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = (M, P, H)>,
        M: Into<String>,
        P: AsRef<str>,
        H: AsRef<str>,
    {
        routes
            .into_iter()
            .map(|(method, pattern, handler)| Route::new(method, pattern.as_ref(), handler.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(|routes| Self { routes })
    }

    /// Registers a route at the end of the table
    pub fn register(
        &mut self,
        method: impl Into<String>,
        pattern: &str,
        handler: &str,
    ) -> Result<&mut Self, RouteError> {
        self.add_route(Route::new(method, pattern, handler)?);
        Ok(self)
    }

    /// Builder form of [`RouteTable::register`]
    pub fn with_route(
        mut self,
        method: impl Into<String>,
        pattern: &str,
        handler: &str,
    ) -> Result<Self, RouteError> {
        self.register(method, pattern, handler)?;
        Ok(self)
    }

    /// Appends an already-built route
    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Finds the first route matching `method` and `path`
    pub fn dispatch(&self, method: &str, path: &str) -> MatchResult {
        self.routes
            .iter()
            .find_map(|route| {
                route.matches(method, path).map(|params| MatchResult::Matched {
                    handler: route.handler.clone(),
                    params,
                })
            })
            .unwrap_or(MatchResult::NoMatch)
    }

    /// Routes in registration order
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
