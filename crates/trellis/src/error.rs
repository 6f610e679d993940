// File: src/error.rs
// Purpose: Error types for template rendering and request dispatch

use thiserror::Error;

/// Errors produced while loading or rendering a template
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Invalid template name: {0:?}")]
    InvalidTemplateName(String),

    #[error("Undefined variable `{0}`")]
    UndefinedVariable(String),

    #[error("Unsupported expression `{{{{{0}}}}}`")]
    UnsupportedExpression(String),

    #[error("Failed to read template {name}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    /// Short name of the error kind, safe to show to clients
    pub fn kind(&self) -> &'static str {
        match self {
            RenderError::TemplateNotFound(_) => "TemplateNotFound",
            RenderError::InvalidTemplateName(_) => "InvalidTemplateName",
            RenderError::UndefinedVariable(_) => "UndefinedVariable",
            RenderError::UnsupportedExpression(_) => "UnsupportedExpression",
            RenderError::Io { .. } => "Io",
        }
    }
}

/// Errors produced while resolving and running a matched handler
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Controller not found: {0}")]
    HandlerNotFound(String),

    #[error("Action not found: {controller}.{action}")]
    ActionNotFound { controller: String, action: String },

    #[error(transparent)]
    Render(#[from] RenderError),
}
