// File: src/expression.rs
// Purpose: Parse and resolve the restricted expressions allowed inside {{ }} markers

use crate::error::RenderError;
use crate::value::{TemplateVars, Value};
use trellis_router::route::is_identifier;

/// A parsed marker expression
///
/// Grammar (nothing here is ever evaluated as code):
///
/// ```text
/// expr   := path [ "|" "default" "(" string ")" ]
/// path   := ident ( "." ident )*
/// string := '"' ... '"' | "'" ... "'"
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    path: Vec<String>,
    default: Option<String>,
}

impl Expression {
    /// Parses the text between `{{` and `}}`
    ///
    /// # Examples
    ///
    /// ```
    /// use trellis::expression::Expression;
    ///
    /// let expr = Expression::parse(" user.name | default(\"guest\") ").unwrap();
    /// assert_eq!(expr.path(), "user.name");
    /// assert_eq!(expr.default_text(), Some("guest"));
    ///
    /// assert!(Expression::parse("1 + 1").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, RenderError> {
        let unsupported = || RenderError::UnsupportedExpression(raw.trim().to_string());

        let (path_part, filter_part) = match raw.split_once('|') {
            Some((path, filter)) => (path, Some(filter)),
            None => (raw, None),
        };

        let path: Vec<String> = path_part.trim().split('.').map(str::to_string).collect();
        if !path.iter().all(|part| is_identifier(part)) {
            return Err(unsupported());
        }

        let default = filter_part
            .map(|filter| parse_default_filter(filter).ok_or_else(unsupported))
            .transpose()?;

        Ok(Self { path, default })
    }

    /// Dotted path this expression reads
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    pub fn default_text(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Walks the path through `vars`, descending into object values
    pub fn lookup<'a>(&self, vars: &'a TemplateVars) -> Option<&'a Value> {
        let (first, rest) = self.path.split_first()?;
        rest.iter()
            .try_fold(vars.get(first)?, |value, field| value.get(field))
    }

    /// Text this expression renders to
    ///
    /// The default applies when the path doesn't resolve or resolves to
    /// `Null`; without one a missing path is `UndefinedVariable`.
    pub fn evaluate(&self, vars: &TemplateVars) -> Result<String, RenderError> {
        match (self.lookup(vars), &self.default) {
            (Some(value), Some(default)) if value.is_null() => Ok(default.clone()),
            (Some(value), _) => Ok(value.to_string()),
            (None, Some(default)) => Ok(default.clone()),
            (None, None) => Err(RenderError::UndefinedVariable(self.path())),
        }
    }
}

/// Parses `default("text")` / `default('text')`
fn parse_default_filter(filter: &str) -> Option<String> {
    let args = filter
        .trim()
        .strip_prefix("default")?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')?
        .trim();

    ['"', '\''].into_iter().find_map(|quote| {
        let inner = args.strip_prefix(quote)?.strip_suffix(quote)?;
        (!inner.contains(quote)).then(|| inner.to_string())
    })
}
