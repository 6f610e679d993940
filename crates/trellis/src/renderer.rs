use crate::error::RenderError;
use crate::expression::Expression;
use crate::template_loader::TemplateSource;
use crate::value::TemplateVars;
use dashmap::DashMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, warn};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Text(Range<usize>),
    Marker { span: Range<usize>, expr: Expression },
}

/// A template split into literal text and `{{ }}` markers
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTemplate {
    name: String,
    source: String,
    parts: Vec<Part>,
}

impl CompiledTemplate {
    /// Scans `source` for markers
    ///
    /// The first `}}` after an opening `{{` closes the marker; an opening
    /// `{{` that is never closed is kept as literal text.
    pub fn parse(name: impl Into<String>, source: impl Into<String>) -> Result<Self, RenderError> {
        let source = source.into();
        let mut parts = Vec::new();
        let mut cursor = 0;

        while let Some(found) = source[cursor..].find(OPEN) {
            let open = cursor + found;
            let inner_start = open + OPEN.len();
            let Some(len) = source[inner_start..].find(CLOSE) else {
                break;
            };
            let inner_end = inner_start + len;

            if open > cursor {
                parts.push(Part::Text(cursor..open));
            }
            parts.push(Part::Marker {
                span: open..inner_end + CLOSE.len(),
                expr: Expression::parse(&source[inner_start..inner_end])?,
            });
            cursor = inner_end + CLOSE.len();
        }

        if cursor < source.len() {
            parts.push(Part::Text(cursor..source.len()));
        }

        Ok(Self {
            name: name.into(),
            source,
            parts,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw template text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Byte span and expression of every marker, left to right
    pub fn markers(&self) -> impl Iterator<Item = (Range<usize>, &Expression)> {
        self.parts.iter().filter_map(|part| match part {
            Part::Marker { span, expr } => Some((span.clone(), expr)),
            Part::Text(_) => None,
        })
    }

    /// Substitutes every marker in one pass; substituted text is never re-scanned
    pub fn render(&self, vars: &TemplateVars, html_escape: bool) -> Result<String, RenderError> {
        let mut html = String::with_capacity(self.source.len());
        for part in &self.parts {
            match part {
                Part::Text(range) => html.push_str(&self.source[range.clone()]),
                Part::Marker { expr, .. } => {
                    let text = expr.evaluate(vars)?;
                    if html_escape {
                        escape_html_into(&mut html, &text);
                    } else {
                        html.push_str(&text);
                    }
                }
            }
        }
        Ok(html)
    }
}

fn escape_html_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// Loads, compiles and renders named templates
///
/// Compiled templates are cached for the life of the engine. Two threads
/// loading the same template at once may both compile it; only one entry
/// is kept.
pub struct TemplateEngine {
    source: Box<dyn TemplateSource>,
    cache: DashMap<String, Arc<CompiledTemplate>>,
    cache_enabled: bool,
    html_escape: bool,
}

impl TemplateEngine {
    pub fn new(source: impl TemplateSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cache: DashMap::new(),
            cache_enabled: true,
            html_escape: false,
        }
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Escape `& < > " '` in substituted values (template text is untouched)
    pub fn with_html_escape(mut self, enabled: bool) -> Self {
        self.html_escape = enabled;
        self
    }

    /// Loads and compiles a template, going through the cache when enabled
    pub fn compile(&self, name: &str) -> Result<Arc<CompiledTemplate>, RenderError> {
        if self.cache_enabled {
            if let Some(hit) = self.cache.get(name) {
                return Ok(Arc::clone(hit.value()));
            }
        }

        let text = self.source.load(name)?;
        let compiled = Arc::new(CompiledTemplate::parse(name, text)?);
        debug!(template = name, markers = compiled.markers().count(), "Compiled template");

        if !self.cache_enabled {
            return Ok(compiled);
        }
        let entry = self.cache.entry(name.to_string()).or_insert(compiled);
        Ok(Arc::clone(entry.value()))
    }

    /// Renders the template called `name` with `vars`
    ///
    /// # Examples
    ///
    /// ```
    /// use trellis::{MemorySource, TemplateEngine, TemplateVars, Value};
    ///
    /// let engine = TemplateEngine::new(
    ///     MemorySource::new().with_template("home", "<h1>Hello, {{ name }}!</h1>"),
    /// );
    /// let mut vars = TemplateVars::new();
    /// vars.insert("name".to_string(), Value::from("Ada"));
    ///
    /// assert_eq!(engine.render("home", &vars).unwrap(), "<h1>Hello, Ada!</h1>");
    /// ```
    pub fn render(&self, name: &str, vars: &TemplateVars) -> Result<String, RenderError> {
        self.compile(name)?.render(vars, self.html_escape)
    }

    /// Compiles templates ahead of the first request
    ///
    /// Stops at the first template that fails; returns how many were compiled.
    pub fn preload<I, S>(&self, names: I) -> Result<usize, RenderError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut count = 0;
        for name in names {
            let name = name.as_ref();
            self.compile(name).inspect_err(|e| {
                warn!(template = name, error = %e, "Failed to preload template");
            })?;
            count += 1;
        }
        Ok(count)
    }

    /// Number of cached templates
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("cached", &self.cache.len())
            .field("cache_enabled", &self.cache_enabled)
            .field("html_escape", &self.html_escape)
            .finish()
    }
}
