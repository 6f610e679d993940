// File: src/template_loader.rs
// Purpose: Resolves template names to raw template text

use crate::error::RenderError;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where template text comes from
///
/// Implementations return `RenderError::TemplateNotFound` for names they
/// don't know and must never resolve a name outside their own root.
pub trait TemplateSource: Send + Sync {
    fn load(&self, name: &str) -> Result<String, RenderError>;
}

/// Checks that a template name is a plain relative key
///
/// Names may contain `/` to address subdirectories (`users/show`), but no
/// empty, `.` or `..` components, no absolute or drive prefixes, no
/// backslashes and no NUL bytes.
pub fn validate_template_name(name: &str) -> Result<(), RenderError> {
    let invalid = name.is_empty()
        || name.starts_with('/')
        || name.contains(['\\', '\0', ':'])
        || Path::new(name).is_absolute()
        || name
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == "..");

    if invalid {
        Err(RenderError::InvalidTemplateName(name.to_string()))
    } else {
        Ok(())
    }
}

/// Loads `<root>/<name>.<extension>` from disk
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    root: PathBuf,
    extension: String,
}

impl FileSystemSource {
    /// Create a source rooted at `root` using the `html` extension
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_extension(root, "html")
    }

    /// Create a source with a custom file extension (empty for none)
    pub fn with_extension(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a (validated) template name maps to
    fn path_for(&self, name: &str) -> PathBuf {
        if self.extension.is_empty() {
            self.root.join(name)
        } else {
            self.root.join(format!("{}.{}", name, self.extension))
        }
    }
}

impl TemplateSource for FileSystemSource {
    fn load(&self, name: &str) -> Result<String, RenderError> {
        validate_template_name(name)?;

        let not_found = || RenderError::TemplateNotFound(name.to_string());
        let io_error = |source| RenderError::Io {
            name: name.to_string(),
            source,
        };

        // Canonicalize both sides so symlinks can't lead outside the root
        let root = self.root.canonicalize().map_err(|_| not_found())?;
        let path = match self.path_for(name).canonicalize() {
            Ok(path) => path,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(io_error(e)),
        };
        if !path.starts_with(&root) || !path.is_file() {
            return Err(not_found());
        }

        debug!(template = name, path = ?path, "Loading template");
        fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => not_found(),
            _ => io_error(e),
        })
    }
}

/// In-memory templates, keyed by name
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    templates: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.templates.insert(name.into(), text.into());
    }
}

impl TemplateSource for MemorySource {
    fn load(&self, name: &str) -> Result<String, RenderError> {
        validate_template_name(name)?;
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| RenderError::TemplateNotFound(name.to_string()))
    }
}
