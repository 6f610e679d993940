// File: src/config.rs
// Purpose: Configuration parsing from trellis.toml

use crate::renderer::TemplateEngine;
use crate::template_loader::FileSystemSource;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use trellis_router::RouteTable;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub templates: TemplateConfig,

    /// Route table in match order; empty means the built-in default table
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Template configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Directory containing template files (default: "templates")
    #[serde(default = "default_templates_dir")]
    pub dir: String,

    /// File extension appended to template names (default: "html")
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Keep compiled templates for the process lifetime
    #[serde(default = "default_true")]
    pub cache: bool,

    /// Compile every template referenced by `preload_templates` at startup
    #[serde(default = "default_true")]
    pub preload: bool,

    #[serde(default = "default_preload_templates")]
    pub preload_templates: Vec<String>,

    /// HTML-escape substituted values
    #[serde(default = "default_false")]
    pub html_escape: bool,
}

/// One `[[routes]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    #[serde(default = "default_method")]
    pub method: String,
    pub pattern: String,
    pub handler: String,
}

impl RouteConfig {
    pub fn new(method: &str, pattern: &str, handler: &str) -> Self {
        Self {
            method: method.to_string(),
            pattern: pattern.to_string(),
            handler: handler.to_string(),
        }
    }
}

// Default values
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_templates_dir() -> String {
    "templates".to_string()
}

fn default_extension() -> String {
    "html".to_string()
}

fn default_preload_templates() -> Vec<String> {
    vec!["home".to_string(), "about".to_string()]
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

/// Routes served when the config file lists none
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig::new("GET", "/", "Home.index"),
        RouteConfig::new("GET", "/about", "About.info"),
        RouteConfig::new("GET", "/hello/{name}", "Home.index"),
    ]
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            dir: default_templates_dir(),
            extension: default_extension(),
            cache: true,
            preload: true,
            preload_templates: default_preload_templates(),
            html_escape: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist or is empty, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Parse configuration from TOML text (empty text gives the defaults)
    pub fn from_toml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from default path (./trellis.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("trellis.toml")
    }

    /// Configured routes, or [`default_routes`] when none are listed
    pub fn effective_routes(&self) -> Vec<RouteConfig> {
        if self.routes.is_empty() {
            default_routes()
        } else {
            self.routes.clone()
        }
    }

    /// Compiles the route table, failing on the first invalid route
    pub fn route_table(&self) -> Result<RouteTable> {
        let routes = self.effective_routes();
        RouteTable::from_routes(
            routes
                .iter()
                .map(|r| (r.method.as_str(), r.pattern.as_str(), r.handler.as_str())),
        )
        .context("Invalid route configuration")
    }

    /// Builds a filesystem-backed template engine from `[templates]`
    pub fn template_engine(&self) -> TemplateEngine {
        let templates = &self.templates;
        TemplateEngine::new(FileSystemSource::with_extension(&templates.dir, &templates.extension))
            .with_cache(templates.cache)
            .with_html_escape(templates.html_escape)
    }

    /// Address to bind, e.g. "127.0.0.1:3000"
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
