//! Route table storage.
//!
//! # Responsibilities
//! - Hold the ordered `[uri]` entries and the `default`/`abort` singletons
//! - Resolve configured handler paths against a base directory
//! - Merge (append) or replace entries on repeated loads
//!
//! # Design Decisions
//! - Patterns are parsed once, at insertion
//! - Appending a reference that already exists replaces its handler but
//!   keeps its original position
//! - Only the abort singleton may change after loading, through a setter

use std::path::{Path, PathBuf};

use crate::config::{ConfigError, RouterConfig};
use crate::routing::pattern::ReferencePattern;

/// One `[uri]` entry.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    /// Reference as written in the configuration.
    pub reference: String,
    pub pattern: ReferencePattern,
    pub handler: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    default: Option<PathBuf>,
    abort: Option<PathBuf>,
    routes: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route without touching the filesystem.
    pub fn with_route(mut self, reference: impl Into<String>, handler: impl Into<PathBuf>) -> Self {
        self.insert(reference.into(), handler.into());
        self
    }

    pub fn with_default(mut self, handler: impl Into<PathBuf>) -> Self {
        self.default = Some(handler.into());
        self
    }

    pub fn with_abort(mut self, handler: impl Into<PathBuf>) -> Self {
        self.abort = Some(handler.into());
        self
    }

    /// Load a validated configuration.
    ///
    /// Every handler path must exist verbatim or under `base_dir`.
    pub fn load(
        &mut self,
        config: &RouterConfig,
        base_dir: &Path,
        append: bool,
    ) -> Result<(), ConfigError> {
        let default = config
            .general
            .default
            .as_deref()
            .map(|raw| resolve_handler("default", raw, base_dir))
            .transpose()?;
        let abort = config
            .general
            .abort
            .as_deref()
            .map(|raw| resolve_handler("abort", raw, base_dir))
            .transpose()?;
        let routes = config
            .uri
            .iter()
            .map(|(reference, raw)| Ok((reference, resolve_handler(reference, raw, base_dir)?)))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        if !append {
            *self = Self::default();
        }
        if default.is_some() {
            self.default = default;
        }
        if abort.is_some() {
            self.abort = abort;
        }
        for (reference, handler) in routes {
            self.insert(reference.to_string(), handler);
        }

        Ok(())
    }

    fn insert(&mut self, reference: String, handler: PathBuf) {
        if let Some(existing) = self.routes.iter_mut().find(|e| e.reference == reference) {
            existing.handler = handler;
            return;
        }
        self.routes.push(RouteEntry {
            pattern: ReferencePattern::parse(&reference),
            reference,
            handler,
        });
    }

    pub fn default_handler(&self) -> Option<&Path> {
        self.default.as_deref()
    }

    pub fn abort_handler(&self) -> Option<&Path> {
        self.abort.as_deref()
    }

    /// Replace the abort handler. `None` restores the built-in render.
    pub fn set_abort_handler(&mut self, handler: Option<PathBuf>) {
        self.abort = handler;
    }

    /// Routes in match priority order.
    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn resolve_handler(reference: &str, raw: &str, base_dir: &Path) -> Result<PathBuf, ConfigError> {
    let verbatim = Path::new(raw);
    if verbatim.exists() {
        return Ok(verbatim.to_path_buf());
    }
    let joined = base_dir.join(raw);
    if joined.exists() {
        return Ok(joined);
    }
    Err(ConfigError::MissingHandler {
        reference: reference.to_string(),
        handler: raw.to_string(),
        base_dir: base_dir.to_path_buf(),
    })
}
