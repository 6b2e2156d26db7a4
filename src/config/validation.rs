//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject patterns that can never be used meaningfully
//! - Reject empty handler paths
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Handler existence is checked later, when paths are resolved against
//!   the base directory

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::routing::pattern::ReferencePattern;

/// A semantic problem in a routing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A `[uri]` key is empty or only slashes.
    #[error("empty reference pattern for handler `{0}`")]
    EmptyPattern(String),

    /// A capture marker with no name (`?` alone) would store under "".
    #[error("reference `{0}` declares a capture with an empty name")]
    EmptyCapture(String),

    /// A `[uri]` value is empty.
    #[error("reference `{0}` has an empty handler path")]
    EmptyHandler(String),

    /// A `[general]` entry is present but empty.
    #[error("[general] `{0}` handler path is empty")]
    EmptyGeneral(&'static str),

    #[error("document root `{0}` must start with `/`")]
    RelativeDocumentRoot(String),
}

pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (key, value) in [("default", &config.general.default), ("abort", &config.general.abort)] {
        if matches!(value, Some(path) if path.trim().is_empty()) {
            errors.push(ValidationError::EmptyGeneral(key));
        }
    }

    for (reference, handler) in config.uri.iter() {
        if reference.trim().trim_matches('/').is_empty() {
            errors.push(ValidationError::EmptyPattern(handler.to_string()));
            continue;
        }
        if ReferencePattern::parse(reference).captures().iter().any(String::is_empty) {
            errors.push(ValidationError::EmptyCapture(reference.to_string()));
        }
        if handler.trim().is_empty() {
            errors.push(ValidationError::EmptyHandler(reference.to_string()));
        }
    }

    if !config.resolver.document_root.starts_with('/') {
        errors.push(ValidationError::RelativeDocumentRoot(
            config.resolver.document_root.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
