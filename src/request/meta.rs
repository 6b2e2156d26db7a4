//! Server metadata access.
//!
//! # Responsibilities
//! - Provide the invoking script's filesystem path
//! - Provide the raw request URI
//! - Reduce a raw URI to its lowercased path portion
//!
//! # Design Decisions
//! - Behind a trait so resolution runs without a real request context
//! - `CgiEnv` reads the CGI variables a web server sets for a script

use url::Url;

/// Read-only access to server metadata.
pub trait ServerMeta {
    /// Filesystem path of the script the server invoked.
    fn script_filename(&self) -> Option<String>;

    /// Raw request URI, possibly with a query string.
    fn request_uri(&self) -> Option<String>;
}

/// Metadata from the CGI environment (`SCRIPT_FILENAME`, `REQUEST_URI`).
#[derive(Debug, Clone, Copy, Default)]
pub struct CgiEnv;

impl ServerMeta for CgiEnv {
    fn script_filename(&self) -> Option<String> {
        std::env::var("SCRIPT_FILENAME").ok()
    }

    fn request_uri(&self) -> Option<String> {
        std::env::var("REQUEST_URI").ok()
    }
}

/// Fixed metadata, for the CLI flags and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticMeta {
    pub script_filename: Option<String>,
    pub request_uri: Option<String>,
}

impl StaticMeta {
    pub fn new(script_filename: Option<&str>, request_uri: Option<&str>) -> Self {
        Self {
            script_filename: script_filename.map(str::to_string),
            request_uri: request_uri.map(str::to_string),
        }
    }
}

impl ServerMeta for StaticMeta {
    fn script_filename(&self) -> Option<String> {
        self.script_filename.clone()
    }

    fn request_uri(&self) -> Option<String> {
        self.request_uri.clone()
    }
}

/// Path portion of a raw request URI, lowercased.
///
/// The path is taken as written, without dot-segment resolution or
/// percent-encoding. Absolute-form targets
/// (`http://host/path`) lose their scheme and authority. A run of leading
/// slashes collapses to one.
pub fn request_path(raw: &str) -> String {
    let raw = raw.trim();
    let target = match Url::parse(raw) {
        Ok(url) if url.has_authority() => after_authority(raw, url.scheme()),
        _ => raw,
    };
    let path = target.split(['?', '#']).next().unwrap_or_default();
    format!("/{}", path.trim_start_matches('/')).to_lowercase()
}

/// Raw text following `scheme://authority`.
fn after_authority<'a>(raw: &'a str, scheme: &str) -> &'a str {
    let rest = raw.get(scheme.len()..).unwrap_or_default();
    let rest = rest.trim_start_matches(':').trim_start_matches(['/', '\\']);
    match rest.find(['/', '?', '#']) {
        Some(index) => &rest[index..],
        None => "",
    }
}
