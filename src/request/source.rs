//! Path-source detection.
//!
//! Decides what the server metadata says about a request whose bound
//! parameter was absent. The resolver turns the decision into state or a
//! terminal action; nothing here has side effects.

use crate::config::ResolverSettings;
use crate::request::meta::{request_path, ServerMeta};

/// Outcome of inspecting server metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// No request URI, or nothing left after the base directory.
    NoPath,
    /// The request addressed the entry point itself.
    DocumentRoot,
    /// The server ran a file directly instead of going through the router.
    Detour,
    /// Segments taken from the request path below the base directory.
    Uri(Vec<String>),
    /// The request path fits none of the rules.
    Unresolvable(String),
}

pub fn detect(meta: &dyn ServerMeta, settings: &ResolverSettings) -> Detection {
    let Some(raw) = meta.request_uri() else {
        return Detection::NoPath;
    };
    let path = request_path(&raw);

    if same_path(&path, &settings.document_root.to_lowercase()) {
        return Detection::DocumentRoot;
    }

    if let Some(script) = meta.script_filename() {
        if script.to_lowercase().contains(&path) {
            return Detection::Detour;
        }
    }

    let base = settings.base_dir.to_lowercase();
    match path.strip_prefix(base.as_str()) {
        Some(rest) => {
            let segments = split_segments(rest);
            if segments.is_empty() {
                Detection::NoPath
            } else {
                Detection::Uri(segments)
            }
        }
        None => Detection::Unresolvable(path),
    }
}

/// Tokenize a path into lowercase, trimmed segments.
///
/// Surrounding slashes are ignored, so `"/a/b/"` and `"a/b"` agree.
pub fn split_segments(path: &str) -> Vec<String> {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed
        .split('/')
        .map(|segment| segment.trim().to_lowercase())
        .collect()
}

fn same_path(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}
