//! The script-host seam.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::request::{AccessType, RequestInput};
use crate::routing::ParamsMap;

/// Errors raised while starting or waiting on a handler.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to run `{}`: {source}", script.display())]
    Spawn {
        script: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{}` was terminated by a signal", .0.display())]
    Signaled(PathBuf),
}

/// What a handler reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Ran to completion with an exit code.
    Completed(i32),
    /// Asked the resolver to abort the request.
    Abort { title: String, message: String },
    /// Asked the resolver to hand the request to another script.
    Detour(PathBuf),
}

/// Resolver state a routed handler can read.
///
/// Default and matched handlers get one; a detoured script does not.
#[derive(Debug, Clone, Copy)]
pub struct RouteScope<'a> {
    pub(crate) access_type: AccessType,
    pub(crate) bound_name: &'a str,
    pub(crate) reference: &'a str,
    pub(crate) params: &'a ParamsMap,
    pub(crate) input: &'a RequestInput,
}

impl<'a> RouteScope<'a> {
    pub fn access_type(&self) -> AccessType {
        self.access_type
    }

    /// Name of the bound request parameter.
    pub fn bound_name(&self) -> &'a str {
        self.bound_name
    }

    /// Label of the route being executed (`default`, `abort` or the pattern).
    pub fn reference(&self) -> &'a str {
        self.reference
    }

    pub fn params(&self) -> &'a ParamsMap {
        self.params
    }

    pub fn param(&self, name: &str) -> Option<&'a str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn input(&self) -> &'a RequestInput {
        self.input
    }

    /// Build the outcome that makes the resolver abort.
    pub fn abort(&self, title: impl Into<String>, message: impl Into<String>) -> HandlerOutcome {
        HandlerOutcome::Abort {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Build the outcome that makes the resolver detour to `script`.
    ///
    /// The target goes through the same checks as a server-side detour:
    /// it needs a script extension and must exist.
    pub fn detour(&self, script: impl Into<PathBuf>) -> HandlerOutcome {
        HandlerOutcome::Detour(script.into())
    }
}

/// One handler execution request.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub script: &'a Path,
    /// Working directory for the handler; detours run in the script's
    /// own directory.
    pub workdir: Option<&'a Path>,
    pub scope: Option<RouteScope<'a>>,
}

/// Checks for and runs handler scripts.
pub trait ScriptHost {
    /// Whether `script` can be executed.
    fn exists(&self, script: &Path) -> bool;

    fn execute(&self, invocation: Invocation<'_>) -> Result<HandlerOutcome, ExecError>;
}
