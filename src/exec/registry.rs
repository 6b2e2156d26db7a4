//! In-process script host.
//!
//! Handlers are plain functions registered under the path they stand for.
//! Useful for embedding the resolver and for tests that need to observe
//! which handler ran and with what scope.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::exec::host::{ExecError, HandlerOutcome, Invocation, ScriptHost};

type HandlerFn = Box<dyn Fn(&Invocation<'_>) -> HandlerOutcome>;

#[derive(Default)]
pub struct FnHost {
    handlers: HashMap<PathBuf, HandlerFn>,
}

impl FnHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, script: impl Into<PathBuf>, handler: F) -> &mut Self
    where
        F: Fn(&Invocation<'_>) -> HandlerOutcome + 'static,
    {
        self.handlers.insert(script.into(), Box::new(handler));
        self
    }

    pub fn with<F>(mut self, script: impl Into<PathBuf>, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> HandlerOutcome + 'static,
    {
        self.register(script, handler);
        self
    }
}

impl fmt::Debug for FnHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHost")
            .field("scripts", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ScriptHost for FnHost {
    fn exists(&self, script: &Path) -> bool {
        self.handlers.contains_key(script)
    }

    fn execute(&self, invocation: Invocation<'_>) -> Result<HandlerOutcome, ExecError> {
        match self.handlers.get(invocation.script) {
            Some(handler) => Ok(handler(&invocation)),
            None => Err(ExecError::Spawn {
                script: invocation.script.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_handler_runs() {
        let host = FnHost::new().with("/srv/ok.cgi", |_| HandlerOutcome::Completed(0));

        assert!(host.exists(Path::new("/srv/ok.cgi")));
        assert!(!host.exists(Path::new("/srv/other.cgi")));

        let outcome = host
            .execute(Invocation { script: Path::new("/srv/ok.cgi"), workdir: None, scope: None })
            .unwrap();
        assert_eq!(outcome, HandlerOutcome::Completed(0));
    }

    #[test]
    fn test_unregistered_handler_is_an_error() {
        let host = FnHost::new();
        let result = host.execute(Invocation { script: Path::new("/srv/x.cgi"), workdir: None, scope: None });
        assert!(matches!(result, Err(ExecError::Spawn { .. })));
    }
}
