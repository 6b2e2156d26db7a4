//! Child-process script host.
//!
//! Runs each handler as its own process, CGI style. Routed handlers see the
//! resolver state through environment variables:
//!
//! - `ROUTER_ACCESS_TYPE`, `ROUTER_BOUND_NAME`, `ROUTER_REFERENCE`
//! - `ROUTER_PARAM_<NAME>` per parameter (name uppercased, non-alphanumerics
//!   replaced by `_`)
//! - `ROUTER_PARAMS` with all parameters as a JSON object
//!
//! A detoured script gets none of these.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use crate::exec::host::{ExecError, HandlerOutcome, Invocation, ScriptHost};

#[derive(Debug, Clone, Default)]
pub struct ProcessHost {
    /// Extension → interpreter program.
    interpreters: BTreeMap<String, String>,
}

impl ProcessHost {
    pub fn new(interpreters: BTreeMap<String, String>) -> Self {
        Self { interpreters }
    }

    fn command(&self, script: &Path) -> Command {
        let interpreter = script
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.interpreters.get(&ext.to_ascii_lowercase()));

        match interpreter {
            Some(program) => {
                let mut command = Command::new(program);
                command.arg(script);
                command
            }
            None => Command::new(script),
        }
    }
}

impl ScriptHost for ProcessHost {
    fn exists(&self, script: &Path) -> bool {
        script.is_file()
    }

    fn execute(&self, invocation: Invocation<'_>) -> Result<HandlerOutcome, ExecError> {
        let mut command = self.command(invocation.script);

        if let Some(dir) = invocation.workdir {
            command.current_dir(dir);
        }

        if let Some(scope) = invocation.scope {
            command
                .env("ROUTER_ACCESS_TYPE", scope.access_type().as_str())
                .env("ROUTER_BOUND_NAME", scope.bound_name())
                .env("ROUTER_REFERENCE", scope.reference());
            for (name, value) in scope.params() {
                command.env(param_var(name), value);
            }
            if let Ok(json) = serde_json::to_string(scope.params()) {
                command.env("ROUTER_PARAMS", json);
            }
        }

        tracing::debug!(script = %invocation.script.display(), "Spawning handler");

        let status = command.status().map_err(|source| ExecError::Spawn {
            script: invocation.script.to_path_buf(),
            source,
        })?;

        status
            .code()
            .map(HandlerOutcome::Completed)
            .ok_or_else(|| ExecError::Signaled(invocation.script.to_path_buf()))
    }
}

fn param_var(name: &str) -> String {
    let suffix: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("ROUTER_PARAM_{suffix}")
}
