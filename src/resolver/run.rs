//! Route evaluation and handler execution.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use crate::exec::{ExecError, Flow, HandlerOutcome, Invocation, RouteScope, Termination};
use crate::observability::metrics;
use crate::resolver::{Resolver, DEFAULT_REFERENCE};

impl Resolver {
    /// Evaluate the route table against the bound segments.
    ///
    /// The default handler runs when nothing was received. Otherwise `[uri]`
    /// entries are tried in insertion order and the first one whose handler
    /// actually runs wins. A matching entry whose handler is missing falls
    /// through to the next entry.
    pub fn run(&mut self, keep_going: bool) -> Flow<bool> {
        if !self.received {
            if let Some(default) = self.table.default_handler().map(Path::to_path_buf) {
                match self.include(&default, DEFAULT_REFERENCE, keep_going) {
                    ControlFlow::Continue(false) => {}
                    executed => return executed,
                }
            }
        }

        // Restored after every attempt whose handler is missing.
        let bound = self.params.clone();

        for index in 0..self.table.len() {
            let entry = &self.table.routes()[index];
            let Some(matched) = entry.pattern.match_segments(&self.segments) else {
                continue;
            };
            let reference = entry.reference.clone();
            let handler = entry.handler.clone();

            self.params = matched.captures;
            self.params.insert(self.bound_name.clone(), matched.reference);

            match self.include(&handler, &reference, keep_going) {
                ControlFlow::Continue(false) => {
                    self.params.clone_from(&bound);
                    tracing::debug!(
                        reference = %reference,
                        handler = %handler.display(),
                        "Route matched but handler is missing, trying next route"
                    );
                }
                executed => return executed,
            }
        }

        ControlFlow::Continue(false)
    }

    /// Execute `script` once.
    ///
    /// Returns `Continue(false)` when the script does not exist. After a
    /// run the request ends unless `keep_going` is set, in which case
    /// `Continue(true)` is returned.
    pub fn include(&mut self, script: &Path, reference: &str, keep_going: bool) -> Flow<bool> {
        if !self.host.exists(script) {
            return ControlFlow::Continue(false);
        }

        match self.execute_routed(script, reference) {
            Ok(HandlerOutcome::Completed(code)) => {
                let kind = if reference == DEFAULT_REFERENCE { "default" } else { "route" };
                metrics::record_execution(kind);
                if keep_going {
                    ControlFlow::Continue(true)
                } else {
                    ControlFlow::Break(Termination::Completed {
                        reference: reference.to_string(),
                        script: PathBuf::from(script),
                        code,
                    })
                }
            }
            Ok(HandlerOutcome::Abort { title, message }) => {
                ControlFlow::Break(self.abort(title, message))
            }
            Ok(HandlerOutcome::Detour(target)) => {
                tracing::debug!(reference, target = %target.display(), "Handler requested a detour");
                ControlFlow::Break(self.detour(Some(&target)))
            }
            Err(e) => {
                tracing::error!(error = %e, reference, "Handler failed to run");
                ControlFlow::Break(self.abort("Handler failure", e.to_string()))
            }
        }
    }

    /// Run a handler with the route scope attached.
    pub(crate) fn execute_routed(
        &mut self,
        script: &Path,
        reference: &str,
    ) -> Result<HandlerOutcome, ExecError> {
        if self.settings.debug {
            tracing::info!(reference, script = %script.display(), "Executing handler");
        }
        if self.settings.export {
            self.input.export(&self.params);
        }

        let scope = RouteScope {
            access_type: self.access_type,
            bound_name: &self.bound_name,
            reference,
            params: &self.params,
            input: &self.input,
        };
        self.host.execute(Invocation {
            script,
            workdir: None,
            scope: Some(scope),
        })
    }
}
