//! Abort and detour.
//!
//! Both always end the request. Abort prefers the configured abort handler
//! and falls back to the built-in render; detour runs a directly addressed
//! script without exposing the resolver to it.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::exec::{HandlerOutcome, Invocation, Termination, ABORT_EXIT_CODE};
use crate::observability::metrics;
use crate::resolver::{Resolver, ABORT_REFERENCE};

/// Ways a request can fail to be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Misroute {
    /// Not the document root, not a detour, not under the base directory.
    #[error("could not interpret request `{0}`")]
    Unresolvable(String),

    /// A detour candidate without a recognized script extension.
    #[error("`{}` is not a routable script", .0.display())]
    NonScript(PathBuf),

    /// A detour candidate that does not exist.
    #[error("`{}` does not exist", .0.display())]
    MissingFile(PathBuf),

    /// No script path to detour to.
    #[error("the server did not report the invoked script")]
    UnknownScript,

    /// A detoured script asked for yet another detour.
    #[error("`{}` cannot detour again", .0.display())]
    ChainedDetour(PathBuf),
}

impl Misroute {
    pub fn title(&self) -> &'static str {
        match self {
            Misroute::Unresolvable(_) => "Request not understood",
            Misroute::NonScript(_) | Misroute::UnknownScript | Misroute::ChainedDetour(_) => {
                "Routing failure"
            }
            Misroute::MissingFile(_) => "File not found",
        }
    }
}

impl Resolver {
    /// Abort the request.
    ///
    /// Runs the abort handler with `title` and `message` in the params when
    /// one is registered and present; otherwise renders the built-in
    /// critical message.
    pub fn abort(&mut self, title: impl Into<String>, message: impl Into<String>) -> Termination {
        let title = title.into();
        let message = message.into();
        tracing::error!(title = %title, message = %message, "Request aborted");

        if let Some(handler) = self.table.abort_handler().map(Path::to_path_buf) {
            if self.host.exists(&handler) {
                self.params.insert("title".to_string(), title.clone());
                self.params.insert("message".to_string(), message.clone());

                match self.execute_routed(&handler, ABORT_REFERENCE) {
                    Ok(HandlerOutcome::Completed(code)) => {
                        metrics::record_abort("handler");
                        return Termination::Aborted { title, message, code };
                    }
                    Ok(HandlerOutcome::Abort { .. } | HandlerOutcome::Detour(_)) => {
                        tracing::warn!(
                            handler = %handler.display(),
                            "Abort handler did not complete, using built-in render"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Abort handler failed, using built-in render");
                    }
                }
            } else {
                tracing::warn!(handler = %handler.display(), "Abort handler missing, using built-in render");
            }
        }

        self.renderer.render_critical(&title, &message);
        metrics::record_abort("builtin");
        Termination::Aborted {
            title,
            message,
            code: ABORT_EXIT_CODE,
        }
    }

    pub(crate) fn abort_misroute(&mut self, misroute: Misroute) -> Termination {
        let title = misroute.title();
        self.abort(title, misroute.to_string())
    }

    /// Run a script the web server addressed directly.
    ///
    /// `script` defaults to the invoking script reported by the server.
    /// The script runs in its own directory with no route scope, and the
    /// request always ends.
    pub fn detour(&mut self, script: Option<&Path>) -> Termination {
        let script = match script {
            Some(path) => path.to_path_buf(),
            None => match self.meta.script_filename() {
                Some(path) => PathBuf::from(path),
                None => return self.abort_misroute(Misroute::UnknownScript),
            },
        };

        if !has_script_extension(&script, &self.settings.script_extensions) {
            return self.abort_misroute(Misroute::NonScript(script));
        }
        if !self.host.exists(&script) {
            return self.abort_misroute(Misroute::MissingFile(script));
        }

        if let Some(callback) = self.before_detour.as_mut() {
            callback();
        }

        if self.settings.debug {
            tracing::info!(script = %script.display(), "Detouring request to script");
        }

        let workdir = script.parent().map(Path::to_path_buf);
        let invocation = Invocation {
            script: &script,
            workdir: workdir.as_deref(),
            scope: None,
        };

        match self.host.execute(invocation) {
            Ok(HandlerOutcome::Completed(code)) => {
                metrics::record_execution("detour");
                Termination::Detoured { script, code }
            }
            Ok(HandlerOutcome::Abort { title, message }) => self.abort(title, message),
            Ok(HandlerOutcome::Detour(_)) => self.abort_misroute(Misroute::ChainedDetour(script)),
            Err(e) => self.abort("Handler failure", e.to_string()),
        }
    }
}

fn has_script_extension(script: &Path, extensions: &[String]) -> bool {
    script
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
