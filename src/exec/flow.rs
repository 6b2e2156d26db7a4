//! Terminal results.
//!
//! Execution, abort and detour end the request. Instead of exiting the
//! process where they happen, they return a [`Termination`] that travels up
//! to the entry point, which performs the exit.

use std::ops::ControlFlow;
use std::path::PathBuf;

use serde::Serialize;

/// Exit code used when the built-in abort render ran.
pub const ABORT_EXIT_CODE: i32 = 1;

/// `Continue` carries the step's result, `Break` ends the request.
pub type Flow<T> = ControlFlow<Termination, T>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// A routed or default handler ran.
    Completed {
        reference: String,
        script: PathBuf,
        code: i32,
    },
    /// The request was aborted, by a custom handler or the built-in render.
    Aborted {
        title: String,
        message: String,
        code: i32,
    },
    /// A directly addressed script ran.
    Detoured { script: PathBuf, code: i32 },
}

impl Termination {
    pub fn exit_code(&self) -> i32 {
        match self {
            Termination::Completed { code, .. }
            | Termination::Aborted { code, .. }
            | Termination::Detoured { code, .. } => *code,
        }
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, Termination::Aborted { .. })
    }
}
