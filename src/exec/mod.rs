//! Handler execution subsystem.
//!
//! # Data Flow
//! ```text
//! Resolver (include / abort / detour)
//!     → host.rs (ScriptHost: exists? execute Invocation)
//!         - process.rs (child process, CGI-style environment)
//!         - registry.rs (in-process functions)
//!     → HandlerOutcome (exit code or abort request)
//!     → flow.rs (Termination returned to the entry point)
//! ```
//!
//! # Design Decisions
//! - Handlers only see resolver state through `RouteScope`
//! - Detoured scripts get no scope
//! - Process exit happens at the entry point, never inside the core

pub mod flow;
pub mod host;
pub mod process;
pub mod registry;

pub use flow::{Flow, Termination, ABORT_EXIT_CODE};
pub use host::{ExecError, HandlerOutcome, Invocation, RouteScope, ScriptHost};
pub use process::ProcessHost;
pub use registry::FnHost;
