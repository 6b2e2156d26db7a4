//! Script Router Library
//!
//! Resolves a request path to a handler script plus named parameters and
//! runs that handler, once.
//!
//! ```text
//!   bound parameter ──┐
//!   request URI ──────┼─▶ request ──▶ resolver::bind ──▶ resolver::run ──▶ exec
//!   invoked script ───┘   (source)        │                 │  (routing)     │
//!                                         ▼                 ▼                ▼
//!                                  detour / abort      no match       Termination
//! ```
//!
//! ```
//! use std::ops::ControlFlow;
//! use script_router::config::ResolverSettings;
//! use script_router::exec::{FnHost, HandlerOutcome, Termination};
//! use script_router::request::{Origin, RequestInput};
//! use script_router::routing::RouteTable;
//! use script_router::Resolver;
//!
//! let table = RouteTable::new().with_route("projects/edit/?app", "edit.cgi");
//! let host = FnHost::new().with("edit.cgi", |inv| {
//!     let scope = inv.scope.expect("routed handlers get a scope");
//!     assert_eq!(scope.param("app"), Some("holamundo"));
//!     HandlerOutcome::Completed(0)
//! });
//! let settings = ResolverSettings { auto_detect: false, ..ResolverSettings::default() };
//!
//! let mut resolver = Resolver::new(table, settings, Box::new(host))
//!     .with_input(RequestInput::new().with_post("route", "projects/edit/holamundo"));
//!
//! let flow = resolver.resolve("route", Origin::Post, false);
//! assert!(matches!(flow, ControlFlow::Break(Termination::Completed { code: 0, .. })));
//! assert_eq!(resolver.param("route"), Some("projects/edit"));
//! ```

pub mod config;
pub mod exec;
pub mod observability;
pub mod render;
pub mod request;
pub mod resolver;
pub mod routing;

pub use config::RouterConfig;
pub use exec::Termination;
pub use resolver::Resolver;
