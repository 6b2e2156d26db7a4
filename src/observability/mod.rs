//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Resolver produces:
//!     → logging.rs (structured log events, one span per resolution pass)
//!     → metrics.rs (bind / execution / abort counters)
//!
//! Consumers:
//!     → stderr (fmt layer)
//!     → any `metrics` recorder the embedding process installs
//! ```
//!
//! # Design Decisions
//! - Every pass carries a UUID `pass_id` on its span
//! - Handler diagnostics are gated by the `debug` setting, not the log level

pub mod logging;
pub mod metrics;
