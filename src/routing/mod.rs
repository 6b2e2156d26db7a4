//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request segments (from the path source)
//!     → table.rs (ordered [uri] entries)
//!     → pattern.rs (literal prefix + positional captures)
//!     → Return: PatternMatch or no match
//!
//! Table construction (before resolution):
//!     RouterConfig
//!     → resolve handler paths against base directory
//!     → parse reference patterns
//!     → append to / replace the table
//! ```
//!
//! # Design Decisions
//! - Deterministic: same segments always match the same entry
//! - First match wins (insertion order, no specificity ranking)
//! - Matching only reads the segments

pub mod pattern;
pub mod table;

pub use pattern::{ParamsMap, PatternMatch, ReferencePattern, CAPTURE_SIGIL};
pub use table::{RouteEntry, RouteTable};
