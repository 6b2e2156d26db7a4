//! Request context subsystem.
//!
//! # Data Flow
//! ```text
//! bind(name, origin)
//!     → input.rs (origin-restricted lookup of the bound parameter)
//!     → if absent: meta.rs (script path, request URI)
//!     → source.rs (document root / detour / base dir / unresolvable)
//!     → request segments + access type
//! ```
//!
//! # Design Decisions
//! - Input and metadata are injected, never read from ambient state by the
//!   resolver itself
//! - Detection is a pure decision; the resolver performs detours and aborts

pub mod input;
pub mod meta;
pub mod source;

pub use input::{AccessType, InputValue, Origin, RequestInput};
pub use meta::{CgiEnv, ServerMeta, StaticMeta};
pub use source::{detect, split_segments, Detection};
