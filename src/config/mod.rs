//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated)
//!     → RouteTable::load (resolve handler paths, append or replace)
//! ```
//!
//! # Design Decisions
//! - The `[uri]` group keeps document order; it is match priority
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A handler that cannot be located is a load-time error, never a
//!   resolution-time one

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_routes, ConfigError};
pub use schema::{GeneralConfig, ResolverSettings, RouterConfig, UriTable};
pub use validation::ValidationError;
