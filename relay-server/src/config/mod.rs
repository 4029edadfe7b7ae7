//! Configuration management for the relay server
//!
//! Settings come from an optional TOML file; command-line flags override
//! the listen address afterwards.

mod defaults;
mod loader;
mod schema;

pub use defaults::DEFAULT_CONFIG_TOML;
pub use loader::ConfigLoader;
pub use schema::*;
