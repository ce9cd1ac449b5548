// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing source implementations.
//!
//! In-memory sources are always available. Adapters that read the process
//! environment, the command line or YAML documents are behind the `env`,
//! `cli` and `yaml` features.

pub mod fallback;
pub mod flat_map;
pub mod kv;
pub mod value_source;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "env")]
pub mod env_var;
#[cfg(feature = "yaml")]
pub mod yaml_file;

pub use fallback::FallbackSource;
pub use flat_map::FlatMapSource;
pub use kv::KvSource;
pub use value_source::ValueSource;

// Re-export adapters based on feature flags
#[cfg(feature = "cli")]
pub use cli::CommandLineAdapter;
#[cfg(feature = "env")]
pub use env_var::EnvVarAdapter;
#[cfg(feature = "yaml")]
pub use yaml_file::YamlProvider;
