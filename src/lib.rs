// SPDX-License-Identifier: MIT OR Apache-2.0

//! A layered, type-safe configuration store.
//!
//! Applications declare named configuration items with static types, group
//! them into specs, register the specs in a [`Config`](service::Config),
//! and then set values in code or load them from sources. Every read is
//! typed: code never handles raw strings or maps.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: items, specs, the namespace tree, the value model,
//!   duration and size grammars, and errors
//! - **Ports**: the [`Source`](ports::Source) view over documents and the
//!   [`SourceProvider`](ports::SourceProvider) parser interface
//! - **Adapters**: in-memory sources, environment variables, command-line
//!   arguments and YAML documents
//! - **Service**: the layered [`Config`](service::Config) engine, coercion
//!   from sources, loading and the builder
//!
//! # Features
//!
//! - **Typed items**: required, optional (with a default) or lazy (computed
//!   from other items on every read)
//! - **Namespace checking**: `a.b` and `a.b.c` cannot both be items
//! - **Layers**: child layers override their parent without changing it
//! - **Coercion**: scalars, enums, durations, sizes, dates, lists, sets and
//!   maps are read from any source
//!
//! # Feature Flags
//!
//! - `yaml`: Enable YAML document support (default)
//! - `env`: Enable environment variable support (default)
//! - `cli`: Enable command-line argument support (default)
//! - `full`: Enable all features
//!
//! # Quick Start
//!
//! ```rust
//! use layercfg::prelude::*;
//!
//! # fn main() -> layercfg::domain::Result<()> {
//! let mut spec = ConfigSpec::new("network.buffer");
//! let size = spec.required::<SizeInBytes>("size", "size of buffer")?;
//! let max_size = spec.lazy("maxSize", "max size of buffer", {
//!     let size = size.clone();
//!     move |config: &dyn ConfigGetter| Ok(SizeInBytes::new(config.get(&size)?.bytes * 2))
//! })?;
//!
//! let config = Config::new();
//! config.add_spec(&spec)?;
//! config.load(&FlatMapSource::new([("network.buffer.size", "1k")]))?;
//!
//! assert_eq!(config.get(&max_size)?, SizeInBytes::new(2048));
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{
        AnyItem, ConfigError, ConfigGetter, ConfigSpec, ConfigType, Item, RegistrationError,
        ResolutionError, SizeInBytes, SourceError, Value, WriteError,
    };
    pub use crate::ports::{Source, SourceProvider};
    pub use crate::service::{Config, ConfigBuilder, LoadReport};

    pub use crate::adapters::{FlatMapSource, KvSource, ValueSource};

    // Re-export adapters based on feature flags
    #[cfg(feature = "cli")]
    pub use crate::adapters::CommandLineAdapter;
    #[cfg(feature = "env")]
    pub use crate::adapters::EnvVarAdapter;
    #[cfg(feature = "yaml")]
    pub use crate::adapters::YamlProvider;
}
