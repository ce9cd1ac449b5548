// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing the core types of the configuration store.
//!
//! Items, specs, the namespace tree, type descriptors and the value grammars
//! live here. Nothing in this layer knows about concrete sources.

pub mod config_path;
pub mod config_tree;
pub mod duration;
pub mod errors;
pub mod item;
pub mod service;
pub mod size_in_bytes;
pub mod spec;
pub mod types;
pub mod value;

// Re-export commonly used types
pub use config_path::ConfigPath;
pub use config_tree::ConfigTree;
pub use errors::{
    ConfigError, RegistrationError, ResolutionError, Result, SourceError, WriteError,
};
pub use item::{AnyItem, Item, ItemBehavior, ItemKind};
pub use service::ConfigGetter;
pub use size_in_bytes::SizeInBytes;
pub use spec::ConfigSpec;
pub use types::{AnyValue, BoxedValue, ConfigType, TypeDescriptor};
pub use value::Value;
