// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the configuration crate.
//!
//! Errors are grouped by the operation that detects them: registering specs,
//! resolving values, writing values, and reading sources. `ConfigError` wraps
//! all of them for callers that do not care which group a failure came from.

use thiserror::Error;

/// Errors raised while declaring items or registering a spec into a config.
///
/// Registration is all-or-nothing: when `add_spec` fails, no item of the spec
/// has been registered.
///
/// # Examples
///
/// ```
/// use layercfg::domain::errors::RegistrationError;
///
/// let error = RegistrationError::RepeatedItem {
///     name: "network.buffer.size".to_string(),
/// };
/// assert_eq!(error.to_string(), "item network.buffer.size has been added");
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistrationError {
    /// The exact item (by identity) is already registered in the layer chain.
    #[error("item {name} has been added")]
    RepeatedItem {
        /// Qualified name of the repeated item
        name: String,
    },

    /// The item's name or path collides with an item already registered.
    #[error("{name} cannot be added: {reason}")]
    NameConflict {
        /// Qualified name of the item being added
        name: String,
        /// What it collides with
        reason: String,
    },

    /// The layer already has child layers, so its namespace is frozen.
    #[error("config layer '{layer}' has child layers, cannot add new spec")]
    SpecFrozen {
        /// Name of the frozen layer
        layer: String,
    },

    /// The item name contains an empty path segment.
    #[error("{name} is invalid name for item")]
    InvalidName {
        /// The rejected name
        name: String,
    },
}

/// Errors raised while reading a value out of a config.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResolutionError {
    /// The item is not registered anywhere in the layer chain.
    #[error("cannot find {name} in config")]
    NoSuchElement {
        /// Name of the missing item
        name: String,
    },

    /// The item is registered but holds no value.
    #[error("{name} is unset")]
    Unset {
        /// Name of the unset item
        name: String,
    },

    /// A lazy thunk produced a value whose type differs from the item's type.
    #[error("fail to cast lazy value to {expected} when getting {name} in config")]
    InvalidLazyCast {
        /// Name of the lazy item
        name: String,
        /// The item's declared type
        expected: &'static str,
    },

    /// A read requested a type different from the item's declared type.
    #[error("{name} has type {actual}, cannot be read as {requested}")]
    TypeMismatch {
        /// Name of the item
        name: String,
        /// The item's declared type
        actual: &'static str,
        /// The type requested by the caller
        requested: &'static str,
    },
}

/// Errors raised while writing a value into a config.
///
/// Writes are atomic: when one of these is returned nothing has changed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteError {
    /// The item is not registered anywhere in the layer chain.
    #[error("cannot find {name} in config")]
    NoSuchElement {
        /// Name of the missing item
        name: String,
    },

    /// The value's type is not the item's declared type.
    #[error("fail to cast value of type {actual} to {expected} when setting {name} in config")]
    TypeMismatch {
        /// Name of the item
        name: String,
        /// The item's declared type
        expected: &'static str,
        /// The type of the rejected value
        actual: &'static str,
    },
}

/// Errors raised by sources and by coercion of source values.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    /// The source holds a value of a different kind than requested.
    #[error("{description} has type {actual} rather than {expected}")]
    WrongType {
        /// Description of the source
        description: String,
        /// Kind of value the source actually holds
        actual: String,
        /// Kind of value that was requested
        expected: String,
    },

    /// The source has nothing at the requested path.
    #[error("cannot find path \"{path}\" in {description}")]
    NoSuchPath {
        /// Description of the source
        description: String,
        /// The dotted path that was requested
        path: String,
    },

    /// A textual value could not be parsed into the requested type.
    #[error("{message}")]
    ParseError {
        /// The error message
        message: String,
        /// The underlying parsing error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The target type cannot be produced from a source.
    #[error("value of type {type_name} is unsupported in {description}")]
    UnsupportedType {
        /// Description of the source
        description: String,
        /// Name of the unsupported type
        type_name: &'static str,
    },

    /// A map type with non-string keys was requested.
    #[error("cannot support map with {type_name} key, only support string key")]
    UnsupportedMapKey {
        /// Name of the key type
        type_name: &'static str,
    },

    /// Loading one item from a source failed.
    #[error("fail to load {path}: {source}")]
    LoadError {
        /// Dotted path of the item that failed
        path: String,
        /// The underlying failure
        #[source]
        source: Box<SourceError>,
    },

    /// A loaded value could not be written into the config.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// An I/O error occurred while reading a document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    /// Creates a `ParseError` without an underlying cause.
    pub fn parse(message: impl Into<String>) -> Self {
        SourceError::ParseError {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a `ParseError` wrapping an underlying cause.
    pub fn parse_with<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SourceError::ParseError {
            message: message.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// Wraps this error as the failure to load the item at `path`.
    pub fn into_load_error(self, path: impl Into<String>) -> Self {
        SourceError::LoadError {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

/// Any error produced by the configuration crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A registration failure.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// A read failure.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// A write failure.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// A source or coercion failure.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// A specialized Result type for configuration operations.
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
