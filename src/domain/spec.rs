// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration specifications.
//!
//! A `ConfigSpec` groups items that share a dotted name prefix. Items are
//! declared on the spec and the spec is then registered into a config as a
//! unit.

use crate::domain::errors::{RegistrationError, ResolutionError};
use crate::domain::item::{AnyItem, Item, ItemBehavior};
use crate::domain::service::ConfigGetter;
use crate::domain::types::ConfigType;

/// An ordered collection of items sharing a name prefix.
///
/// Clones share the declared items, so registering a clone counts as
/// registering the same items again.
///
/// # Examples
///
/// ```
/// use layercfg::domain::spec::ConfigSpec;
///
/// let mut spec = ConfigSpec::new("network.buffer");
/// let size = spec.required::<i32>("size", "size of buffer in KB").unwrap();
/// let name = spec.optional("name", "buffer".to_string(), "name of buffer").unwrap();
///
/// assert_eq!(size.name(), "network.buffer.size");
/// assert_eq!(name.name(), "network.buffer.name");
/// assert_eq!(spec.items().len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConfigSpec {
    prefix: String,
    items: Vec<AnyItem>,
}

impl ConfigSpec {
    /// Creates an empty spec whose items are qualified with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        ConfigSpec {
            prefix: prefix.into(),
            items: Vec::new(),
        }
    }

    /// Returns the name prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the declared items in declaration order.
    pub fn items(&self) -> &[AnyItem] {
        &self.items
    }

    /// Qualifies `name` with the spec's prefix.
    pub fn qualify(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.prefix, name)
        }
    }

    /// Declares an item with the given behavior.
    pub fn add<T: ConfigType>(
        &mut self,
        name: &str,
        description: impl Into<String>,
        behavior: ItemBehavior<T>,
    ) -> Result<Item<T>, RegistrationError> {
        let item = Item::new(self.qualify(name), description, behavior)?;
        self.items.push(item.as_any().clone());
        Ok(item)
    }

    /// Declares a required item.
    pub fn required<T: ConfigType>(
        &mut self,
        name: &str,
        description: impl Into<String>,
    ) -> Result<Item<T>, RegistrationError> {
        self.add(name, description, ItemBehavior::Required)
    }

    /// Declares an optional item with a default value.
    pub fn optional<T: ConfigType>(
        &mut self,
        name: &str,
        default: T,
        description: impl Into<String>,
    ) -> Result<Item<T>, RegistrationError> {
        self.add(name, description, ItemBehavior::Optional { default })
    }

    /// Declares a lazy item computed by `thunk` on every read.
    pub fn lazy<T, F>(
        &mut self,
        name: &str,
        description: impl Into<String>,
        thunk: F,
    ) -> Result<Item<T>, RegistrationError>
    where
        T: ConfigType,
        F: Fn(&dyn ConfigGetter) -> Result<T, ResolutionError> + Send + Sync + 'static,
    {
        self.add(name, description, ItemBehavior::lazy(thunk))
    }
}
