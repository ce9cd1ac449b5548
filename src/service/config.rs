// SPDX-License-Identifier: MIT OR Apache-2.0

//! The layered configuration store.
//!
//! A [`Config`] is a chain of layers. Each layer owns its value store, its
//! registered specs and a copy of the namespace tree, guarded by one
//! reader/writer lock. Reads walk from the layer they start on towards the
//! root and take at most one layer's lock at a time.

use crate::domain::config_tree::ConfigTree;
use crate::domain::errors::{RegistrationError, ResolutionError, WriteError};
use crate::domain::item::{erase_thunk, AnyItem, Item, RawBehavior, RawThunk};
use crate::domain::service::{self as getter, ConfigGetter};
use crate::domain::spec::ConfigSpec;
use crate::domain::types::{AnyValue, BoxedValue, ConfigType};
use crate::service::builder::ConfigBuilder;
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The value held by one layer for one item.
#[derive(Clone)]
enum ValueState {
    Unset,
    Value(AnyValue),
    Lazy(RawThunk),
}

impl ValueState {
    fn initial(item: &AnyItem) -> Self {
        match item.behavior() {
            RawBehavior::Required => ValueState::Unset,
            RawBehavior::Optional(value) => ValueState::Value(Arc::clone(value)),
            RawBehavior::Lazy(thunk) => ValueState::Lazy(Arc::clone(thunk)),
        }
    }
}

#[derive(Default)]
struct LayerState {
    specs: Vec<ConfigSpec>,
    /// Items registered in this layer, in insertion order
    items: Vec<AnyItem>,
    names: HashMap<String, AnyItem>,
    values: HashMap<AnyItem, ValueState>,
    tree: ConfigTree,
    has_children: bool,
}

struct Layer {
    name: String,
    parent: Option<Config>,
    state: RwLock<LayerState>,
}

/// A layered, typed configuration store.
///
/// `Config` is a cheap handle: clones share the same layer. A child layer
/// created with [`Config::with_layer`] reads through to its parent for
/// anything it does not override, and writes never reach the parent.
///
/// Lazy items are evaluated on every read, against the layer the read
/// started from. Thunks may read from the config they are given; a thunk
/// must not write to it.
///
/// # Examples
///
/// ```rust
/// use layercfg::domain::spec::ConfigSpec;
/// use layercfg::service::Config;
///
/// let mut spec = ConfigSpec::new("network.buffer");
/// let size = spec.optional::<u32>("size", 1024, "size of buffer in KB").unwrap();
///
/// let config = Config::new();
/// config.add_spec(&spec).unwrap();
/// assert_eq!(config.get(&size).unwrap(), 1024);
///
/// let child = config.with_layer("override");
/// child.set(&size, 2048).unwrap();
/// assert_eq!(child.get(&size).unwrap(), 2048);
/// assert_eq!(config.get(&size).unwrap(), 1024);
/// ```
#[derive(Clone)]
pub struct Config {
    layer: Arc<Layer>,
}

impl Config {
    /// Creates an empty root config named `config`.
    pub fn new() -> Self {
        Config::named("config")
    }

    /// Creates an empty root config with the given layer name.
    pub fn named(name: impl Into<String>) -> Self {
        Config {
            layer: Arc::new(Layer {
                name: name.into(),
                parent: None,
                state: RwLock::new(LayerState::default()),
            }),
        }
    }

    /// Returns a builder for a config fed from sources.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Returns the name of this layer.
    pub fn name(&self) -> &str {
        &self.layer.name
    }

    /// Returns the parent layer, if any.
    pub fn parent(&self) -> Option<&Config> {
        self.layer.parent.as_ref()
    }

    /// Iterates over this layer and its ancestors, nearest first.
    fn chain(&self) -> impl Iterator<Item = &Config> {
        std::iter::successors(Some(self), |&config| config.layer.parent.as_ref())
    }

    fn read(&self) -> RwLockReadGuard<'_, LayerState> {
        self.layer.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LayerState> {
        self.layer.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers every item of `spec` in this layer.
    ///
    /// Either all items are registered or none are.
    ///
    /// # Errors
    ///
    /// - `RepeatedItem` if an item is already registered in this layer or
    ///   an ancestor, or appears twice in `spec`
    /// - `SpecFrozen` if a child layer has been created from this layer
    /// - `NameConflict` if an item's path equals, contains or is contained
    ///   in the path of another registered item
    pub fn add_spec(&self, spec: &ConfigSpec) -> Result<(), RegistrationError> {
        // Ancestors are frozen, so their registrations cannot change.
        for ancestor in self.chain().skip(1) {
            let state = ancestor.read();
            if let Some(item) = spec.items().iter().find(|item| state.values.contains_key(*item)) {
                return Err(RegistrationError::RepeatedItem {
                    name: item.name().to_string(),
                });
            }
        }

        let mut state = self.write();
        if state.has_children {
            return Err(RegistrationError::SpecFrozen {
                layer: self.name().to_string(),
            });
        }

        let mut tree = state.tree.clone();
        for (index, item) in spec.items().iter().enumerate() {
            if state.values.contains_key(item) || spec.items()[..index].contains(item) {
                return Err(RegistrationError::RepeatedItem {
                    name: item.name().to_string(),
                });
            }
            tree.insert(item)?;
        }

        state.tree = tree;
        for item in spec.items() {
            state.items.push(item.clone());
            state.names.insert(item.name().to_string(), item.clone());
            state.values.insert(item.clone(), ValueState::initial(item));
        }
        state.specs.push(spec.clone());

        tracing::debug!(
            "Added spec '{}' with {} items to layer '{}'",
            spec.prefix(),
            spec.items().len(),
            self.name()
        );
        Ok(())
    }

    /// Creates a child layer.
    ///
    /// The child starts with a copy of this layer's namespace and no values
    /// of its own. Once a child exists, no more specs can be added here.
    pub fn with_layer(&self, name: impl Into<String>) -> Config {
        let name = name.into();
        let tree = {
            let mut state = self.write();
            state.has_children = true;
            state.tree.clone()
        };
        tracing::debug!("Created layer '{}' on top of '{}'", name, self.name());
        Config {
            layer: Arc::new(Layer {
                name,
                parent: Some(self.clone()),
                state: RwLock::new(LayerState {
                    tree,
                    ..LayerState::default()
                }),
            }),
        }
    }

    /// Returns the value of `item`.
    ///
    /// # Errors
    ///
    /// `NoSuchElement` if the item is not registered, `Unset` if it has no
    /// value, or the error of a failing lazy thunk.
    pub fn get<T: ConfigType>(&self, item: &Item<T>) -> Result<T, ResolutionError> {
        getter::get(self, item)
    }

    /// Returns the value of `item`, or `None` if it is not registered.
    ///
    /// A registered item without a value is still an `Unset` error.
    pub fn get_or_none<T: ConfigType>(&self, item: &Item<T>) -> Result<Option<T>, ResolutionError> {
        getter::get_or_none(self, item)
    }

    /// Returns the value of the item called `name`.
    pub fn get_by_name<T: ConfigType>(&self, name: &str) -> Result<T, ResolutionError> {
        getter::get_by_name(self, name)
    }

    /// Returns the value of the item called `name`, or `None` if no such
    /// item is registered.
    pub fn get_by_name_or_none<T: ConfigType>(&self, name: &str) -> Result<Option<T>, ResolutionError> {
        getter::get_by_name_or_none(self, name)
    }

    /// Sets the value of `item`.
    pub fn set<T: ConfigType>(&self, item: &Item<T>, value: T) -> Result<(), WriteError> {
        self.store(item.as_any(), ValueState::Value(Arc::new(value)))
    }

    /// Sets the value of the item called `name`.
    ///
    /// Fails with `TypeMismatch` if `T` is not the item's type.
    pub fn set_by_name<T: ConfigType>(&self, name: &str, value: T) -> Result<(), WriteError> {
        let item = self.find_for_write(name)?;
        check_type::<T>(&item)?;
        self.store(&item, ValueState::Value(Arc::new(value)))
    }

    /// Sets the value of `item` from a type-erased value.
    ///
    /// Fails with `TypeMismatch` if `value` does not have the item's type.
    pub fn raw_set(&self, item: &AnyItem, value: BoxedValue) -> Result<(), WriteError> {
        if !item.accepts(&*value) {
            return Err(WriteError::TypeMismatch {
                name: item.name().to_string(),
                expected: item.type_name(),
                actual: "<unknown>",
            });
        }
        self.store(item, ValueState::Value(Arc::from(value)))
    }

    /// Makes `item` lazy, replacing any value or previous thunk.
    pub fn lazy_set<T, F>(&self, item: &Item<T>, thunk: F) -> Result<(), WriteError>
    where
        T: ConfigType,
        F: Fn(&dyn ConfigGetter) -> Result<T, ResolutionError> + Send + Sync + 'static,
    {
        self.store(item.as_any(), ValueState::Lazy(erase_thunk(Arc::new(thunk))))
    }

    /// Makes the item called `name` lazy.
    ///
    /// Fails with `TypeMismatch` if `T` is not the item's type.
    pub fn lazy_set_by_name<T, F>(&self, name: &str, thunk: F) -> Result<(), WriteError>
    where
        T: ConfigType,
        F: Fn(&dyn ConfigGetter) -> Result<T, ResolutionError> + Send + Sync + 'static,
    {
        let item = self.find_for_write(name)?;
        check_type::<T>(&item)?;
        self.store(&item, ValueState::Lazy(erase_thunk(Arc::new(thunk))))
    }

    /// Makes `item` lazy with a type-erased thunk.
    ///
    /// The thunk's result cannot be checked here; a result of the wrong type
    /// makes reads fail with `InvalidLazyCast`.
    pub fn raw_lazy_set(&self, item: &AnyItem, thunk: RawThunk) -> Result<(), WriteError> {
        self.store(item, ValueState::Lazy(thunk))
    }

    /// Removes the value of `item`; reads fail with `Unset` until it is set
    /// again.
    pub fn unset(&self, item: &AnyItem) -> Result<(), WriteError> {
        self.store(item, ValueState::Unset)
    }

    /// Removes the value of the item called `name`.
    pub fn unset_by_name(&self, name: &str) -> Result<(), WriteError> {
        let item = self.find_for_write(name)?;
        self.store(&item, ValueState::Unset)
    }

    fn find_for_write(&self, name: &str) -> Result<AnyItem, WriteError> {
        self.find_item(name).ok_or_else(|| WriteError::NoSuchElement {
            name: name.to_string(),
        })
    }

    /// Writes into the nearest layer whose namespace holds `item`.
    fn store(&self, item: &AnyItem, state: ValueState) -> Result<(), WriteError> {
        let target = self
            .chain()
            .find(|layer| layer.read().tree.contains(item))
            .ok_or_else(|| WriteError::NoSuchElement {
                name: item.name().to_string(),
            })?;
        tracing::trace!(
            "Writing {} state of {} in layer '{}'",
            state.kind(),
            item.name(),
            target.name()
        );
        target.write().values.insert(item.clone(), state);
        Ok(())
    }

    /// Returns `true` if `item` is registered in this layer or an ancestor.
    pub fn contains(&self, item: &AnyItem) -> bool {
        self.chain().any(|layer| layer.read().values.contains_key(item))
    }

    /// Returns `true` if an item called `name` is registered in this layer
    /// or an ancestor.
    pub fn contains_name(&self, name: &str) -> bool {
        self.find_item(name).is_some()
    }

    /// Iterates over all registered items: this layer's in insertion order,
    /// then each ancestor's.
    ///
    /// Each layer is read when the iterator reaches it.
    pub fn iter(&self) -> Items {
        Items {
            next_layer: Some(self.clone()),
            current: Vec::new().into_iter(),
        }
    }

    /// Returns all registered items in [`Config::iter`] order.
    pub fn items(&self) -> Vec<AnyItem> {
        self.iter().collect()
    }

    /// Returns the specs registered in this layer, then in each ancestor.
    pub fn specs(&self) -> Vec<ConfigSpec> {
        self.chain()
            .flat_map(|layer| layer.read().specs.clone())
            .collect()
    }

    /// Returns a copy of this layer's namespace tree.
    pub fn tree(&self) -> ConfigTree {
        self.read().tree.clone()
    }

    /// Walks this layer's namespace tree. See [`ConfigTree::visit`].
    pub fn visit_as_tree<N, L, F>(&self, on_enter_node: N, on_leave_node: L, on_enter_leaf: F)
    where
        N: FnMut(&[String]),
        L: FnMut(&[String]),
        F: FnMut(&[String], &AnyItem),
    {
        self.tree().visit(on_enter_node, on_leave_node, on_enter_leaf);
    }
}

impl ValueState {
    fn kind(&self) -> &'static str {
        match self {
            ValueState::Unset => "unset",
            ValueState::Value(_) => "value",
            ValueState::Lazy(_) => "lazy",
        }
    }
}

fn check_type<T: ConfigType>(item: &AnyItem) -> Result<(), WriteError> {
    if item.value_type_id() == TypeId::of::<T>() {
        Ok(())
    } else {
        Err(WriteError::TypeMismatch {
            name: item.name().to_string(),
            expected: item.type_name(),
            actual: type_name::<T>(),
        })
    }
}

impl ConfigGetter for Config {
    fn resolve(&self, item: &AnyItem) -> Result<Option<AnyValue>, ResolutionError> {
        for layer in self.chain() {
            let state = layer.read().values.get(item).cloned();
            match state {
                None => continue,
                Some(ValueState::Unset) => {
                    return Err(ResolutionError::Unset {
                        name: item.name().to_string(),
                    })
                }
                Some(ValueState::Value(value)) => return Ok(Some(value)),
                Some(ValueState::Lazy(thunk)) => {
                    tracing::trace!(
                        "Evaluating lazy {} from layer '{}' for layer '{}'",
                        item.name(),
                        layer.name(),
                        self.name()
                    );
                    let value = thunk(self)?;
                    if !item.accepts(&*value) {
                        return Err(ResolutionError::InvalidLazyCast {
                            name: item.name().to_string(),
                            expected: item.type_name(),
                        });
                    }
                    return Ok(Some(value));
                }
            }
        }
        Ok(None)
    }

    fn find_item(&self, name: &str) -> Option<AnyItem> {
        self.chain()
            .find_map(|layer| layer.read().names.get(name).cloned())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.chain().map(Config::name).collect();
        f.debug_struct("Config")
            .field("layers", &names)
            .field("items", &self.read().items.len())
            .finish()
    }
}

impl<'a> IntoIterator for &'a Config {
    type Item = AnyItem;
    type IntoIter = Items;

    fn into_iter(self) -> Items {
        self.iter()
    }
}

/// Iterator over the items of a config, returned by [`Config::iter`].
pub struct Items {
    next_layer: Option<Config>,
    current: std::vec::IntoIter<AnyItem>,
}

impl Iterator for Items {
    type Item = AnyItem;

    fn next(&mut self) -> Option<AnyItem> {
        loop {
            if let Some(item) = self.current.next() {
                return Some(item);
            }
            let layer = self.next_layer.take()?;
            self.current = layer.read().items.clone().into_iter();
            self.next_layer = layer.parent().cloned();
        }
    }
}

impl fmt::Debug for Items {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Items")
            .field("remaining_in_layer", &self.current.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct NetworkBuffer {
        spec: ConfigSpec,
        size: Item<i32>,
        max_size: Item<i32>,
        name: Item<String>,
        kind: Item<String>,
    }

    fn network_buffer() -> NetworkBuffer {
        let mut spec = ConfigSpec::new("network.buffer");
        let size = spec.required::<i32>("size", "size of buffer in KB").unwrap();
        let max_size = spec
            .lazy("maxSize", "max size of buffer in KB", {
                let size = size.clone();
                move |config: &dyn ConfigGetter| Ok(config.get(&size)? * 2)
            })
            .unwrap();
        let name = spec
            .optional("name", "buffer".to_string(), "name of buffer")
            .unwrap();
        let kind = spec
            .optional("type", "off-heap".to_string(), "type of network buffer")
            .unwrap();
        NetworkBuffer {
            spec,
            size,
            max_size,
            name,
            kind,
        }
    }

    fn loaded() -> (Config, NetworkBuffer) {
        let buffer = network_buffer();
        let config = Config::new();
        config.add_spec(&buffer.spec).unwrap();
        (config, buffer)
    }

    #[test]
    fn test_optional_items_start_with_default() {
        let (config, buffer) = loaded();
        assert_eq!(config.get(&buffer.name).unwrap(), "buffer");
        assert_eq!(config.get(&buffer.kind).unwrap(), "off-heap");
    }

    #[test]
    fn test_required_item_is_unset() {
        let (config, buffer) = loaded();
        assert!(matches!(config.get(&buffer.size), Err(ResolutionError::Unset { .. })));
        assert!(matches!(config.get_or_none(&buffer.size), Err(ResolutionError::Unset { .. })));
    }

    #[test]
    fn test_unknown_item_is_absent() {
        let (config, _) = loaded();
        let other = Item::<i32>::required("other.size", "").unwrap();
        assert_eq!(config.get_or_none(&other).unwrap(), None);
        assert!(matches!(config.get(&other), Err(ResolutionError::NoSuchElement { .. })));
        assert_eq!(config.get_by_name_or_none::<i32>("other.size").unwrap(), None);
    }

    #[test]
    fn test_get_by_name() {
        let (config, buffer) = loaded();
        config.set(&buffer.size, 1).unwrap();
        assert_eq!(config.get_by_name::<i32>("network.buffer.size").unwrap(), 1);
        assert!(matches!(
            config.get_by_name::<String>("network.buffer.size"),
            Err(ResolutionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_set_and_unset() {
        let (config, buffer) = loaded();
        config.set(&buffer.size, 1024).unwrap();
        assert_eq!(config.get(&buffer.size).unwrap(), 1024);
        config.unset(&buffer.name).unwrap();
        assert!(matches!(config.get(&buffer.name), Err(ResolutionError::Unset { .. })));
        config.unset_by_name("network.buffer.size").unwrap();
        assert!(matches!(config.get(&buffer.size), Err(ResolutionError::Unset { .. })));
    }

    #[test]
    fn test_set_by_name_checks_type() {
        let (config, _) = loaded();
        config.set_by_name("network.buffer.size", 64).unwrap();
        assert_eq!(config.get_by_name::<i32>("network.buffer.size").unwrap(), 64);
        let error = config.set_by_name("network.buffer.size", "64".to_string()).unwrap_err();
        assert!(matches!(error, WriteError::TypeMismatch { .. }));
        let error = config.set_by_name("network.buffer.missing", 1).unwrap_err();
        assert!(matches!(error, WriteError::NoSuchElement { .. }));
    }

    #[test]
    fn test_raw_set_checks_type() {
        let (config, buffer) = loaded();
        config.raw_set(&buffer.size, Box::new(5i32)).unwrap();
        assert_eq!(config.get(&buffer.size).unwrap(), 5);
        let error = config.raw_set(&buffer.size, Box::new(5i64)).unwrap_err();
        assert!(matches!(error, WriteError::TypeMismatch { .. }));
        assert_eq!(config.get(&buffer.size).unwrap(), 5);
    }

    #[test]
    fn test_write_to_unregistered_item() {
        let (config, _) = loaded();
        let other = Item::<i32>::required("other.size", "").unwrap();
        assert!(matches!(config.set(&other, 1), Err(WriteError::NoSuchElement { .. })));
        assert!(matches!(config.unset(&other), Err(WriteError::NoSuchElement { .. })));
    }

    #[test]
    fn test_lazy_recomputes_on_every_read() {
        let (config, buffer) = loaded();
        config.set(&buffer.size, 1).unwrap();
        assert_eq!(config.get(&buffer.max_size).unwrap(), 2);
        config.set(&buffer.size, 2048).unwrap();
        assert_eq!(config.get(&buffer.max_size).unwrap(), 4096);
    }

    #[test]
    fn test_lazy_propagates_unset_dependency() {
        let (config, buffer) = loaded();
        assert!(matches!(config.get(&buffer.max_size), Err(ResolutionError::Unset { .. })));
    }

    #[test]
    fn test_concrete_value_replaces_lazy() {
        let (config, buffer) = loaded();
        config.set(&buffer.size, 1).unwrap();
        config.set(&buffer.max_size, 0).unwrap();
        config.set(&buffer.size, 3).unwrap();
        assert_eq!(config.get(&buffer.max_size).unwrap(), 0);
    }

    #[test]
    fn test_lazy_set() {
        let (config, buffer) = loaded();
        config.set(&buffer.size, 10).unwrap();
        let size = buffer.size.clone();
        config
            .lazy_set(&buffer.max_size, move |config: &dyn ConfigGetter| Ok(config.get(&size)? + 1))
            .unwrap();
        assert_eq!(config.get(&buffer.max_size).unwrap(), 11);

        config
            .lazy_set_by_name("network.buffer.name", |_: &dyn ConfigGetter| Ok("lazy".to_string()))
            .unwrap();
        assert_eq!(config.get(&buffer.name).unwrap(), "lazy");

        let error = config
            .lazy_set_by_name("network.buffer.name", |_: &dyn ConfigGetter| Ok(1i32))
            .unwrap_err();
        assert!(matches!(error, WriteError::TypeMismatch { .. }));
    }

    #[test]
    fn test_raw_lazy_set_wrong_type_fails_on_read() {
        let (config, buffer) = loaded();
        let thunk: RawThunk = Arc::new(|_: &dyn ConfigGetter| Ok::<_, ResolutionError>(Arc::new(1u8) as AnyValue));
        config.raw_lazy_set(&buffer.name, thunk).unwrap();
        assert!(matches!(
            config.get(&buffer.name),
            Err(ResolutionError::InvalidLazyCast { .. })
        ));
    }

    #[test]
    fn test_repeated_spec() {
        let (config, buffer) = loaded();
        let error = config.add_spec(&buffer.spec).unwrap_err();
        assert!(matches!(error, RegistrationError::RepeatedItem { .. }));
    }

    #[test]
    fn test_repeated_spec_in_ancestor() {
        let (config, buffer) = loaded();
        let child = config.with_layer("child").with_layer("grandchild");
        let error = child.add_spec(&buffer.spec).unwrap_err();
        assert!(matches!(error, RegistrationError::RepeatedItem { .. }));
    }

    #[test]
    fn test_name_conflict_in_both_orders() {
        let mut short = ConfigSpec::new("a");
        short.required::<i32>("b", "").unwrap();
        let mut long = ConfigSpec::new("a.b");
        long.required::<i32>("c", "").unwrap();

        let config = Config::new();
        config.add_spec(&short).unwrap();
        assert!(matches!(
            config.add_spec(&long),
            Err(RegistrationError::NameConflict { .. })
        ));

        let config = Config::new();
        config.add_spec(&long).unwrap();
        assert!(matches!(
            config.add_spec(&short),
            Err(RegistrationError::NameConflict { .. })
        ));
    }

    #[test]
    fn test_name_conflict_with_ancestor_in_both_orders() {
        let mut short = ConfigSpec::new("a");
        short.required::<i32>("b", "").unwrap();
        let mut long = ConfigSpec::new("a.b");
        long.required::<i32>("c", "").unwrap();

        let parent = Config::new();
        parent.add_spec(&short).unwrap();
        let child = parent.with_layer("child");
        assert!(matches!(
            child.add_spec(&long),
            Err(RegistrationError::NameConflict { name, .. }) if name == "a.b.c"
        ));
        assert_eq!(child.items().len(), 1);

        let parent = Config::new();
        parent.add_spec(&long).unwrap();
        let child = parent.with_layer("child").with_layer("grandchild");
        assert!(matches!(
            child.add_spec(&short),
            Err(RegistrationError::NameConflict { name, .. }) if name == "a.b"
        ));
        assert_eq!(child.items().len(), 1);
    }

    #[test]
    fn test_same_name_different_item_conflicts() {
        let (config, _) = loaded();
        let mut other = ConfigSpec::new("network.buffer");
        other.required::<i32>("size", "").unwrap();
        let error = config.add_spec(&other).unwrap_err();
        assert!(matches!(error, RegistrationError::NameConflict { .. }));
    }

    #[test]
    fn test_add_spec_is_atomic() {
        let (config, _) = loaded();
        let mut spec = ConfigSpec::new("disk");
        let fine = spec.required::<i32>("size", "").unwrap();
        spec.required::<i32>("size.unit", "").unwrap();
        assert!(config.add_spec(&spec).is_err());
        assert!(!config.contains(&fine));
        assert!(!config.contains_name("disk.size"));
        assert!(config.tree().find(&["disk"]).is_none());
    }

    #[test]
    fn test_spec_frozen_after_child() {
        let (config, _) = loaded();
        let _child = config.with_layer("child");
        let mut spec = ConfigSpec::new("disk");
        spec.required::<i32>("size", "").unwrap();
        let error = config.add_spec(&spec).unwrap_err();
        assert!(matches!(error, RegistrationError::SpecFrozen { .. }));
    }

    #[test]
    fn test_child_layer_isolation() {
        let (config, buffer) = loaded();
        config.set(&buffer.size, 1).unwrap();
        let child = config.with_layer("child");
        assert_eq!(child.get(&buffer.size).unwrap(), 1);

        child.set(&buffer.size, 2).unwrap();
        assert_eq!(child.get(&buffer.size).unwrap(), 2);
        assert_eq!(config.get(&buffer.size).unwrap(), 1);

        config.set(&buffer.name, "parent".to_string()).unwrap();
        assert_eq!(child.get(&buffer.name).unwrap(), "parent");
    }

    #[test]
    fn test_child_unset_shadows_parent() {
        let (config, buffer) = loaded();
        let child = config.with_layer("child");
        child.unset(&buffer.name).unwrap();
        assert!(matches!(child.get(&buffer.name), Err(ResolutionError::Unset { .. })));
        assert_eq!(config.get(&buffer.name).unwrap(), "buffer");
    }

    #[test]
    fn test_lazy_in_parent_sees_child_override() {
        let (config, buffer) = loaded();
        config.set(&buffer.size, 1).unwrap();
        let child = config.with_layer("child");
        child.set(&buffer.size, 5).unwrap();
        assert_eq!(child.get(&buffer.max_size).unwrap(), 10);
        assert_eq!(config.get(&buffer.max_size).unwrap(), 2);
    }

    #[test]
    fn test_child_specs_are_invisible_to_parent() {
        let (config, _) = loaded();
        let child = config.with_layer("child");
        let mut spec = ConfigSpec::new("disk");
        let disk = spec.optional::<i32>("size", 7, "").unwrap();
        child.add_spec(&spec).unwrap();

        assert_eq!(child.get(&disk).unwrap(), 7);
        assert_eq!(config.get_or_none(&disk).unwrap(), None);
        assert!(matches!(config.set(&disk, 1), Err(WriteError::NoSuchElement { .. })));
        assert_eq!(child.specs().len(), 2);
        assert_eq!(config.specs().len(), 1);
    }

    #[test]
    fn test_iteration_order() {
        let (config, buffer) = loaded();
        let child = config.with_layer("child");
        let mut spec = ConfigSpec::new("disk");
        let disk = spec.optional::<i32>("size", 7, "").unwrap();
        child.add_spec(&spec).unwrap();

        let names: Vec<String> = child.iter().map(|item| item.name().to_string()).collect();
        assert_eq!(
            names,
            [
                "disk.size",
                "network.buffer.size",
                "network.buffer.maxSize",
                "network.buffer.name",
                "network.buffer.type",
            ]
        );
        assert_eq!(&child.items()[0], disk.as_any());
        assert_eq!(config.items().len(), 4);
        assert_eq!((&config).into_iter().next().as_ref(), Some(buffer.size.as_any()));
    }

    #[test]
    fn test_visit_as_tree() {
        let (config, _) = loaded();
        let events = RefCell::new(Vec::new());
        config.visit_as_tree(
            |path| events.borrow_mut().push(format!("enter {}", path.join("."))),
            |path| events.borrow_mut().push(format!("leave {}", path.join("."))),
            |_, item| events.borrow_mut().push(format!("leaf {}", item.name())),
        );
        let events = events.into_inner();
        assert_eq!(events.first().map(String::as_str), Some("enter "));
        assert_eq!(events.last().map(String::as_str), Some("leave "));
        assert!(events.contains(&"enter network.buffer".to_string()));
        assert_eq!(events.iter().filter(|e| e.starts_with("leaf")).count(), 4);
    }

    #[test]
    fn test_layer_names_and_parent() {
        let config = Config::named("root");
        let child = config.with_layer("child");
        assert_eq!(child.name(), "child");
        assert_eq!(child.parent().map(Config::name), Some("root"));
        assert!(config.parent().is_none());
        assert_eq!(Config::default().name(), "config");
    }

    #[test]
    fn test_locked_root_does_not_block_other_root() {
        use std::sync::mpsc;
        use std::time::Duration;

        let (locked, _) = loaded();
        let (free, buffer) = loaded();
        free.set(&buffer.size, 3).unwrap();

        let guard = locked.write();
        let (sender, receiver) = mpsc::channel();
        let reader = std::thread::spawn(move || {
            free.set(&buffer.name, "free".to_string()).unwrap();
            sender.send(free.get(&buffer.max_size)).unwrap();
        });

        let result = receiver.recv_timeout(Duration::from_secs(5));
        drop(guard);
        reader.join().unwrap();
        assert_eq!(result.unwrap().unwrap(), 6);
    }
}
