// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration items.
//!
//! An item is a named, statically typed configuration entry. Its identity is
//! the allocation behind the handle, not its name: two items declared with
//! the same name are different items, and clones of one handle are the same
//! item.

use crate::domain::config_path::ConfigPath;
use crate::domain::errors::{RegistrationError, ResolutionError};
use crate::domain::service::ConfigGetter;
use crate::domain::types::{AnyValue, ConfigType, TypeDescriptor};
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

/// A deferred computation of an item value from other items.
///
/// The thunk is evaluated on every read, against the config layer the read
/// started from.
pub type Thunk<T> = Arc<dyn Fn(&dyn ConfigGetter) -> Result<T, ResolutionError> + Send + Sync>;

/// A thunk whose result type has been erased.
pub type RawThunk = Thunk<AnyValue>;

/// How an item obtains its initial value.
pub enum ItemBehavior<T> {
    /// No default; reading before a value is set fails.
    Required,
    /// Starts with `default`.
    Optional {
        /// The default value
        default: T,
    },
    /// Computed from other items on every read until overwritten.
    Lazy {
        /// The computation
        thunk: Thunk<T>,
    },
}

impl<T> ItemBehavior<T> {
    /// Wraps a closure as a lazy behavior.
    pub fn lazy<F>(thunk: F) -> Self
    where
        F: Fn(&dyn ConfigGetter) -> Result<T, ResolutionError> + Send + Sync + 'static,
    {
        ItemBehavior::Lazy {
            thunk: Arc::new(thunk),
        }
    }
}

/// The behavior of an item, without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    /// See [`ItemBehavior::Required`]
    Required,
    /// See [`ItemBehavior::Optional`]
    Optional,
    /// See [`ItemBehavior::Lazy`]
    Lazy,
}

#[derive(Clone)]
pub(crate) enum RawBehavior {
    Required,
    Optional(AnyValue),
    Lazy(RawThunk),
}

struct ItemDef {
    name: String,
    path: ConfigPath,
    description: String,
    descriptor: TypeDescriptor,
    type_id: TypeId,
    type_name: &'static str,
    behavior: RawBehavior,
}

/// A type-erased item handle.
///
/// Equality and hashing use the identity of the underlying item.
#[derive(Clone)]
pub struct AnyItem(Arc<ItemDef>);

impl AnyItem {
    /// Returns the fully qualified, dotted name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the name split into segments.
    pub fn path(&self) -> &ConfigPath {
        &self.0.path
    }

    /// Returns the human readable description.
    pub fn description(&self) -> &str {
        &self.0.description
    }

    /// Returns the descriptor of the item's value type.
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.0.descriptor
    }

    /// Returns the `TypeId` of the item's value type.
    pub fn value_type_id(&self) -> TypeId {
        self.0.type_id
    }

    /// Returns the Rust name of the item's value type.
    pub fn type_name(&self) -> &'static str {
        self.0.type_name
    }

    /// Returns how the item obtains its initial value.
    pub fn kind(&self) -> ItemKind {
        match self.0.behavior {
            RawBehavior::Required => ItemKind::Required,
            RawBehavior::Optional(_) => ItemKind::Optional,
            RawBehavior::Lazy(_) => ItemKind::Lazy,
        }
    }

    /// Returns `true` for required items.
    pub fn is_required(&self) -> bool {
        self.kind() == ItemKind::Required
    }

    /// Returns `true` for optional items.
    pub fn is_optional(&self) -> bool {
        self.kind() == ItemKind::Optional
    }

    /// Returns `true` for lazy items.
    pub fn is_lazy(&self) -> bool {
        self.kind() == ItemKind::Lazy
    }

    /// Returns `true` if `value` has the item's value type.
    pub fn accepts(&self, value: &(dyn Any + Send + Sync)) -> bool {
        value.type_id() == self.0.type_id
    }

    /// Recovers the typed handle if `T` is the item's value type.
    pub fn downcast<T: ConfigType>(&self) -> Option<Item<T>> {
        (self.0.type_id == TypeId::of::<T>()).then(|| Item {
            any: self.clone(),
            _type: PhantomData,
        })
    }

    pub(crate) fn behavior(&self) -> &RawBehavior {
        &self.0.behavior
    }
}

impl PartialEq for AnyItem {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for AnyItem {}

impl Hash for AnyItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as *const () as usize).hash(state);
    }
}

impl fmt::Debug for AnyItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("name", &self.0.name)
            .field("type", &self.0.type_name)
            .field("kind", &self.kind())
            .finish()
    }
}

impl fmt::Display for AnyItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

/// A typed item handle, used as a key into a config.
///
/// # Examples
///
/// ```
/// use layercfg::domain::item::{Item, ItemKind};
///
/// let size = Item::<i32>::optional("network.buffer.size", 1024, "size of buffer in KB").unwrap();
/// assert_eq!(size.name(), "network.buffer.size");
/// assert_eq!(size.kind(), ItemKind::Optional);
/// assert_eq!(size.default_value(), Some(1024));
/// ```
pub struct Item<T> {
    any: AnyItem,
    _type: PhantomData<fn() -> T>,
}

impl<T: ConfigType> Item<T> {
    /// Declares an item with the given behavior.
    ///
    /// Fails with `InvalidName` if `name` has an empty path segment.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        behavior: ItemBehavior<T>,
    ) -> Result<Self, RegistrationError> {
        let name = name.into();
        let path = ConfigPath::parse(&name)?;
        let behavior = match behavior {
            ItemBehavior::Required => RawBehavior::Required,
            ItemBehavior::Optional { default } => RawBehavior::Optional(Arc::new(default)),
            ItemBehavior::Lazy { thunk } => RawBehavior::Lazy(erase_thunk(thunk)),
        };
        Ok(Item {
            any: AnyItem(Arc::new(ItemDef {
                name,
                path,
                description: description.into(),
                descriptor: T::descriptor(),
                type_id: TypeId::of::<T>(),
                type_name: type_name::<T>(),
                behavior,
            })),
            _type: PhantomData,
        })
    }

    /// Declares a required item.
    pub fn required(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, RegistrationError> {
        Item::new(name, description, ItemBehavior::Required)
    }

    /// Declares an optional item with a default value.
    pub fn optional(
        name: impl Into<String>,
        default: T,
        description: impl Into<String>,
    ) -> Result<Self, RegistrationError> {
        Item::new(name, description, ItemBehavior::Optional { default })
    }

    /// Declares a lazy item computed by `thunk`.
    pub fn lazy<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        thunk: F,
    ) -> Result<Self, RegistrationError>
    where
        F: Fn(&dyn ConfigGetter) -> Result<T, ResolutionError> + Send + Sync + 'static,
    {
        Item::new(name, description, ItemBehavior::lazy(thunk))
    }

    /// Returns the default value of an optional item.
    pub fn default_value(&self) -> Option<T> {
        match self.any.behavior() {
            RawBehavior::Optional(value) => value.downcast_ref::<T>().cloned(),
            _ => None,
        }
    }
}

impl<T> Item<T> {
    /// Returns the type-erased handle.
    pub fn as_any(&self) -> &AnyItem {
        &self.any
    }

    /// Converts into the type-erased handle.
    pub fn into_any(self) -> AnyItem {
        self.any
    }
}

pub(crate) fn erase_thunk<T: ConfigType>(thunk: Thunk<T>) -> RawThunk {
    Arc::new(move |config: &dyn ConfigGetter| thunk(config).map(|value| Arc::new(value) as AnyValue))
}

impl<T> Deref for Item<T> {
    type Target = AnyItem;

    fn deref(&self) -> &AnyItem {
        &self.any
    }
}

impl<T> Clone for Item<T> {
    fn clone(&self) -> Self {
        Item {
            any: self.any.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> PartialEq for Item<T> {
    fn eq(&self, other: &Self) -> bool {
        self.any == other.any
    }
}

impl<T> Eq for Item<T> {}

impl<T> Hash for Item<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.any.hash(state);
    }
}

impl<T> fmt::Debug for Item<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.any.fmt(f)
    }
}

impl<T> From<Item<T>> for AnyItem {
    fn from(item: Item<T>) -> Self {
        item.any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_required_item() {
        let item = Item::<String>::required("app.name", "application name").unwrap();
        assert_eq!(item.name(), "app.name");
        assert_eq!(item.description(), "application name");
        assert!(item.is_required());
        assert_eq!(item.default_value(), None);
        assert_eq!(item.value_type_id(), TypeId::of::<String>());
    }

    #[test]
    fn test_invalid_name() {
        let result = Item::<i32>::required("a..b", "");
        assert!(matches!(result, Err(RegistrationError::InvalidName { name }) if name == "a..b"));
    }

    #[test]
    fn test_identity_is_not_name() {
        let first = Item::<i32>::required("a.b", "").unwrap();
        let second = Item::<i32>::required("a.b", "").unwrap();
        assert_ne!(first, second);
        assert_eq!(first, first.clone());

        let mut set = HashSet::new();
        set.insert(first.as_any().clone());
        set.insert(first.clone().into_any());
        set.insert(second.into_any());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_downcast() {
        let item = Item::<u16>::optional("port", 8080, "").unwrap();
        let any = item.clone().into_any();
        assert_eq!(any.downcast::<u16>(), Some(item));
        assert!(any.downcast::<u32>().is_none());
    }

    #[test]
    fn test_accepts() {
        let item = Item::<i64>::required("a", "").unwrap();
        let boxed: Box<dyn Any + Send + Sync> = Box::new(5i64);
        assert!(item.accepts(boxed.as_ref()));
        assert!(!item.accepts(&5i32));
    }

    #[test]
    fn test_lazy_item_kind() {
        let item = Item::<i32>::lazy("a.total", "", |_| Ok(2)).unwrap();
        assert!(item.is_lazy());
        assert!(format!("{item:?}").contains("a.total"));
    }
}
