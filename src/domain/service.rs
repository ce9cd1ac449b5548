// SPDX-License-Identifier: MIT OR Apache-2.0

//! The read surface of a config.
//!
//! `ConfigGetter` is what lazy thunks receive. It is object safe so a thunk
//! can be stored as a plain function value; the typed accessors live on
//! `dyn ConfigGetter` and are shared with `Config`'s inherent methods.

use crate::domain::errors::ResolutionError;
use crate::domain::item::{AnyItem, Item};
use crate::domain::types::{AnyValue, ConfigType};
use std::any::{type_name, TypeId};

/// Read access to item values.
///
/// # Examples
///
/// ```
/// use layercfg::domain::service::ConfigGetter;
/// use layercfg::domain::spec::ConfigSpec;
/// use layercfg::service::Config;
///
/// let mut spec = ConfigSpec::new("buffer");
/// let size = spec.optional::<i32>("size", 2, "").unwrap();
/// let total = spec
///     .lazy("total", "", {
///         let size = size.clone();
///         move |config: &dyn ConfigGetter| Ok(config.get(&size)? * 2)
///     })
///     .unwrap();
///
/// let config = Config::new();
/// config.add_spec(&spec).unwrap();
/// assert_eq!(config.get(&total).unwrap(), 4);
/// ```
pub trait ConfigGetter: Send + Sync {
    /// Resolves the current value of `item`.
    ///
    /// Returns `Ok(None)` if the item is not registered anywhere in the
    /// layer chain and `Err(Unset)` if it is registered but holds no value.
    /// Lazy values are evaluated and checked against the item's type.
    fn resolve(&self, item: &AnyItem) -> Result<Option<AnyValue>, ResolutionError>;

    /// Looks up a registered item by its qualified name.
    fn find_item(&self, name: &str) -> Option<AnyItem>;
}

impl dyn ConfigGetter + '_ {
    /// Returns the value of `item`.
    pub fn get<T: ConfigType>(&self, item: &Item<T>) -> Result<T, ResolutionError> {
        get(self, item)
    }

    /// Returns the value of `item`, or `None` if it is not registered.
    pub fn get_or_none<T: ConfigType>(&self, item: &Item<T>) -> Result<Option<T>, ResolutionError> {
        get_or_none(self, item)
    }

    /// Returns the value of the item called `name`.
    pub fn get_by_name<T: ConfigType>(&self, name: &str) -> Result<T, ResolutionError> {
        get_by_name(self, name)
    }

    /// Returns the value of the item called `name`, or `None` if no such
    /// item is registered.
    pub fn get_by_name_or_none<T: ConfigType>(
        &self,
        name: &str,
    ) -> Result<Option<T>, ResolutionError> {
        get_by_name_or_none(self, name)
    }
}

pub(crate) fn get_or_none<T, G>(getter: &G, item: &Item<T>) -> Result<Option<T>, ResolutionError>
where
    T: ConfigType,
    G: ConfigGetter + ?Sized,
{
    match getter.resolve(item.as_any())? {
        Some(value) => downcast_value(item.as_any(), &value).map(Some),
        None => Ok(None),
    }
}

pub(crate) fn get<T, G>(getter: &G, item: &Item<T>) -> Result<T, ResolutionError>
where
    T: ConfigType,
    G: ConfigGetter + ?Sized,
{
    get_or_none(getter, item)?.ok_or_else(|| ResolutionError::NoSuchElement {
        name: item.name().to_string(),
    })
}

pub(crate) fn get_by_name_or_none<T, G>(getter: &G, name: &str) -> Result<Option<T>, ResolutionError>
where
    T: ConfigType,
    G: ConfigGetter + ?Sized,
{
    let Some(item) = getter.find_item(name) else {
        return Ok(None);
    };
    let item = typed_item::<T>(&item)?;
    get_or_none(getter, &item)
}

pub(crate) fn get_by_name<T, G>(getter: &G, name: &str) -> Result<T, ResolutionError>
where
    T: ConfigType,
    G: ConfigGetter + ?Sized,
{
    get_by_name_or_none(getter, name)?.ok_or_else(|| ResolutionError::NoSuchElement {
        name: name.to_string(),
    })
}

/// Recovers the typed handle, or reports that `T` is not the item's type.
pub(crate) fn typed_item<T: ConfigType>(item: &AnyItem) -> Result<Item<T>, ResolutionError> {
    item.downcast::<T>().ok_or_else(|| ResolutionError::TypeMismatch {
        name: item.name().to_string(),
        actual: item.type_name(),
        requested: type_name::<T>(),
    })
}

fn downcast_value<T: ConfigType>(item: &AnyItem, value: &AnyValue) -> Result<T, ResolutionError> {
    debug_assert_eq!(item.value_type_id(), TypeId::of::<T>());
    value
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| ResolutionError::InvalidLazyCast {
            name: item.name().to_string(),
            expected: item.type_name(),
        })
}
