// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static type descriptions for item values.
//!
//! Every value type that can be stored in a config implements [`ConfigType`],
//! which describes the type as a [`TypeDescriptor`]. Coercion of source
//! values walks the descriptor instead of inspecting types at runtime.
//! Container descriptors carry a monomorphic assembler so a coerced value has
//! exactly the Rust type the item declares.

use crate::domain::size_in_bytes::SizeInBytes;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::any::{type_name, Any};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

/// A shared, type-erased item value.
pub type AnyValue = Arc<dyn Any + Send + Sync>;

/// An owned, type-erased item value.
pub type BoxedValue = Box<dyn Any + Send + Sync>;

/// A type that item values can have.
///
/// Implemented for the scalar, temporal and container types the crate knows
/// how to load. User enums get an implementation through [`config_enum!`];
/// other types can implement it with [`TypeDescriptor::Opaque`] and are then
/// settable in code but not loadable from sources.
///
/// [`config_enum!`]: crate::config_enum
pub trait ConfigType: Any + Send + Sync + Clone + fmt::Debug {
    /// Describes this type.
    fn descriptor() -> TypeDescriptor;
}

/// The scalar types understood by source coercion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ScalarKind {
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `i128`
    I128,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `char`
    Char,
    /// `String`
    String,
    /// `rust_decimal::Decimal`
    Decimal,
    /// `chrono::NaiveDate`
    Date,
    /// `chrono::NaiveTime`
    Time,
    /// `chrono::NaiveDateTime`
    DateTime,
    /// `chrono::DateTime<FixedOffset>`
    OffsetDateTime,
    /// `chrono::DateTime<Utc>`
    Instant,
    /// `std::time::Duration`
    Duration,
    /// [`SizeInBytes`]
    Size,
}

impl ScalarKind {
    /// Returns the kind name used in `WrongType` diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::I128 => "i128",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Char => "char",
            ScalarKind::String => "text",
            ScalarKind::Decimal => "decimal",
            ScalarKind::Date => "date",
            ScalarKind::Time => "time",
            ScalarKind::DateTime => "date-time",
            ScalarKind::OffsetDateTime => "offset-date-time",
            ScalarKind::Instant => "instant",
            ScalarKind::Duration => "duration",
            ScalarKind::Size => "size",
        }
    }
}

/// Description of a user enum with named, field-less variants.
#[derive(Clone, Debug)]
pub struct EnumDescriptor {
    /// Rust type name of the enum
    pub type_name: &'static str,
    /// Variant names, matched case-sensitively
    pub variants: &'static [&'static str],
    /// Builds the variant with the given name
    pub from_name: fn(&str) -> Option<BoxedValue>,
}

/// Description of an array, list or set type.
#[derive(Clone, Debug)]
pub struct ContainerDescriptor {
    /// Rust type name of the container
    pub type_name: &'static str,
    /// Description of the element type
    pub element: Box<TypeDescriptor>,
    /// Collects coerced elements into the container; `None` if an element
    /// has the wrong type
    pub assemble: fn(Vec<BoxedValue>) -> Option<BoxedValue>,
}

/// Description of a map type.
#[derive(Clone, Debug)]
pub struct MapDescriptor {
    /// Rust type name of the map
    pub type_name: &'static str,
    /// Description of the key type; only `String` keys can be loaded
    pub key: Box<TypeDescriptor>,
    /// Description of the value type
    pub value: Box<TypeDescriptor>,
    /// Collects coerced entries into the map
    pub assemble: fn(Vec<(String, BoxedValue)>) -> Option<BoxedValue>,
}

/// The static shape of an item's type.
#[derive(Clone, Debug)]
pub enum TypeDescriptor {
    /// A scalar or temporal type
    Scalar(ScalarKind),
    /// A user enum
    Enum(EnumDescriptor),
    /// `Box<[T]>`
    Array(ContainerDescriptor),
    /// `Vec<T>`
    List(ContainerDescriptor),
    /// `HashSet<T>`
    Set(ContainerDescriptor),
    /// `BTreeSet<T>`
    SortedSet(ContainerDescriptor),
    /// `HashMap<K, V>` or `BTreeMap<K, V>`
    Map(MapDescriptor),
    /// A type that cannot be loaded from sources
    Opaque(&'static str),
}

impl TypeDescriptor {
    /// Describes `T` as a type that cannot be loaded from sources.
    pub fn opaque<T>() -> Self {
        TypeDescriptor::Opaque(type_name::<T>())
    }

    /// Returns a readable name of the described type.
    pub fn type_name(&self) -> &'static str {
        match self {
            TypeDescriptor::Scalar(kind) => kind.name(),
            TypeDescriptor::Enum(descriptor) => descriptor.type_name,
            TypeDescriptor::Array(descriptor)
            | TypeDescriptor::List(descriptor)
            | TypeDescriptor::Set(descriptor)
            | TypeDescriptor::SortedSet(descriptor) => descriptor.type_name,
            TypeDescriptor::Map(descriptor) => descriptor.type_name,
            TypeDescriptor::Opaque(name) => name,
        }
    }

    /// Returns `true` if this describes `String`.
    pub fn is_string(&self) -> bool {
        matches!(self, TypeDescriptor::Scalar(ScalarKind::String))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

macro_rules! scalar_config_type {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl ConfigType for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::Scalar(ScalarKind::$kind)
                }
            }
        )*
    };
}

scalar_config_type! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => String,
    Decimal => Decimal,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => OffsetDateTime,
    DateTime<Utc> => Instant,
    Duration => Duration,
    SizeInBytes => Size,
}

/// Downcasts every element to `T`, failing if any has another type.
pub(crate) fn downcast_all<T: Any>(values: Vec<BoxedValue>) -> Option<Vec<T>> {
    values
        .into_iter()
        .map(|value| value.downcast::<T>().ok().map(|value| *value))
        .collect()
}

fn downcast_entries<K: Any, V: Any>(entries: Vec<(String, BoxedValue)>) -> Option<Vec<(K, V)>> {
    entries
        .into_iter()
        .map(|(key, value)| {
            let key = (Box::new(key) as BoxedValue).downcast::<K>().ok()?;
            let value = value.downcast::<V>().ok()?;
            Some((*key, *value))
        })
        .collect()
}

impl<T: ConfigType> ConfigType for Box<[T]> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Array(ContainerDescriptor {
            type_name: type_name::<Self>(),
            element: Box::new(T::descriptor()),
            assemble: |values| {
                downcast_all::<T>(values).map(|values| Box::new(values.into_boxed_slice()) as BoxedValue)
            },
        })
    }
}

impl<T: ConfigType> ConfigType for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::List(ContainerDescriptor {
            type_name: type_name::<Self>(),
            element: Box::new(T::descriptor()),
            assemble: |values| downcast_all::<T>(values).map(|values| Box::new(values) as BoxedValue),
        })
    }
}

impl<T: ConfigType + Eq + Hash> ConfigType for HashSet<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Set(ContainerDescriptor {
            type_name: type_name::<Self>(),
            element: Box::new(T::descriptor()),
            assemble: |values| {
                downcast_all::<T>(values)
                    .map(|values| Box::new(values.into_iter().collect::<HashSet<T>>()) as BoxedValue)
            },
        })
    }
}

impl<T: ConfigType + Ord> ConfigType for BTreeSet<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::SortedSet(ContainerDescriptor {
            type_name: type_name::<Self>(),
            element: Box::new(T::descriptor()),
            assemble: |values| {
                downcast_all::<T>(values)
                    .map(|values| Box::new(values.into_iter().collect::<BTreeSet<T>>()) as BoxedValue)
            },
        })
    }
}

impl<K: ConfigType + Eq + Hash, V: ConfigType> ConfigType for HashMap<K, V> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Map(MapDescriptor {
            type_name: type_name::<Self>(),
            key: Box::new(K::descriptor()),
            value: Box::new(V::descriptor()),
            assemble: |entries| {
                downcast_entries::<K, V>(entries)
                    .map(|entries| Box::new(entries.into_iter().collect::<HashMap<K, V>>()) as BoxedValue)
            },
        })
    }
}

impl<K: ConfigType + Ord, V: ConfigType> ConfigType for BTreeMap<K, V> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Map(MapDescriptor {
            type_name: type_name::<Self>(),
            key: Box::new(K::descriptor()),
            value: Box::new(V::descriptor()),
            assemble: |entries| {
                downcast_entries::<K, V>(entries)
                    .map(|entries| Box::new(entries.into_iter().collect::<BTreeMap<K, V>>()) as BoxedValue)
            },
        })
    }
}

/// Implements [`ConfigType`] for an enum with field-less variants.
///
/// Variants are loaded from sources by their exact (case-sensitive) name.
///
/// # Examples
///
/// ```
/// use layercfg::config_enum;
/// use layercfg::domain::types::{ConfigType, TypeDescriptor};
///
/// #[derive(Clone, Debug, PartialEq)]
/// enum Mode {
///     Fast,
///     Safe,
/// }
///
/// config_enum!(Mode { Fast, Safe });
///
/// match Mode::descriptor() {
///     TypeDescriptor::Enum(descriptor) => assert_eq!(descriptor.variants, ["Fast", "Safe"]),
///     other => panic!("unexpected descriptor {other:?}"),
/// }
/// ```
#[macro_export]
macro_rules! config_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::domain::types::ConfigType for $ty {
            fn descriptor() -> $crate::domain::types::TypeDescriptor {
                $crate::domain::types::TypeDescriptor::Enum($crate::domain::types::EnumDescriptor {
                    type_name: ::std::any::type_name::<$ty>(),
                    variants: &[$(stringify!($variant)),+],
                    from_name: |name| match name {
                        $(stringify!($variant) => ::std::option::Option::Some(
                            ::std::boxed::Box::new($ty::$variant) as $crate::domain::types::BoxedValue
                        ),)+
                        _ => ::std::option::Option::None,
                    },
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum Level {
        Low,
        High,
    }

    crate::config_enum!(Level { Low, High });

    #[derive(Clone, Debug)]
    struct Handle;

    impl ConfigType for Handle {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::opaque::<Handle>()
        }
    }

    #[test]
    fn test_scalar_descriptors() {
        assert!(matches!(i32::descriptor(), TypeDescriptor::Scalar(ScalarKind::I32)));
        assert!(String::descriptor().is_string());
        assert_eq!(SizeInBytes::descriptor().type_name(), "size");
    }

    #[test]
    fn test_list_assembles_exact_type() {
        let TypeDescriptor::List(descriptor) = Vec::<i32>::descriptor() else {
            panic!("expected list descriptor");
        };
        assert!(matches!(*descriptor.element, TypeDescriptor::Scalar(ScalarKind::I32)));

        let values: Vec<BoxedValue> = vec![Box::new(1i32), Box::new(2i32)];
        let assembled = (descriptor.assemble)(values).unwrap();
        assert_eq!(*assembled.downcast::<Vec<i32>>().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_assemble_rejects_wrong_element_type() {
        let TypeDescriptor::List(descriptor) = Vec::<i32>::descriptor() else {
            panic!("expected list descriptor");
        };
        let values: Vec<BoxedValue> = vec![Box::new(1i64)];
        assert!((descriptor.assemble)(values).is_none());
    }

    #[test]
    fn test_sorted_set_orders_and_deduplicates() {
        let TypeDescriptor::SortedSet(descriptor) = BTreeSet::<i32>::descriptor() else {
            panic!("expected sorted set descriptor");
        };
        let values: Vec<BoxedValue> = vec![Box::new(3i32), Box::new(1i32), Box::new(3i32)];
        let assembled = (descriptor.assemble)(values).unwrap();
        let set = assembled.downcast::<BTreeSet<i32>>().unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_array_descriptor() {
        let TypeDescriptor::Array(descriptor) = Box::<[u8]>::descriptor() else {
            panic!("expected array descriptor");
        };
        let values: Vec<BoxedValue> = vec![Box::new(9u8)];
        let assembled = (descriptor.assemble)(values).unwrap();
        assert_eq!(&assembled.downcast::<Box<[u8]>>().unwrap()[..], &[9u8]);
    }

    #[test]
    fn test_map_with_string_keys() {
        let TypeDescriptor::Map(descriptor) = HashMap::<String, i64>::descriptor() else {
            panic!("expected map descriptor");
        };
        assert!(descriptor.key.is_string());
        let entries: Vec<(String, BoxedValue)> = vec![("a".to_string(), Box::new(1i64))];
        let assembled = (descriptor.assemble)(entries).unwrap();
        let map = assembled.downcast::<HashMap<String, i64>>().unwrap();
        assert_eq!(map.get("a"), Some(&1));
    }

    #[test]
    fn test_map_with_non_string_keys_cannot_assemble() {
        let TypeDescriptor::Map(descriptor) = BTreeMap::<i32, i32>::descriptor() else {
            panic!("expected map descriptor");
        };
        assert!(!descriptor.key.is_string());
        let entries: Vec<(String, BoxedValue)> = vec![("1".to_string(), Box::new(1i32))];
        assert!((descriptor.assemble)(entries).is_none());
    }

    #[test]
    fn test_enum_descriptor() {
        let TypeDescriptor::Enum(descriptor) = Level::descriptor() else {
            panic!("expected enum descriptor");
        };
        assert_eq!(descriptor.variants, ["Low", "High"]);
        let high = (descriptor.from_name)("High").unwrap();
        assert_eq!(*high.downcast::<Level>().unwrap(), Level::High);
        assert!((descriptor.from_name)("high").is_none());
    }

    #[test]
    fn test_opaque_descriptor() {
        assert!(matches!(Handle::descriptor(), TypeDescriptor::Opaque(name) if name.ends_with("Handle")));
    }
}
