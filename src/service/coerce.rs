// SPDX-License-Identifier: MIT OR Apache-2.0

//! Type-directed coercion of source values.
//!
//! [`coerce`] walks an item's [`TypeDescriptor`] and reads the matching
//! accessors of a [`Source`], recursing into list and map elements. The
//! result is boxed with exactly the item's Rust type.

use crate::domain::errors::SourceError;
use crate::domain::types::{BoxedValue, ContainerDescriptor, MapDescriptor, ScalarKind, TypeDescriptor};
use crate::ports::Source;

/// Converts `source` into a value described by `descriptor`.
///
/// # Errors
///
/// - `WrongType` if the source holds a different kind of value
/// - `ParseError` if text cannot be parsed, a number is out of range or an
///   enum variant is unknown
/// - `UnsupportedMapKey` for maps whose key type is not `String`
/// - `UnsupportedType` for opaque types
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::FlatMapSource;
/// use layercfg::domain::ConfigType;
/// use layercfg::service::coerce;
///
/// let source = FlatMapSource::new([("0", "1"), ("1", "2"), ("2", "2")]);
/// let value = coerce(&source, &<std::collections::BTreeSet<u8>>::descriptor()).unwrap();
/// let set = value.downcast::<std::collections::BTreeSet<u8>>().unwrap();
/// assert_eq!(set.into_iter().collect::<Vec<_>>(), [1, 2]);
/// ```
pub fn coerce(source: &dyn Source, descriptor: &TypeDescriptor) -> Result<BoxedValue, SourceError> {
    match descriptor {
        TypeDescriptor::Scalar(kind) => coerce_scalar(source, *kind),
        TypeDescriptor::Enum(descriptor) => {
            let name = source.to_text()?;
            (descriptor.from_name)(&name).ok_or_else(|| {
                SourceError::parse(format!(
                    "'{}' is not a variant of {}, expected one of: {}",
                    name,
                    descriptor.type_name,
                    descriptor.variants.join(", ")
                ))
            })
        }
        TypeDescriptor::Array(container)
        | TypeDescriptor::List(container)
        | TypeDescriptor::Set(container)
        | TypeDescriptor::SortedSet(container) => coerce_container(source, container),
        TypeDescriptor::Map(map) => coerce_map(source, map),
        TypeDescriptor::Opaque(type_name) => Err(SourceError::UnsupportedType {
            description: source.description(),
            type_name: *type_name,
        }),
    }
}

fn coerce_scalar(source: &dyn Source, kind: ScalarKind) -> Result<BoxedValue, SourceError> {
    let value: BoxedValue = match kind {
        ScalarKind::Bool => Box::new(source.to_bool()?),
        ScalarKind::I8 => Box::new(source.to_i8()?),
        ScalarKind::I16 => Box::new(source.to_i16()?),
        ScalarKind::I32 => Box::new(source.to_i32()?),
        ScalarKind::I64 => Box::new(source.to_i64()?),
        ScalarKind::I128 => Box::new(source.to_i128()?),
        ScalarKind::U8 => Box::new(source.to_u8()?),
        ScalarKind::U16 => Box::new(source.to_u16()?),
        ScalarKind::U32 => Box::new(source.to_u32()?),
        ScalarKind::U64 => Box::new(source.to_u64()?),
        ScalarKind::F32 => Box::new(source.to_f32()?),
        ScalarKind::F64 => Box::new(source.to_f64()?),
        ScalarKind::Char => Box::new(source.to_char()?),
        ScalarKind::String => Box::new(source.to_text()?),
        ScalarKind::Decimal => Box::new(source.to_decimal()?),
        ScalarKind::Date => Box::new(source.to_date()?),
        ScalarKind::Time => Box::new(source.to_time()?),
        ScalarKind::DateTime => Box::new(source.to_date_time()?),
        ScalarKind::OffsetDateTime => Box::new(source.to_offset_date_time()?),
        ScalarKind::Instant => Box::new(source.to_instant()?),
        ScalarKind::Duration => Box::new(source.to_duration()?),
        ScalarKind::Size => Box::new(source.to_size()?),
    };
    Ok(value)
}

fn coerce_container(source: &dyn Source, container: &ContainerDescriptor) -> Result<BoxedValue, SourceError> {
    let elements = source
        .to_list()?
        .iter()
        .map(|element| coerce(element.as_ref(), &container.element))
        .collect::<Result<Vec<_>, _>>()?;
    (container.assemble)(elements).ok_or_else(|| SourceError::UnsupportedType {
        description: source.description(),
        type_name: container.type_name,
    })
}

fn coerce_map(source: &dyn Source, map: &MapDescriptor) -> Result<BoxedValue, SourceError> {
    if !map.key.is_string() {
        return Err(SourceError::UnsupportedMapKey {
            type_name: map.key.type_name(),
        });
    }
    let entries = source
        .to_map()?
        .into_iter()
        .map(|(key, value)| coerce(value.as_ref(), &map.value).map(|value| (key, value)))
        .collect::<Result<Vec<_>, _>>()?;
    (map.assemble)(entries).ok_or_else(|| SourceError::UnsupportedType {
        description: source.description(),
        type_name: map.type_name,
    })
}
