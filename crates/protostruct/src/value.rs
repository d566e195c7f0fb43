// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic value tree backing a materialized [`Instance`](crate::Instance).

use crate::kind::PrimitiveKind;
use crate::shape::Shape;

/// Complex number with real and imaginary parts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

impl<T> Complex<T> {
    pub fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
}

/// A value of some materialized [`Shape`].
///
/// Struct values are positional: element `i` belongs to field `i` of the
/// struct shape. Map entries keep insertion order; keys are unique.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    // Primitives
    Bool(bool),
    Int(i64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Uint(u64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Uintptr(u64),
    F32(f32),
    F64(f64),
    Complex64(Complex<f32>),
    Complex128(Complex<f64>),
    String(String),
    Any(serde_json::Value),

    // Composites
    Struct(Vec<Value>),
    List(Vec<Value>),
    Array(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Pointer(Option<Box<Value>>),
}

impl Value {
    /// Primitive kind of this value, `None` for composites.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        let kind = match self {
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::Int(_) => PrimitiveKind::Int,
            Self::I8(_) => PrimitiveKind::Int8,
            Self::I16(_) => PrimitiveKind::Int16,
            Self::I32(_) => PrimitiveKind::Int32,
            Self::I64(_) => PrimitiveKind::Int64,
            Self::Uint(_) => PrimitiveKind::Uint,
            Self::U8(_) => PrimitiveKind::Uint8,
            Self::U16(_) => PrimitiveKind::Uint16,
            Self::U32(_) => PrimitiveKind::Uint32,
            Self::U64(_) => PrimitiveKind::Uint64,
            Self::Uintptr(_) => PrimitiveKind::Uintptr,
            Self::F32(_) => PrimitiveKind::Float32,
            Self::F64(_) => PrimitiveKind::Float64,
            Self::Complex64(_) => PrimitiveKind::Complex64,
            Self::Complex128(_) => PrimitiveKind::Complex128,
            Self::String(_) => PrimitiveKind::String,
            Self::Any(_) => PrimitiveKind::Any,
            Self::Struct(_) | Self::List(_) | Self::Array(_) | Self::Map(_) | Self::Pointer(_) => {
                return None
            }
        };
        Some(kind)
    }

    /// Short kind name, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Struct(_) => "struct",
            Self::List(_) => "slice",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Pointer(_) => "ptr",
            other => other.primitive_kind().map_or("unknown", PrimitiveKind::name),
        }
    }

    /// Whether this is the empty value for `omitempty` purposes.
    ///
    /// Structs are never empty; arrays are empty only at length zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Bool(v) => !v,
            Self::Int(v) | Self::I64(v) => *v == 0,
            Self::I8(v) => *v == 0,
            Self::I16(v) => *v == 0,
            Self::I32(v) => *v == 0,
            Self::Uint(v) | Self::U64(v) | Self::Uintptr(v) => *v == 0,
            Self::U8(v) => *v == 0,
            Self::U16(v) => *v == 0,
            Self::U32(v) => *v == 0,
            Self::F32(v) => *v == 0.0,
            Self::F64(v) => *v == 0.0,
            Self::Complex64(c) => c.re == 0.0 && c.im == 0.0,
            Self::Complex128(c) => c.re == 0.0 && c.im == 0.0,
            Self::String(s) => s.is_empty(),
            Self::Any(v) => v.is_null(),
            Self::Struct(_) => false,
            Self::List(v) | Self::Array(v) => v.is_empty(),
            Self::Map(entries) => entries.is_empty(),
            Self::Pointer(p) => p.is_none(),
        }
    }

    /// Check that this value has the layout described by `shape`.
    pub fn conforms_to(&self, shape: &Shape) -> bool {
        match (shape, self) {
            (Shape::Primitive(kind), value) => value.primitive_kind() == Some(*kind),
            (Shape::Struct(fields), Self::Struct(values)) => {
                fields.len() == values.len()
                    && fields
                        .iter()
                        .zip(values)
                        .all(|(f, v)| v.conforms_to(&f.shape))
            }
            (Shape::List(elem), Self::List(values)) => values.iter().all(|v| v.conforms_to(elem)),
            (Shape::Array { elem, count }, Self::Array(values)) => {
                values.len() == *count as usize && values.iter().all(|v| v.conforms_to(elem))
            }
            (Shape::Map { key, elem }, Self::Map(entries)) => entries
                .iter()
                .all(|(k, v)| k.conforms_to(key) && v.conforms_to(elem)),
            (Shape::Pointer(elem), Self::Pointer(target)) => {
                target.as_deref().map_or(true, |v| v.conforms_to(elem))
            }
            _ => false,
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Any signed integer kind, widened.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) | Self::I64(v) => Some(*v),
            Self::I8(v) => Some(i64::from(*v)),
            Self::I16(v) => Some(i64::from(*v)),
            Self::I32(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    /// Any unsigned integer kind, widened.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint(v) | Self::U64(v) | Self::Uintptr(v) => Some(*v),
            Self::U8(v) => Some(u64::from(*v)),
            Self::U16(v) => Some(u64::from(*v)),
            Self::U32(v) => Some(u64::from(*v)),
            _ => None,
        }
    }

    /// Either float kind, widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as list or array elements.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) | Self::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Follow a pointer; `None` if nil or not a pointer.
    pub fn deref(&self) -> Option<&Value> {
        match self {
            Self::Pointer(target) => target.as_deref(),
            _ => None,
        }
    }

    /// Look up a map entry by key.
    pub fn map_get(&self, key: &Value) -> Option<&Value> {
        match self {
            Self::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Insert or replace a map entry. Returns `false` if not a map.
    pub fn map_insert(&mut self, key: Value, value: Value) -> bool {
        match self {
            Self::Map(entries) => {
                match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(entry) => entry.1 = value,
                    None => entries.push((key, value)),
                }
                true
            }
            _ => false,
        }
    }
}

// Conversion traits
macro_rules! impl_from_primitive {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        }
    };
}

impl_from_primitive!(bool, Bool);
impl_from_primitive!(i8, I8);
impl_from_primitive!(i16, I16);
impl_from_primitive!(i32, I32);
impl_from_primitive!(i64, I64);
impl_from_primitive!(u8, U8);
impl_from_primitive!(u16, U16);
impl_from_primitive!(u32, U32);
impl_from_primitive!(u64, U64);
impl_from_primitive!(f32, F32);
impl_from_primitive!(f64, F64);
impl_from_primitive!(Complex<f32>, Complex64);
impl_from_primitive!(Complex<f64>, Complex128);
impl_from_primitive!(String, String);
impl_from_primitive!(serde_json::Value, Any);

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Self::Int(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Self::Uint(v as u64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        Self::Pointer(v.map(|inner| Box::new(inner.into())))
    }
}
