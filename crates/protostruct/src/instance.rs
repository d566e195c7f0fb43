// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Materialized instance: a shape plus an owned value tree.

use crate::error::InstanceError;
use crate::reflect::TypeInfo;
use crate::shape::{Shape, ShapeField};
use crate::tag::StructTag;
use crate::value::{Complex, Value};
use std::collections::TryReserveError;
use std::sync::Arc;

/// A zero-initialized (then possibly populated) value of a materialized
/// struct shape.
///
/// The shape is shared (`Arc`), the value is owned: clones are independent
/// instances of the same type.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    shape: Arc<Shape>,
    value: Value,
}

impl Instance {
    /// Zero-valued instance of `shape`.
    pub fn new(shape: Arc<Shape>) -> Self {
        let value = shape.zero_value();
        Self { shape, value }
    }

    /// Zero-valued instance of `shape`, or an error if its storage cannot
    /// be allocated.
    pub fn try_new(shape: Arc<Shape>) -> Result<Self, TryReserveError> {
        let value = shape.try_zero_value()?;
        Ok(Self { shape, value })
    }

    /// Wrap an existing value, checking it against `shape`.
    pub fn from_value(shape: Arc<Shape>, value: Value) -> Result<Self, InstanceError> {
        if !value.conforms_to(&shape) {
            return Err(InstanceError::TypeMismatch {
                expected: shape.to_string(),
                got: value.kind_name().to_string(),
            });
        }
        Ok(Self { shape, value })
    }

    /// Get the materialized type.
    pub fn shape(&self) -> &Arc<Shape> {
        &self.shape
    }

    /// Get the underlying value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Get mutable reference to value.
    ///
    /// Writes through this reference are not shape-checked; prefer
    /// [`set`](Self::set) for single fields.
    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    /// Into inner value.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Describe the materialized type, e.g. to encode it again.
    pub fn type_info(&self) -> TypeInfo {
        self.shape.type_info()
    }

    /// Get a field value by name, converted.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, InstanceError> {
        T::from_value(self.field(name)?)
    }

    /// Set a field value by name.
    ///
    /// The value must conform to the field's shape.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), InstanceError> {
        let index = self.index_of(name)?;
        let value = value.into();

        let field_shape = &self.struct_fields()?[index].shape;
        if !value.conforms_to(field_shape) {
            return Err(InstanceError::TypeMismatch {
                expected: field_shape.to_string(),
                got: value.kind_name().to_string(),
            });
        }

        *self.slot_mut(index)? = value;
        Ok(())
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Result<&Value, InstanceError> {
        let index = self.index_of(name)?;
        match &self.value {
            Value::Struct(values) => values
                .get(index)
                .ok_or_else(|| InstanceError::FieldNotFound(name.to_string())),
            _ => Err(InstanceError::NotAStruct),
        }
    }

    /// Get mutable field by name.
    pub fn field_mut(&mut self, name: &str) -> Result<&mut Value, InstanceError> {
        let index = self.index_of(name)?;
        self.slot_mut(index)
    }

    /// Find the field whose tag has `key:"<tag_name>..."`.
    ///
    /// Only the name part of the tag value (up to the first comma) is
    /// compared.
    pub fn field_by_tag(&self, key: &str, tag_name: &str) -> Result<&Value, InstanceError> {
        let index = self
            .struct_fields()?
            .iter()
            .position(|f| {
                StructTag::new(&f.tag)
                    .lookup(key)
                    .is_some_and(|v| v.split(',').next() == Some(tag_name))
            })
            .ok_or_else(|| InstanceError::FieldNotFound(format!("{}:{:?}", key, tag_name)))?;

        match &self.value {
            Value::Struct(values) => values
                .get(index)
                .ok_or_else(|| InstanceError::FieldNotFound(tag_name.to_string())),
            _ => Err(InstanceError::NotAStruct),
        }
    }

    /// Iterate over fields in declared order.
    pub fn fields(&self) -> impl Iterator<Item = (&ShapeField, &Value)> {
        let shape_fields = self.shape.fields().unwrap_or_default();
        let values: &[Value] = match &self.value {
            Value::Struct(values) => values,
            _ => &[],
        };
        shape_fields.iter().zip(values)
    }

    fn struct_fields(&self) -> Result<&[ShapeField], InstanceError> {
        self.shape.fields().ok_or(InstanceError::NotAStruct)
    }

    fn index_of(&self, name: &str) -> Result<usize, InstanceError> {
        self.struct_fields()?
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| InstanceError::FieldNotFound(name.to_string()))
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut Value, InstanceError> {
        match &mut self.value {
            Value::Struct(values) => values
                .get_mut(index)
                .ok_or_else(|| InstanceError::FieldNotFound(index.to_string())),
            _ => Err(InstanceError::NotAStruct),
        }
    }
}

/// Trait for converting from a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, InstanceError>;
}

macro_rules! impl_from_value {
    ($ty:ty, $variant:ident, $name:expr) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self, InstanceError> {
                match value {
                    Value::$variant(v) => Ok(v.clone()),
                    other => Err(InstanceError::TypeMismatch {
                        expected: $name.to_string(),
                        got: other.kind_name().to_string(),
                    }),
                }
            }
        }
    };
}

impl_from_value!(bool, Bool, "bool");
impl_from_value!(i8, I8, "int8");
impl_from_value!(i16, I16, "int16");
impl_from_value!(i32, I32, "int32");
impl_from_value!(i64, I64, "int64");
impl_from_value!(u8, U8, "uint8");
impl_from_value!(u16, U16, "uint16");
impl_from_value!(u32, U32, "uint32");
impl_from_value!(u64, U64, "uint64");
impl_from_value!(f32, F32, "float32");
impl_from_value!(f64, F64, "float64");
impl_from_value!(Complex<f32>, Complex64, "complex64");
impl_from_value!(Complex<f64>, Complex128, "complex128");
impl_from_value!(String, String, "string");
impl_from_value!(serde_json::Value, Any, "any");

/// Platform-sized integers are carried as 64-bit; narrowing is checked.
macro_rules! impl_from_sized {
    ($ty:ty, $name:expr, $($variant:ident),+) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self, InstanceError> {
                let mismatch = |got: &str| InstanceError::TypeMismatch {
                    expected: $name.to_string(),
                    got: got.to_string(),
                };
                match value {
                    $(Value::$variant(v))|+ => {
                        <$ty>::try_from(*v).map_err(|_| mismatch(&v.to_string()))
                    }
                    other => Err(mismatch(other.kind_name())),
                }
            }
        }
    };
}

impl_from_sized!(isize, "int", Int);
impl_from_sized!(usize, "uint", Uint, Uintptr);

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, InstanceError> {
        Ok(value.clone())
    }
}
