// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Materialized types.
//!
//! A [`Shape`] is the runtime stand-in for a type rebuilt from a schema. It
//! carries exactly what the schema carried (field order, names, visibility,
//! raw tags, nested structure) and knows how to produce its zero value.

use crate::kind::PrimitiveKind;
use crate::reflect::{FieldInfo, NativeKind, TypeInfo};
use crate::schema::Visibility;
use crate::value::Value;
use std::collections::TryReserveError;
use std::fmt;
use std::sync::Arc;

/// A materialized type.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Scalar of a fixed kind.
    Primitive(PrimitiveKind),
    /// Record with ordered fields.
    Struct(Vec<ShapeField>),
    /// Key/value map.
    Map { key: Arc<Shape>, elem: Arc<Shape> },
    /// Dynamically-sized list.
    List(Arc<Shape>),
    /// Fixed-size array.
    Array { elem: Arc<Shape>, count: u32 },
    /// Nullable indirection.
    Pointer(Arc<Shape>),
}

impl Shape {
    /// Check if this is a primitive shape.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Check if this is a struct shape.
    pub fn is_struct(&self) -> bool {
        matches!(self, Self::Struct(_))
    }

    /// Get fields if this is a struct.
    pub fn fields(&self) -> Option<&[ShapeField]> {
        match self {
            Self::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&ShapeField> {
        self.fields()?.iter().find(|f| f.name == name)
    }

    /// Get field index by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields()?.iter().position(|f| f.name == name)
    }

    /// Whether values of this shape can key a map.
    ///
    /// Lists and maps cannot; structs and arrays can when all their
    /// components can.
    pub fn is_comparable(&self) -> bool {
        match self {
            Self::Primitive(_) | Self::Pointer(_) => true,
            Self::Struct(fields) => fields.iter().all(|f| f.shape.is_comparable()),
            Self::Array { elem, .. } => elem.is_comparable(),
            Self::Map { .. } | Self::List(_) => false,
        }
    }

    /// Fresh zero value.
    ///
    /// Aborts if the allocation fails; shapes from untrusted schemas go
    /// through [`try_zero_value`](Self::try_zero_value).
    pub fn zero_value(&self) -> Value {
        match self {
            Self::Primitive(kind) => kind.zero(),
            Self::Struct(fields) => {
                Value::Struct(fields.iter().map(|f| f.shape.zero_value()).collect())
            }
            Self::Map { .. } => Value::Map(Vec::new()),
            Self::List(_) => Value::List(Vec::new()),
            Self::Array { elem, count } => {
                let elem_zero = elem.zero_value();
                Value::Array(vec![elem_zero; *count as usize])
            }
            Self::Pointer(_) => Value::Pointer(None),
        }
    }

    /// Fresh zero value, reporting allocation failure instead of aborting.
    ///
    /// Array storage is reserved before its element is built, so an
    /// oversized array fails before any of its cells exist.
    pub fn try_zero_value(&self) -> Result<Value, TryReserveError> {
        match self {
            Self::Struct(fields) => {
                let mut values = Vec::new();
                values.try_reserve_exact(fields.len())?;
                for field in fields {
                    values.push(field.shape.try_zero_value()?);
                }
                Ok(Value::Struct(values))
            }
            Self::Array { elem, count } => {
                let mut values = Vec::new();
                values.try_reserve_exact(*count as usize)?;
                // Built per element: cloning nested storage cannot fail softly.
                for _ in 0..*count {
                    values.push(elem.try_zero_value()?);
                }
                Ok(Value::Array(values))
            }
            _ => Ok(self.zero_value()),
        }
    }

    /// Describe this shape as a native type, so it can be encoded again.
    pub fn type_info(&self) -> TypeInfo {
        let kind = match self {
            Self::Primitive(kind) => NativeKind::Scalar(*kind),
            Self::Struct(fields) => NativeKind::Struct(
                fields
                    .iter()
                    .map(|f| {
                        FieldInfo::new(f.name.clone(), f.shape.type_info())
                            .with_visibility(f.visibility)
                            .with_tag(f.tag.clone())
                    })
                    .collect(),
            ),
            Self::Map { key, elem } => NativeKind::Map {
                key: Box::new(key.type_info()),
                value: Box::new(elem.type_info()),
            },
            Self::List(elem) => NativeKind::Slice(Box::new(elem.type_info())),
            Self::Array { elem, count } => NativeKind::Array {
                elem: Box::new(elem.type_info()),
                len: *count as usize,
            },
            Self::Pointer(elem) => NativeKind::Pointer(Box::new(elem.type_info())),
        };
        TypeInfo::new(self.to_string(), kind)
    }
}

/// Rust-like type expression, e.g. `struct { pub v: String, n: Vec<i64> }`.
impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => f.write_str(kind.sample().rust_type),
            Self::Struct(fields) => {
                if fields.is_empty() {
                    return f.write_str("struct {}");
                }
                f.write_str("struct { ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if field.visibility == Visibility::Exported {
                        f.write_str("pub ")?;
                    }
                    write!(f, "{}: {}", field.name, field.shape)?;
                }
                f.write_str(" }")
            }
            Self::Map { key, elem } => write!(f, "HashMap<{key}, {elem}>"),
            Self::List(elem) => write!(f, "Vec<{elem}>"),
            Self::Array { elem, count } => write!(f, "[{elem}; {count}]"),
            Self::Pointer(elem) => write!(f, "Option<Box<{elem}>>"),
        }
    }
}

/// A field of a struct shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeField {
    /// Field name.
    pub name: String,
    /// Exported/unexported marker.
    pub visibility: Visibility,
    /// Raw tag text.
    pub tag: String,
    /// Field type.
    pub shape: Arc<Shape>,
}

impl ShapeField {
    /// Create a new field.
    pub fn new(
        name: impl Into<String>,
        visibility: Visibility,
        tag: impl Into<String>,
        shape: Arc<Shape>,
    ) -> Self {
        Self {
            name: name.into(),
            visibility,
            tag: tag.into(),
            shape,
        }
    }

    pub fn is_exported(&self) -> bool {
        self.visibility == Visibility::Exported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prim(kind: PrimitiveKind) -> Arc<Shape> {
        Arc::new(Shape::Primitive(kind))
    }

    #[test]
    fn test_struct_lookup() {
        let shape = Shape::Struct(vec![
            ShapeField::new("x", Visibility::Exported, "", prim(PrimitiveKind::Uint32)),
            ShapeField::new("y", Visibility::Unexported, "", prim(PrimitiveKind::Float64)),
        ]);
        assert!(shape.is_struct());
        assert_eq!(shape.fields().map(<[_]>::len), Some(2));
        assert_eq!(shape.field_index("y"), Some(1));
        assert!(shape.field("z").is_none());
        assert!(!shape.field("y").expect("field y").is_exported());
    }

    #[test]
    fn test_zero_value() {
        let shape = Shape::Struct(vec![
            ShapeField::new(
                "arr",
                Visibility::Exported,
                "",
                Arc::new(Shape::Array {
                    elem: prim(PrimitiveKind::Int64),
                    count: 3,
                }),
            ),
            ShapeField::new(
                "ptr",
                Visibility::Exported,
                "",
                Arc::new(Shape::Pointer(prim(PrimitiveKind::String))),
            ),
        ]);

        let zero = shape.zero_value();
        assert_eq!(shape.try_zero_value().as_ref(), Ok(&zero));
        assert_eq!(
            zero,
            Value::Struct(vec![
                Value::Array(vec![Value::I64(0); 3]),
                Value::Pointer(None),
            ])
        );
        assert!(zero.conforms_to(&shape));
    }

    #[test]
    fn test_comparable() {
        assert!(Shape::Primitive(PrimitiveKind::Any).is_comparable());
        assert!(!Shape::List(prim(PrimitiveKind::Uint8)).is_comparable());
        let nested = Shape::Struct(vec![ShapeField::new(
            "m",
            Visibility::Exported,
            "",
            Arc::new(Shape::Map {
                key: prim(PrimitiveKind::String),
                elem: prim(PrimitiveKind::String),
            }),
        )]);
        assert!(!nested.is_comparable());
        assert!(Shape::Pointer(Arc::new(nested)).is_comparable());
    }

    #[test]
    fn test_display() {
        let shape = Shape::Struct(vec![
            ShapeField::new("v", Visibility::Exported, "", prim(PrimitiveKind::String)),
            ShapeField::new(
                "m",
                Visibility::Unexported,
                "",
                Arc::new(Shape::Map {
                    key: prim(PrimitiveKind::String),
                    elem: Arc::new(Shape::List(prim(PrimitiveKind::Int))),
                }),
            ),
        ]);
        assert_eq!(
            shape.to_string(),
            "struct { pub v: String, m: HashMap<String, Vec<isize>> }"
        );
    }
}
