// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Portable schema model.
//!
//! ```text
//! Struct    { fields: [Field] }
//! Field     { name, visibility, tag (raw), type: Type }
//! Type      { oneof primitive | struct | container }
//! Primitive { kind }
//! Container { kind, elem, key (map only), count (array only) }
//! ```
//!
//! Kinds are kept as raw wire integers so that values produced by a newer
//! or hostile peer survive deserialization and are rejected by the decoder
//! with a precise error rather than by the transport.

use crate::error::DecodeError;
use crate::kind::{ContainerKind, PrimitiveKind};
use serde::{Deserialize, Serialize};

/// Encoded record type: an ordered list of fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Struct {
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Struct {
    /// Create a struct schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declared order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Field visibility marker.
///
/// Unexported fields keep their slot in the layout even though no public
/// API can populate them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Exported,
    Unexported,
}

/// A struct field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    /// Opaque metadata, passed through byte-for-byte.
    #[serde(default)]
    pub tag: String,
    #[serde(default, rename = "type")]
    pub ty: Type,
}

impl Field {
    /// Create an exported field with an empty tag.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Exported,
            tag: String::new(),
            ty,
        }
    }

    /// Set visibility.
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Set raw tag text.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }
}

/// Tagged union over the three node variants.
///
/// `variant == None` is the empty oneof: representable on the wire,
/// rejected by the decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Type {
    pub variant: Option<TypeVariant>,
}

/// Populated oneof arm of a [`Type`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeVariant {
    Primitive(Primitive),
    Struct(Struct),
    Container(Box<Container>),
}

impl Type {
    /// Empty oneof.
    pub fn empty() -> Self {
        Self { variant: None }
    }

    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self {
            variant: Some(TypeVariant::Primitive(Primitive::new(kind))),
        }
    }

    pub fn structure(s: Struct) -> Self {
        Self {
            variant: Some(TypeVariant::Struct(s)),
        }
    }

    pub fn container(c: Container) -> Self {
        Self {
            variant: Some(TypeVariant::Container(Box::new(c))),
        }
    }

    /// The populated arm, or `EmptyType` at `path`.
    pub fn variant(&self, path: &str) -> Result<&TypeVariant, DecodeError> {
        self.variant.as_ref().ok_or_else(|| DecodeError::EmptyType {
            path: path.to_string(),
        })
    }

    pub fn as_primitive(&self) -> Option<&Primitive> {
        match &self.variant {
            Some(TypeVariant::Primitive(p)) => Some(p),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match &self.variant {
            Some(TypeVariant::Struct(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match &self.variant {
            Some(TypeVariant::Container(c)) => Some(c),
            _ => None,
        }
    }
}

/// Scalar node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Primitive {
    /// Raw [`PrimitiveKind`] wire value.
    pub kind: u32,
}

impl Primitive {
    pub fn new(kind: PrimitiveKind) -> Self {
        Self { kind: kind.wire() }
    }

    /// Decoded kind, or `UnknownPrimitiveKind` at `path`.
    pub fn kind(&self, path: &str) -> Result<PrimitiveKind, DecodeError> {
        PrimitiveKind::try_from(self.kind).map_err(|kind| DecodeError::UnknownPrimitiveKind {
            path: path.to_string(),
            kind,
        })
    }
}

/// Composite node wrapping one or two element types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Raw [`ContainerKind`] wire value.
    pub kind: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elem: Option<Type>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Type>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl Container {
    pub fn map(key: Type, elem: Type) -> Self {
        Self {
            kind: ContainerKind::Map.wire(),
            elem: Some(elem),
            key: Some(key),
            count: None,
        }
    }

    pub fn slice(elem: Type) -> Self {
        Self {
            kind: ContainerKind::Slice.wire(),
            elem: Some(elem),
            key: None,
            count: None,
        }
    }

    pub fn array(elem: Type, count: u32) -> Self {
        Self {
            kind: ContainerKind::Array.wire(),
            elem: Some(elem),
            key: None,
            count: Some(count),
        }
    }

    pub fn pointer(elem: Type) -> Self {
        Self {
            kind: ContainerKind::Pointer.wire(),
            elem: Some(elem),
            key: None,
            count: None,
        }
    }

    /// Validate kind and sub-field presence.
    ///
    /// `key` must be present iff the kind is map, `count` iff array (a zero
    /// count on other kinds is tolerated as "absent"), `elem` always.
    pub fn check(&self, path: &str) -> Result<ContainerKind, DecodeError> {
        let kind = ContainerKind::try_from(self.kind).map_err(|kind| {
            DecodeError::UnknownContainerKind {
                path: path.to_string(),
                kind,
            }
        })?;

        if self.elem.is_none() {
            return Err(DecodeError::MissingElem {
                path: path.to_string(),
            });
        }

        match (kind, self.key.is_some()) {
            (ContainerKind::Map, false) => {
                return Err(DecodeError::MissingKey {
                    path: path.to_string(),
                })
            }
            (ContainerKind::Array | ContainerKind::Pointer | ContainerKind::Slice, true) => {
                return Err(DecodeError::UnexpectedKey {
                    path: path.to_string(),
                    kind,
                })
            }
            _ => {}
        }

        match (kind, self.count) {
            (ContainerKind::Array, None) => Err(DecodeError::MissingCount {
                path: path.to_string(),
            }),
            (ContainerKind::Map | ContainerKind::Pointer | ContainerKind::Slice, Some(count))
                if count != 0 =>
            {
                Err(DecodeError::UnexpectedCount {
                    path: path.to_string(),
                    kind,
                    count,
                })
            }
            _ => Ok(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_check_accepts_well_formed() {
        let string = Type::primitive(PrimitiveKind::String);
        assert_eq!(
            Container::map(string.clone(), string.clone()).check("m"),
            Ok(ContainerKind::Map)
        );
        assert_eq!(
            Container::array(string.clone(), 0).check("a"),
            Ok(ContainerKind::Array)
        );
        let mut slice = Container::slice(string);
        slice.count = Some(0);
        assert_eq!(slice.check("s"), Ok(ContainerKind::Slice));
    }

    #[test]
    fn test_container_check_rejects_malformed() {
        let int = Type::primitive(PrimitiveKind::Int);

        let mut map = Container::map(int.clone(), int.clone());
        map.key = None;
        assert!(matches!(map.check("m"), Err(DecodeError::MissingKey { .. })));

        let mut array = Container::array(int.clone(), 3);
        array.count = None;
        assert!(matches!(array.check("a"), Err(DecodeError::MissingCount { .. })));

        let mut ptr = Container::pointer(int.clone());
        ptr.key = Some(int.clone());
        assert!(matches!(ptr.check("p"), Err(DecodeError::UnexpectedKey { .. })));

        let mut slice = Container::slice(int.clone());
        slice.count = Some(4);
        assert!(matches!(
            slice.check("s"),
            Err(DecodeError::UnexpectedCount { count: 4, .. })
        ));

        let mut slice = Container::slice(int);
        slice.elem = None;
        assert!(matches!(slice.check("s"), Err(DecodeError::MissingElem { .. })));

        let mut bogus = Container::pointer(Type::empty());
        bogus.kind = 18;
        assert!(matches!(
            bogus.check("c"),
            Err(DecodeError::UnknownContainerKind { kind: 18, .. })
        ));
    }

    #[test]
    fn test_type_json_shape() {
        let ty = Type::container(Container::array(Type::primitive(PrimitiveKind::Int), 3));
        let json = serde_json::to_string(&ty).expect("serialize");
        assert_eq!(
            json,
            r#"{"container":{"kind":17,"elem":{"primitive":{"kind":2}},"count":3}}"#
        );

        let empty: Type = serde_json::from_str("null").expect("deserialize");
        assert_eq!(empty, Type::empty());
    }

    #[test]
    fn test_field_defaults_from_json() {
        let field: Field =
            serde_json::from_str(r#"{"name":"v","type":{"primitive":{"kind":24}}}"#)
                .expect("deserialize");
        assert_eq!(field.visibility, Visibility::Exported);
        assert!(field.tag.is_empty());
        assert_eq!(
            field.ty.as_primitive().map(|p| p.kind),
            Some(PrimitiveKind::String.wire())
        );
    }
}
