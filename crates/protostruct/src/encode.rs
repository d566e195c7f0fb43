// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Native descriptor -> schema.

use crate::error::EncodeError;
use crate::kind::PrimitiveKind;
use crate::reflect::{FieldInfo, NativeKind, TypeInfo};
use crate::schema::{Container, Field, Struct, Type};

/// Encode the struct described by `info`.
///
/// Outer pointer layers and dynamic-interface layers are peeled off first;
/// nested ones become explicit `Container` nodes.
pub fn encode_type(info: &TypeInfo) -> Result<Struct, EncodeError> {
    let root = unwrap_root(info);

    let NativeKind::Struct(fields) = root.kind() else {
        log::debug!(
            "[PROTOSTRUCT] encode rejected root {} (kind = {})",
            root.name(),
            root.kind().name()
        );
        return Err(EncodeError::NotAStruct {
            type_name: root.name().to_string(),
            kind: root.kind().name(),
        });
    };

    let encoded = encode_struct(fields, "")?;
    log::debug!(
        "[PROTOSTRUCT] encoded {} with {} fields",
        root.name(),
        encoded.len()
    );
    Ok(encoded)
}

fn unwrap_root(mut info: &TypeInfo) -> &TypeInfo {
    loop {
        match info.kind() {
            NativeKind::Pointer(elem) => info = elem,
            NativeKind::Interface {
                concrete: Some(concrete),
                ..
            } => info = concrete,
            _ => return info,
        }
    }
}

fn encode_struct(fields: &[FieldInfo], path: &str) -> Result<Struct, EncodeError> {
    let mut result = Struct::new(Vec::with_capacity(fields.len()));

    for field in fields {
        let field_path = if path.is_empty() {
            field.name.to_string()
        } else {
            format!("{}.{}", path, field.name)
        };

        if field.embedded {
            return Err(EncodeError::UnsupportedKind {
                path: field_path,
                type_name: field.ty.name().to_string(),
                kind: "embedded",
            });
        }

        let ty = encode_node(&field.ty, &field_path)?;
        result.fields.push(
            Field::new(field.name.clone(), ty)
                .with_visibility(field.visibility)
                .with_tag(field.tag.clone()),
        );
    }

    Ok(result)
}

fn encode_node(info: &TypeInfo, path: &str) -> Result<Type, EncodeError> {
    match info.kind() {
        NativeKind::Scalar(kind) => Ok(Type::primitive(*kind)),

        NativeKind::Interface {
            methods,
            concrete: _,
        } if methods.is_empty() => Ok(Type::primitive(PrimitiveKind::Any)),

        NativeKind::Array { elem, len } => {
            let count = u32::try_from(*len).map_err(|_| EncodeError::ArrayTooLong {
                path: path.to_string(),
                type_name: info.name().to_string(),
                len: *len,
            })?;
            let elem = encode_node(elem, &format!("{}[]", path))?;
            Ok(Type::container(Container::array(elem, count)))
        }

        NativeKind::Map { key, value } => {
            let key = encode_node(key, &format!("{}.key", path))?;
            let elem = encode_node(value, &format!("{}[]", path))?;
            Ok(Type::container(Container::map(key, elem)))
        }

        NativeKind::Pointer(elem) => {
            let elem = encode_node(elem, &format!("{}.*", path))?;
            Ok(Type::container(Container::pointer(elem)))
        }

        NativeKind::Slice(elem) => {
            let elem = encode_node(elem, &format!("{}[]", path))?;
            Ok(Type::container(Container::slice(elem)))
        }

        NativeKind::Struct(fields) => Ok(Type::structure(encode_struct(fields, path)?)),

        NativeKind::Interface { .. }
        | NativeKind::Func
        | NativeKind::Chan(_)
        | NativeKind::UnsafePointer => {
            log::debug!(
                "[PROTOSTRUCT] unsupported {} at {}",
                info.kind().name(),
                path
            );
            Err(EncodeError::UnsupportedKind {
                path: path.to_string(),
                type_name: info.name().to_string(),
                kind: info.kind().name(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ContainerKind;
    use crate::schema::Visibility;

    fn record(fields: Vec<FieldInfo>) -> TypeInfo {
        TypeInfo::new("Record", NativeKind::Struct(fields))
    }

    #[test]
    fn test_root_must_be_struct() {
        let err = encode_type(&TypeInfo::of::<isize>()).expect_err("isize is not a struct");
        assert!(matches!(err, EncodeError::NotAStruct { kind: "int", .. }));
        assert!(err.to_string().contains("int"));
    }

    #[test]
    fn test_root_pointer_layers_unwrapped() {
        let inner = record(vec![FieldInfo::new("a", TypeInfo::of::<bool>())]);
        let wrapped = TypeInfo::new(
            "Box<Option<Record>>",
            NativeKind::Pointer(Box::new(TypeInfo::new(
                "Option<Record>",
                NativeKind::Pointer(Box::new(inner.clone())),
            ))),
        );

        assert_eq!(
            encode_type(&wrapped).expect("encode"),
            encode_type(&inner).expect("encode")
        );
        assert_eq!(
            encode_type(&TypeInfo::dynamic("dyn", inner.clone())).expect("encode"),
            encode_type(&inner).expect("encode")
        );
    }

    #[test]
    fn test_nested_pointer_becomes_container() {
        let info = record(vec![FieldInfo::new("p", TypeInfo::of::<Option<u8>>())]);
        let schema = encode_type(&info).expect("encode");
        let container = schema.fields[0].ty.as_container().expect("container");
        assert_eq!(container.kind, ContainerKind::Pointer.wire());
        assert!(container.key.is_none());
        assert!(container.count.is_none());
    }

    #[test]
    fn test_fields_keep_metadata_and_order() {
        let info = record(vec![
            FieldInfo::new("zeta", TypeInfo::of::<String>()).with_tag(r#"json:"z""#),
            FieldInfo::new("alpha", TypeInfo::of::<i8>()).with_visibility(Visibility::Unexported),
        ]);
        let schema = encode_type(&info).expect("encode");
        assert_eq!(schema.field_names().collect::<Vec<_>>(), ["zeta", "alpha"]);
        assert_eq!(schema.fields[0].tag, r#"json:"z""#);
        assert_eq!(schema.fields[1].visibility, Visibility::Unexported);
    }

    #[test]
    fn test_unsupported_kinds_rejected() {
        let cases = [
            (TypeInfo::of::<fn() -> u8>(), "func"),
            (TypeInfo::of::<std::sync::mpsc::Sender<u8>>(), "chan"),
            (TypeInfo::of::<*mut u8>(), "unsafe pointer"),
            (
                TypeInfo::of::<dyn std::fmt::Debug + Send + Sync>(),
                "interface",
            ),
        ];
        for (ty, kind) in cases {
            let err = encode_type(&record(vec![FieldInfo::new("bad", ty)]))
                .expect_err("unsupported field");
            let EncodeError::UnsupportedKind { kind: k, path, .. } = &err else {
                panic!("unexpected error: {err}");
            };
            assert_eq!(*k, kind);
            assert_eq!(path, "bad");
        }
    }

    #[test]
    fn test_unsupported_deep_in_container() {
        let info = record(vec![FieldInfo::new(
            "callbacks",
            TypeInfo::of::<Vec<Option<fn(u8)>>>(),
        )]);
        let err = encode_type(&info).expect_err("func inside slice");
        assert!(matches!(
            err,
            EncodeError::UnsupportedKind { ref path, kind: "func", .. } if path == "callbacks[].*"
        ));
    }

    #[test]
    fn test_embedded_field_rejected() {
        let inner = record(vec![FieldInfo::new("a", TypeInfo::of::<bool>())]);
        let info = record(vec![FieldInfo::new("Inner", inner).embedded()]);
        assert!(matches!(
            encode_type(&info),
            Err(EncodeError::UnsupportedKind { kind: "embedded", .. })
        ));
    }

    #[test]
    fn test_empty_interface_is_any() {
        let any = TypeInfo::new(
            "dyn Any",
            NativeKind::Interface {
                methods: Vec::new(),
                concrete: None,
            },
        );
        let schema = encode_type(&record(vec![FieldInfo::new("x", any)])).expect("encode");
        assert_eq!(
            schema.fields[0].ty.as_primitive().map(|p| p.kind),
            Some(PrimitiveKind::Any.wire())
        );
    }
}
