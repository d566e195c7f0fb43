// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Native type -> schema -> instance round trips.
//!
//! An instance materialized from a schema must accept and re-serialize any
//! JSON document exactly like the native type the schema was taken from.

use protostruct::{
    Container, ContainerKind, DecodeError, EncodeError, Field, PrimitiveKind, Reflect, Struct,
    Type, TypeVariant,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default, Reflect, Serialize, Deserialize)]
pub struct Nested {
    #[shape(tag = r#"json:"value""#)]
    #[serde(rename = "value", default)]
    pub value: String,
}

#[derive(Debug, Default, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    #[shape(tag = r#"json:"v""#)]
    #[serde(rename = "v")]
    pub value: String,
    #[shape(tag = r#"json:"map""#)]
    pub map: BTreeMap<String, String>,
    #[shape(tag = r#"json:"nested""#)]
    pub nested: Nested,
    #[shape(tag = r#"json:"nested_ptr""#)]
    pub nested_ptr: Option<Box<Nested>>,
    #[shape(tag = r#"json:"slice""#)]
    pub slice: Vec<isize>,
    #[shape(tag = r#"json:"array""#)]
    pub array: [isize; 3],
}

/// Serialize `doc` through the native type and through a materialized
/// instance of its schema.
fn both_ways(doc: &str) -> (String, String) {
    let native: Record = serde_json::from_str(doc).expect("native decode");
    let native_out = serde_json::to_string(&native).expect("native encode");

    let schema = protostruct::encode_type(&Record::type_info()).expect("encode schema");
    let mut instance = protostruct::new(&schema).expect("materialize");
    instance.populate_json(doc).expect("populate");
    let dynamic_out = serde_json::to_string(&instance).expect("instance encode");

    (native_out, dynamic_out)
}

#[test]
fn test_concrete_scenario() {
    let doc = r#"{"v":"hello","map":{"k":"v"},"nested":{"value":"d"},"nested_ptr":{"value":"p"},"slice":[1,4,8],"array":[1,2,3]}"#;
    let (native, dynamic) = both_ways(doc);
    assert_eq!(dynamic, native);
    assert_eq!(dynamic, doc);
}

#[test]
fn test_partial_documents_match_native() {
    for doc in [
        "{}",
        r#"{"v":"only"}"#,
        r#"{"nested_ptr":null,"slice":[]}"#,
        r#"{"map":{"b":"2","a":"1"},"nested":{}}"#,
    ] {
        let (native, dynamic) = both_ways(doc);
        assert_eq!(dynamic, native, "{doc}");
    }
}

#[derive(Reflect)]
pub struct Ordered {
    pub zeta: u8,
    pub alpha: u8,
    pub mid: Vec<String>,
    pub beta: bool,
}

#[test]
fn test_order_preservation() {
    let schema = protostruct::encode_type(&Ordered::type_info()).expect("encode");
    let instance = protostruct::new(&schema).expect("materialize");
    let again = protostruct::encode(&instance).expect("re-encode");

    assert_eq!(again, schema);
    assert_eq!(
        again.field_names().collect::<Vec<_>>(),
        ["zeta", "alpha", "mid", "beta"]
    );
}

#[test]
fn test_root_primitive_rejected() {
    let err = protostruct::encode(&7isize).expect_err("bare int");
    assert!(matches!(err, EncodeError::NotAStruct { kind: "int", .. }));
    assert!(err.to_string().contains("int"));
}

#[derive(Reflect)]
pub struct Lookup {
    pub index: HashMap<String, Vec<u8>>,
}

#[test]
fn test_independent_map_shapes() {
    let schema = protostruct::encode_type(&Lookup::type_info()).expect("encode");
    let instance = protostruct::new(&schema).expect("materialize");
    let again = protostruct::encode(&instance).expect("re-encode");

    let container = again.fields[0].ty.as_container().expect("map");
    assert_eq!(container.kind, ContainerKind::Map.wire());
    let key = container.key.as_ref().expect("key");
    let elem = container.elem.as_ref().expect("elem");
    assert_eq!(
        key.as_primitive().map(|p| p.kind),
        Some(PrimitiveKind::String.wire())
    );
    assert_eq!(
        elem.as_container().map(|c| c.kind),
        Some(ContainerKind::Slice.wire())
    );
    assert_ne!(key, elem);
}

#[test]
fn test_array_count_fidelity() {
    let schema = protostruct::encode_type(&Record::type_info()).expect("encode");
    let instance = protostruct::new(&schema).expect("materialize");
    let again = protostruct::encode(&instance).expect("re-encode");

    let array = again.field("array").and_then(|f| f.ty.as_container()).expect("array");
    assert_eq!(array.kind, ContainerKind::Array.wire());
    assert_eq!(array.count, Some(3));

    let slice = again.field("slice").and_then(|f| f.ty.as_container()).expect("slice");
    assert_eq!(slice.kind, ContainerKind::Slice.wire());
    assert_eq!(slice.count, None);
}

/// 1000 rows of 1100 bytes: more cells than the default limit when inline.
type Grid = [[u8; 1100]; 1000];

#[derive(Reflect)]
pub struct Inline {
    pub grid: Grid,
}

#[derive(Reflect)]
pub struct Indirect {
    pub boxed: Option<Box<Grid>>,
    pub rows: Vec<Grid>,
    pub named: HashMap<String, Grid>,
    pub spare: Option<Box<[u8; 600_000]>>,
    pub other: Option<Box<[u8; 600_000]>>,
}

#[test]
fn test_large_targets_behind_indirection() {
    let schema = protostruct::encode_type(&Inline::type_info()).expect("encode inline");
    let err = protostruct::new(&schema).expect_err("inline grid over limit");
    assert!(matches!(err, DecodeError::LimitExceeded { limit: "cells", .. }));

    let schema = protostruct::encode_type(&Indirect::type_info()).expect("encode indirect");
    let instance = protostruct::new(&schema).expect("materialize");
    assert_eq!(
        serde_json::to_string(&instance).expect("serialize"),
        r#"{"boxed":null,"rows":[],"named":{},"spare":null,"other":null}"#
    );
    assert_eq!(protostruct::encode(&instance).expect("re-encode"), schema);
}

#[test]
fn test_malformed_schema_contained() {
    let mut unknown = Type::primitive(PrimitiveKind::Int);
    unknown.variant = Some(TypeVariant::Primitive(protostruct::Primitive { kind: 42 }));
    let err = protostruct::new(&Struct::new(vec![Field::new("x", unknown)]))
        .expect_err("unknown kind");
    assert!(err.is_malformed());
    assert!(matches!(err, DecodeError::UnknownPrimitiveKind { kind: 42, .. }));

    let mut no_elem = Container::slice(Type::primitive(PrimitiveKind::Int));
    no_elem.elem = None;
    let err = protostruct::new(&Struct::new(vec![Field::new("s", Type::container(no_elem))]))
        .expect_err("missing elem");
    assert!(matches!(err, DecodeError::MissingElem { .. }));

    let mut huge = Type::primitive(PrimitiveKind::Uint8);
    for _ in 0..3 {
        huge = Type::container(Container::array(huge, u32::MAX));
    }
    let err = protostruct::new(&Struct::new(vec![Field::new("huge", huge)]))
        .expect_err("oversized");
    assert!(err.is_malformed(), "{err}");
}
