// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # protostruct - portable struct shapes
//!
//! Encode the *shape* of a Rust struct (field names, order, visibility,
//! raw tags and nested composite structure) into a portable [`Struct`]
//! schema, send it anywhere serde can, and later rebuild an equivalent
//! dynamic type plus a zero-valued [`Instance`] from the schema alone.
//! No field values travel with the schema.
//!
//! ## Quick Start
//!
//! ```rust
//! use protostruct::Reflect;
//!
//! #[derive(Reflect)]
//! pub struct Sample {
//!     #[shape(tag = r#"json:"v""#)]
//!     pub value: String,
//!     pub readings: Vec<i64>,
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = protostruct::encode_type(&Sample::type_info())?;
//! let wire = serde_json::to_string(&schema)?;
//!
//! // ...on the other side
//! let schema: protostruct::Struct = serde_json::from_str(&wire)?;
//! let mut instance = protostruct::new(&schema)?;
//! instance.populate_json(r#"{"v":"hello","readings":[1,2]}"#)?;
//! assert_eq!(instance.get::<String>("value")?, "hello");
//! # Ok(())
//! # }
//! ```
//!
//! ## Data flow
//!
//! ```text
//! native type --Reflect--> TypeInfo --encode--> Struct (schema)
//!                                                  |
//!                                     serde / any transport
//!                                                  |
//! Instance <--zero value-- Shape <--materialize-- Struct
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Reflect`] | Native type descriptor, derivable for structs |
//! | [`Struct`] | Schema root: ordered fields |
//! | [`Shape`] | Materialized type |
//! | [`Instance`] | Shape plus an owned value tree |
//! | [`DecodeLimits`] | Bounds for materializing untrusted schemas |

// Allow the derive macro to work inside this crate's tests
extern crate self as protostruct;

/// Decoder limits and defaults.
pub mod config;
/// Schema -> materialized shape.
mod decode;
/// Native descriptor -> schema.
mod encode;
/// Error types.
pub mod error;
/// Materialized instances.
pub mod instance;
/// JSON population and serialization.
mod json;
/// Primitive and container kind tables.
pub mod kind;
/// Native type descriptors.
pub mod reflect;
/// Portable schema model.
pub mod schema;
/// Materialized types.
pub mod shape;
/// Struct tag lookup.
pub mod tag;
/// Dynamic values.
pub mod value;


pub use config::DecodeLimits;
pub use encode::encode_type;
pub use error::{DecodeError, EncodeError, InstanceError, PopulateError};
pub use instance::{FromValue, Instance};
pub use kind::{ContainerKind, PrimitiveKind};
pub use reflect::{Describe, FieldInfo, NativeKind, Reflect, TypeInfo};
pub use schema::{Container, Field, Primitive, Struct, Type, TypeVariant, Visibility};
pub use shape::{Shape, ShapeField};
pub use tag::StructTag;
pub use value::{Complex, Value};

#[cfg(feature = "derive")]
pub use protostruct_codegen::Reflect; // Derive macro (for #[derive(protostruct::Reflect)])

use std::panic::{catch_unwind, AssertUnwindSafe};

/// Encode the struct type of `value`.
///
/// Only the type is inspected; field values are never read. Outer pointer
/// and dynamic layers (`Box<T>`, `Option<T>`, `Box<dyn Describe>`) are
/// unwrapped first.
///
/// # Errors
///
/// [`EncodeError::NotAStruct`] if the unwrapped type is not a struct,
/// [`EncodeError::UnsupportedKind`] if any field type (at any depth) is a
/// function, channel, raw pointer, trait object with methods or flattened
/// field.
pub fn encode<T: Describe + ?Sized>(value: &T) -> Result<Struct, EncodeError> {
    encode_type(&value.describe())
}

/// Materialize `schema` into a zero-valued instance with default limits.
///
/// # Errors
///
/// A [`DecodeError`] locating the first malformed node.
pub fn new(schema: &Struct) -> Result<Instance, DecodeError> {
    new_with_limits(schema, &DecodeLimits::default())
}

/// Materialize `schema` under explicit limits.
///
/// Any panic escaping construction, and any failure to allocate the zero
/// value, is reported as [`DecodeError::Construction`]; no partially built
/// instance is returned.
pub fn new_with_limits(schema: &Struct, limits: &DecodeLimits) -> Result<Instance, DecodeError> {
    let result = catch_unwind(AssertUnwindSafe(|| {
        let shape = decode::materialize(schema, limits)?;
        Instance::try_new(shape).map_err(|err| DecodeError::Construction {
            path: String::new(),
            message: format!("cannot allocate zero value: {}", err),
        })
    }));

    match result {
        Ok(Ok(instance)) => {
            log::debug!(
                "[PROTOSTRUCT] materialized struct with {} fields",
                schema.len()
            );
            Ok(instance)
        }
        Ok(Err(err)) => {
            log::debug!("[PROTOSTRUCT] decode failed: {}", err);
            Err(err)
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "type construction panicked".to_string());
            log::debug!("[PROTOSTRUCT] construction fault: {}", message);
            Err(DecodeError::Construction {
                path: String::new(),
                message,
            })
        }
    }
}
