// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Kind constants and the primitive kind table.
//!
//! Wire values follow the ordinal numbering used by the first encoders of
//! this schema format, so schemas stay interoperable:
//!
//! ```text
//! bool=1 int=2 int8=3 int16=4 int32=5 int64=6
//! uint=7 uint8=8 uint16=9 uint32=10 uint64=11 uintptr=12
//! float32=13 float64=14 complex64=15 complex128=16
//! array=17 any=20 map=21 ptr=22 slice=23 string=24
//! ```
//!
//! Values 18 (chan), 19 (func) and 25 (struct) are never emitted as a
//! primitive or container kind.

use crate::value::{Complex, Value};
use std::fmt;

/// Scalar kinds representable by a `Primitive` schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum PrimitiveKind {
    Bool = 1,
    /// Platform-sized signed integer (`isize`).
    Int = 2,
    Int8 = 3,
    Int16 = 4,
    Int32 = 5,
    Int64 = 6,
    /// Platform-sized unsigned integer (`usize`).
    Uint = 7,
    Uint8 = 8,
    Uint16 = 9,
    Uint32 = 10,
    Uint64 = 11,
    /// Integer wide enough to hold an address.
    Uintptr = 12,
    Float32 = 13,
    Float64 = 14,
    Complex64 = 15,
    Complex128 = 16,
    /// Untyped value; materialized as a `serde_json::Value`.
    Any = 20,
    String = 24,
}

impl PrimitiveKind {
    /// Every primitive kind, in wire order.
    pub const ALL: [PrimitiveKind; 18] = [
        Self::Bool,
        Self::Int,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Uint,
        Self::Uint8,
        Self::Uint16,
        Self::Uint32,
        Self::Uint64,
        Self::Uintptr,
        Self::Float32,
        Self::Float64,
        Self::Complex64,
        Self::Complex128,
        Self::Any,
        Self::String,
    ];

    /// Wire value.
    pub const fn wire(self) -> u32 {
        self as u32
    }

    /// Kind name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::Any => "any",
            Self::String => "string",
        }
    }

    /// Row of this kind in [`KIND_TABLE`] (and position in [`Self::ALL`]).
    pub const fn index(self) -> usize {
        match self {
            Self::Bool => 0,
            Self::Int => 1,
            Self::Int8 => 2,
            Self::Int16 => 3,
            Self::Int32 => 4,
            Self::Int64 => 5,
            Self::Uint => 6,
            Self::Uint8 => 7,
            Self::Uint16 => 8,
            Self::Uint32 => 9,
            Self::Uint64 => 10,
            Self::Uintptr => 11,
            Self::Float32 => 12,
            Self::Float64 => 13,
            Self::Complex64 => 14,
            Self::Complex128 => 15,
            Self::Any => 16,
            Self::String => 17,
        }
    }

    /// Canonical sample type for this kind.
    pub fn sample(self) -> &'static KindEntry {
        &KIND_TABLE[self.index()]
    }

    /// Zero value of the canonical sample type.
    pub fn zero(self) -> Value {
        (self.sample().zero)()
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Int
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Uint
                | Self::Uint8
                | Self::Uint16
                | Self::Uint32
                | Self::Uint64
                | Self::Uintptr
        )
    }
}

impl TryFrom<u32> for PrimitiveKind {
    type Error = u32;

    fn try_from(wire: u32) -> Result<Self, Self::Error> {
        lookup(wire).map(|entry| entry.kind).ok_or(wire)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Composite kinds representable by a `Container` schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ContainerKind {
    /// Fixed-size array (`[T; N]`).
    Array = 17,
    /// Key/value map.
    Map = 21,
    /// Nullable indirection (`Option<Box<T>>`).
    Pointer = 22,
    /// Dynamically-sized list (`Vec<T>`).
    Slice = 23,
}

impl ContainerKind {
    /// Wire value.
    pub const fn wire(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Map => "map",
            Self::Pointer => "ptr",
            Self::Slice => "slice",
        }
    }
}

impl TryFrom<u32> for ContainerKind {
    type Error = u32;

    fn try_from(wire: u32) -> Result<Self, Self::Error> {
        match wire {
            17 => Ok(Self::Array),
            21 => Ok(Self::Map),
            22 => Ok(Self::Pointer),
            23 => Ok(Self::Slice),
            other => Err(other),
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the primitive kind table.
#[derive(Debug)]
pub struct KindEntry {
    /// The kind this row describes.
    pub kind: PrimitiveKind,
    /// Rust type a value of this kind materializes as.
    pub rust_type: &'static str,
    zero: fn() -> Value,
}

/// Process-wide primitive kind table, in [`PrimitiveKind::ALL`] order.
pub static KIND_TABLE: [KindEntry; 18] = [
    KindEntry {
        kind: PrimitiveKind::Bool,
        rust_type: "bool",
        zero: || Value::Bool(false),
    },
    KindEntry {
        kind: PrimitiveKind::Int,
        rust_type: "isize",
        zero: || Value::Int(0),
    },
    KindEntry {
        kind: PrimitiveKind::Int8,
        rust_type: "i8",
        zero: || Value::I8(0),
    },
    KindEntry {
        kind: PrimitiveKind::Int16,
        rust_type: "i16",
        zero: || Value::I16(0),
    },
    KindEntry {
        kind: PrimitiveKind::Int32,
        rust_type: "i32",
        zero: || Value::I32(0),
    },
    KindEntry {
        kind: PrimitiveKind::Int64,
        rust_type: "i64",
        zero: || Value::I64(0),
    },
    KindEntry {
        kind: PrimitiveKind::Uint,
        rust_type: "usize",
        zero: || Value::Uint(0),
    },
    KindEntry {
        kind: PrimitiveKind::Uint8,
        rust_type: "u8",
        zero: || Value::U8(0),
    },
    KindEntry {
        kind: PrimitiveKind::Uint16,
        rust_type: "u16",
        zero: || Value::U16(0),
    },
    KindEntry {
        kind: PrimitiveKind::Uint32,
        rust_type: "u32",
        zero: || Value::U32(0),
    },
    KindEntry {
        kind: PrimitiveKind::Uint64,
        rust_type: "u64",
        zero: || Value::U64(0),
    },
    KindEntry {
        kind: PrimitiveKind::Uintptr,
        rust_type: "usize",
        zero: || Value::Uintptr(0),
    },
    KindEntry {
        kind: PrimitiveKind::Float32,
        rust_type: "f32",
        zero: || Value::F32(0.0),
    },
    KindEntry {
        kind: PrimitiveKind::Float64,
        rust_type: "f64",
        zero: || Value::F64(0.0),
    },
    KindEntry {
        kind: PrimitiveKind::Complex64,
        rust_type: "Complex<f32>",
        zero: || Value::Complex64(Complex::default()),
    },
    KindEntry {
        kind: PrimitiveKind::Complex128,
        rust_type: "Complex<f64>",
        zero: || Value::Complex128(Complex::default()),
    },
    KindEntry {
        kind: PrimitiveKind::Any,
        rust_type: "serde_json::Value",
        zero: || Value::Any(serde_json::Value::Null),
    },
    KindEntry {
        kind: PrimitiveKind::String,
        rust_type: "String",
        zero: || Value::String(String::new()),
    },
];

/// Look up a table row by wire value.
pub fn lookup(wire: u32) -> Option<&'static KindEntry> {
    KIND_TABLE.iter().find(|entry| entry.kind.wire() == wire)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_all_order() {
        for (index, (entry, kind)) in KIND_TABLE.iter().zip(PrimitiveKind::ALL).enumerate() {
            assert_eq!(entry.kind, kind);
            assert_eq!(kind.index(), index, "{kind}");
            assert!(std::ptr::eq(kind.sample(), entry));
        }
    }

    #[test]
    fn test_wire_roundtrip() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::try_from(kind.wire()), Ok(kind));
        }
        for kind in [
            ContainerKind::Array,
            ContainerKind::Map,
            ContainerKind::Pointer,
            ContainerKind::Slice,
        ] {
            assert_eq!(ContainerKind::try_from(kind.wire()), Ok(kind));
        }
    }

    #[test]
    fn test_unknown_wire_values() {
        for wire in [0, 17, 18, 19, 21, 25, 26, 999] {
            assert_eq!(PrimitiveKind::try_from(wire), Err(wire));
        }
        for wire in [0, 1, 20, 24, 25] {
            assert_eq!(ContainerKind::try_from(wire), Err(wire));
        }
    }

    #[test]
    fn test_zero_values_match_kind() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(kind.zero().primitive_kind(), Some(kind), "{kind}");
            assert!(kind.zero().is_zero());
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(PrimitiveKind::Int.to_string(), "int");
        assert_eq!(PrimitiveKind::Complex128.name(), "complex128");
        assert_eq!(ContainerKind::Pointer.to_string(), "ptr");
        assert_eq!(PrimitiveKind::Uintptr.sample().rust_type, "usize");
    }
}
