// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for encoding, materialization and instance access.

use crate::kind::ContainerKind;
use std::fmt;

/// Encode failures. Every variant is terminal for the encode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The unwrapped root type is not a struct.
    NotAStruct {
        type_name: String,
        kind: &'static str,
    },
    /// A field or element type is in the unsupported set
    /// (func, chan, unsafe pointer, interface with methods, embedded field).
    UnsupportedKind {
        /// Dotted path to the offending field or element.
        path: String,
        type_name: String,
        kind: &'static str,
    },
    /// Fixed-size array longer than the wire `count` can carry.
    ArrayTooLong {
        path: String,
        type_name: String,
        len: usize,
    },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAStruct { type_name, kind } => {
                write!(f, "encode: requires a struct, got {} ({})", kind, type_name)
            }
            Self::UnsupportedKind {
                path,
                type_name,
                kind,
            } => write!(
                f,
                "encode: cannot encode type: {} (kind = {}) at {}",
                type_name, kind, path
            ),
            Self::ArrayTooLong {
                path,
                type_name,
                len,
            } => write!(
                f,
                "encode: array {} at {} has {} elements, more than u32::MAX",
                type_name, path, len
            ),
        }
    }
}

impl std::error::Error for EncodeError {}

/// Materialization failures.
///
/// Every variant means the schema is malformed; `Construction` is an
/// internal construction fault re-surfaced as an error. `path` locates the
/// offending node, e.g. `fields[2].type.elem`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A `Type` with no populated variant.
    EmptyType { path: String },
    UnknownPrimitiveKind { path: String, kind: u32 },
    UnknownContainerKind { path: String, kind: u32 },
    MissingElem { path: String },
    MissingKey { path: String },
    MissingCount { path: String },
    UnexpectedKey { path: String, kind: ContainerKind },
    UnexpectedCount {
        path: String,
        kind: ContainerKind,
        count: u32,
    },
    /// Field name empty, not an identifier, or duplicated.
    InvalidField {
        path: String,
        name: String,
        reason: &'static str,
    },
    /// A [`DecodeLimits`](crate::DecodeLimits) bound was exceeded.
    LimitExceeded {
        path: String,
        limit: &'static str,
        max: u64,
    },
    /// The schema passed validation but no type can be built from it.
    Construction { path: String, message: String },
}

impl DecodeError {
    /// Location of the offending node.
    pub fn path(&self) -> &str {
        match self {
            Self::EmptyType { path }
            | Self::UnknownPrimitiveKind { path, .. }
            | Self::UnknownContainerKind { path, .. }
            | Self::MissingElem { path }
            | Self::MissingKey { path }
            | Self::MissingCount { path }
            | Self::UnexpectedKey { path, .. }
            | Self::UnexpectedCount { path, .. }
            | Self::InvalidField { path, .. }
            | Self::LimitExceeded { path, .. }
            | Self::Construction { path, .. } => path,
        }
    }

    /// Always `true`: every decode failure is a malformed schema.
    pub fn is_malformed(&self) -> bool {
        true
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed schema at {}: ", self.path())?;
        match self {
            Self::EmptyType { .. } => write!(f, "type has no variant set"),
            Self::UnknownPrimitiveKind { kind, .. } => {
                write!(f, "unknown primitive kind {}", kind)
            }
            Self::UnknownContainerKind { kind, .. } => {
                write!(f, "unknown container kind {}", kind)
            }
            Self::MissingElem { .. } => write!(f, "container has no elem type"),
            Self::MissingKey { .. } => write!(f, "map has no key type"),
            Self::MissingCount { .. } => write!(f, "array has no count"),
            Self::UnexpectedKey { kind, .. } => write!(f, "{} must not have a key type", kind),
            Self::UnexpectedCount { kind, count, .. } => {
                write!(f, "{} must not have a count (got {})", kind, count)
            }
            Self::InvalidField { name, reason, .. } => {
                write!(f, "field {:?}: {}", name, reason)
            }
            Self::LimitExceeded { limit, max, .. } => {
                write!(f, "{} limit of {} exceeded", limit, max)
            }
            Self::Construction { message, .. } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Errors for [`Instance`](crate::Instance) field access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceError {
    FieldNotFound(String),
    TypeMismatch { expected: String, got: String },
    NotAStruct,
}

impl fmt::Display for InstanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldNotFound(name) => write!(f, "Field not found: {}", name),
            Self::TypeMismatch { expected, got } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, got)
            }
            Self::NotAStruct => write!(f, "Instance root is not a struct"),
        }
    }
}

impl std::error::Error for InstanceError {}

/// Errors while populating an instance from a JSON document.
#[derive(Debug)]
pub enum PopulateError {
    /// The document is not valid JSON.
    Syntax(serde_json::Error),
    TypeMismatch {
        path: String,
        expected: String,
        got: &'static str,
    },
    /// Number does not fit the target kind.
    OutOfRange {
        path: String,
        value: String,
        target: &'static str,
    },
    /// The target kind has no JSON representation.
    Unsupported { path: String, kind: &'static str },
    /// A map key string cannot be parsed as the key kind.
    InvalidMapKey { path: String, key: String },
    /// Storage for a newly populated value could not be allocated.
    Allocation {
        path: String,
        source: std::collections::TryReserveError,
    },
}

impl fmt::Display for PopulateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(err) => write!(f, "json: {}", err),
            Self::TypeMismatch {
                path,
                expected,
                got,
            } => write!(f, "json: cannot populate {} at {} from {}", expected, path, got),
            Self::OutOfRange {
                path,
                value,
                target,
            } => write!(f, "json: value {} at {} overflows {}", value, path, target),
            Self::Unsupported { path, kind } => {
                write!(f, "json: unsupported kind {} at {}", kind, path)
            }
            Self::InvalidMapKey { path, key } => {
                write!(f, "json: invalid map key {:?} at {}", key, path)
            }
            Self::Allocation { path, source } => {
                write!(f, "json: cannot allocate value at {}: {}", path, source)
            }
        }
    }
}

impl std::error::Error for PopulateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Syntax(err) => Some(err),
            Self::Allocation { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PopulateError {
    fn from(value: serde_json::Error) -> Self {
        Self::Syntax(value)
    }
}
