// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Native type descriptors.
//!
//! Rust has no runtime reflection, so types describe themselves through
//! [`Reflect`]. Structs get an implementation from `#[derive(Reflect)]`;
//! std scalars, collections and smart pointers are covered here.
//!
//! [`NativeKind`] is deliberately wider than what the schema can express:
//! function pointers, channel endpoints, raw pointers and trait objects
//! describe themselves too, so the encoder can reject them with a precise
//! error instead of the program failing to compile far from the call site.

use crate::kind::PrimitiveKind;
use crate::schema::Visibility;
use crate::value::Complex;
use std::any::type_name;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;
use std::sync::mpsc::{Receiver, Sender, SyncSender};
use std::sync::Arc;

/// Descriptor of a native type: a display name plus its kind.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    name: Cow<'static, str>,
    kind: NativeKind,
}

impl TypeInfo {
    pub fn new(name: impl Into<Cow<'static, str>>, kind: NativeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Descriptor of `T`.
    pub fn of<T: Reflect + ?Sized>() -> Self {
        T::type_info()
    }

    /// A dynamic-interface layer whose concrete type is known.
    pub fn dynamic(name: impl Into<Cow<'static, str>>, concrete: TypeInfo) -> Self {
        Self::new(
            name,
            NativeKind::Interface {
                methods: Vec::new(),
                concrete: Some(Box::new(concrete)),
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &NativeKind {
        &self.kind
    }
}

/// Closed set of native kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeKind {
    Scalar(PrimitiveKind),
    Array { elem: Box<TypeInfo>, len: usize },
    Slice(Box<TypeInfo>),
    Map { key: Box<TypeInfo>, value: Box<TypeInfo> },
    Pointer(Box<TypeInfo>),
    Struct(Vec<FieldInfo>),
    /// Trait object. Without methods it is an untyped value; `concrete` is
    /// set when the dynamic type behind it is known.
    Interface {
        methods: Vec<&'static str>,
        concrete: Option<Box<TypeInfo>>,
    },
    Func,
    Chan(Box<TypeInfo>),
    UnsafePointer,
}

impl NativeKind {
    /// Kind name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scalar(kind) => kind.name(),
            Self::Array { .. } => "array",
            Self::Slice(_) => "slice",
            Self::Map { .. } => "map",
            Self::Pointer(_) => "ptr",
            Self::Struct(_) => "struct",
            Self::Interface { .. } => "interface",
            Self::Func => "func",
            Self::Chan(_) => "chan",
            Self::UnsafePointer => "unsafe pointer",
        }
    }
}

/// A struct field as declared.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub name: Cow<'static, str>,
    pub visibility: Visibility,
    pub tag: Cow<'static, str>,
    pub ty: TypeInfo,
    /// Flattened into the parent (`#[shape(flatten)]`).
    pub embedded: bool,
}

impl FieldInfo {
    /// Exported, untagged, not embedded.
    pub fn new(name: impl Into<Cow<'static, str>>, ty: TypeInfo) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Exported,
            tag: Cow::Borrowed(""),
            ty,
            embedded: false,
        }
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<Cow<'static, str>>) -> Self {
        self.tag = tag.into();
        self
    }

    #[must_use]
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }
}

/// Types that can describe their own layout.
pub trait Reflect {
    fn type_info() -> TypeInfo;
}

/// Values that can describe their type; the argument of [`crate::encode`].
///
/// Implemented for every [`Reflect`] type, for materialized instances, and
/// for boxed `dyn Describe` values (a dynamic-interface layer).
pub trait Describe {
    fn describe(&self) -> TypeInfo;
}

impl<T: Reflect + ?Sized> Describe for T {
    fn describe(&self) -> TypeInfo {
        T::type_info()
    }
}

impl Describe for Box<dyn Describe> {
    fn describe(&self) -> TypeInfo {
        TypeInfo::dynamic(type_name::<Self>(), (**self).describe())
    }
}

impl Describe for crate::Instance {
    fn describe(&self) -> TypeInfo {
        self.type_info()
    }
}

macro_rules! impl_reflect_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::new(type_name::<$ty>(), NativeKind::Scalar(PrimitiveKind::$kind))
                }
            }
        )*
    };
}

impl_reflect_scalar! {
    bool => Bool,
    isize => Int,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    usize => Uint,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    f32 => Float32,
    f64 => Float64,
    Complex<f32> => Complex64,
    Complex<f64> => Complex128,
    String => String,
    serde_json::Value => Any,
}

impl<T: Reflect> Reflect for Vec<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(type_name::<Self>(), NativeKind::Slice(Box::new(T::type_info())))
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(type_name::<Self>(), NativeKind::Slice(Box::new(T::type_info())))
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn type_info() -> TypeInfo {
        TypeInfo::new(
            type_name::<Self>(),
            NativeKind::Array {
                elem: Box::new(T::type_info()),
                len: N,
            },
        )
    }
}

impl<K: Reflect, V: Reflect, S> Reflect for HashMap<K, V, S> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(
            type_name::<Self>(),
            NativeKind::Map {
                key: Box::new(K::type_info()),
                value: Box::new(V::type_info()),
            },
        )
    }
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(
            type_name::<Self>(),
            NativeKind::Map {
                key: Box::new(K::type_info()),
                value: Box::new(V::type_info()),
            },
        )
    }
}

macro_rules! impl_reflect_pointer {
    ($($wrapper:ident),*) => {
        $(
            impl<T: Reflect + ?Sized> Reflect for $wrapper<T> {
                fn type_info() -> TypeInfo {
                    let target = Box::new(T::type_info());
                    TypeInfo::new(type_name::<Self>(), NativeKind::Pointer(target))
                }
            }
        )*
    };
}

impl_reflect_pointer!(Box, Rc, Arc);

impl<T: Reflect> Reflect for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(type_name::<Self>(), NativeKind::Pointer(Box::new(T::type_info())))
    }
}

impl<T: Reflect + ?Sized> Reflect for &T {
    fn type_info() -> TypeInfo {
        TypeInfo::new(type_name::<Self>(), NativeKind::Pointer(Box::new(T::type_info())))
    }
}

impl<T: Reflect + ?Sized> Reflect for &mut T {
    fn type_info() -> TypeInfo {
        TypeInfo::new(type_name::<Self>(), NativeKind::Pointer(Box::new(T::type_info())))
    }
}

// Unsupported kinds. They describe themselves so encode can name them.

impl<T: ?Sized> Reflect for *const T {
    fn type_info() -> TypeInfo {
        TypeInfo::new(type_name::<Self>(), NativeKind::UnsafePointer)
    }
}

impl<T: ?Sized> Reflect for *mut T {
    fn type_info() -> TypeInfo {
        TypeInfo::new(type_name::<Self>(), NativeKind::UnsafePointer)
    }
}

macro_rules! impl_reflect_fn {
    ($($arg:ident),*) => {
        impl<R $(, $arg)*> Reflect for fn($($arg),*) -> R {
            fn type_info() -> TypeInfo {
                TypeInfo::new(type_name::<Self>(), NativeKind::Func)
            }
        }
    };
}

impl_reflect_fn!();
impl_reflect_fn!(A);
impl_reflect_fn!(A, B);
impl_reflect_fn!(A, B, C);

macro_rules! impl_reflect_chan {
    ($($chan:ident),*) => {
        $(
            impl<T: Reflect> Reflect for $chan<T> {
                fn type_info() -> TypeInfo {
                    TypeInfo::new(type_name::<Self>(), NativeKind::Chan(Box::new(T::type_info())))
                }
            }
        )*
    };
}

impl_reflect_chan!(Sender, SyncSender, Receiver);

impl Reflect for dyn std::error::Error + Send + Sync {
    fn type_info() -> TypeInfo {
        TypeInfo::new(
            type_name::<Self>(),
            NativeKind::Interface {
                methods: vec!["source"],
                concrete: None,
            },
        )
    }
}

impl Reflect for dyn std::fmt::Debug + Send + Sync {
    fn type_info() -> TypeInfo {
        TypeInfo::new(
            type_name::<Self>(),
            NativeKind::Interface {
                methods: vec!["fmt"],
                concrete: None,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_descriptors() {
        assert_eq!(
            TypeInfo::of::<isize>().kind(),
            &NativeKind::Scalar(PrimitiveKind::Int)
        );
        assert!(TypeInfo::of::<String>().name().ends_with("String"));
        assert_eq!(TypeInfo::of::<serde_json::Value>().kind().name(), "any");
    }

    #[test]
    fn test_nested_descriptors() {
        let info = TypeInfo::of::<HashMap<String, Vec<[u8; 4]>>>();
        let NativeKind::Map { key, value } = info.kind() else {
            panic!("expected map, got {:?}", info.kind());
        };
        assert_eq!(key.kind(), &NativeKind::Scalar(PrimitiveKind::String));
        let NativeKind::Slice(elem) = value.kind() else {
            panic!("expected slice");
        };
        assert!(matches!(elem.kind(), NativeKind::Array { len: 4, .. }));
    }

    #[test]
    fn test_pointer_family() {
        for info in [
            TypeInfo::of::<Box<u8>>(),
            TypeInfo::of::<Option<u8>>(),
            TypeInfo::of::<Rc<u8>>(),
            TypeInfo::of::<Arc<u8>>(),
            TypeInfo::of::<&'static u8>(),
        ] {
            assert_eq!(info.kind().name(), "ptr");
        }
    }

    #[test]
    fn test_unsupported_descriptors() {
        assert_eq!(TypeInfo::of::<fn(u8) -> u8>().kind(), &NativeKind::Func);
        assert_eq!(TypeInfo::of::<*const u8>().kind().name(), "unsafe pointer");
        assert_eq!(TypeInfo::of::<Sender<u8>>().kind().name(), "chan");
        assert_eq!(
            TypeInfo::of::<Box<dyn std::error::Error + Send + Sync>>()
                .kind()
                .name(),
            "ptr"
        );
    }

    #[test]
    fn test_boxed_describe_is_dynamic_layer() {
        let boxed: Box<dyn Describe> = Box::new(7u16);
        let info = boxed.describe();
        let NativeKind::Interface { concrete, .. } = info.kind() else {
            panic!("expected interface layer");
        };
        assert_eq!(
            concrete.as_deref().map(TypeInfo::kind),
            Some(&NativeKind::Scalar(PrimitiveKind::Uint16))
        );
    }
}
