use alloc::borrow::Cow;
use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

/// A shared, immutable reference to a [`TypeDescriptor`].
///
/// Descriptors are never mutated once built, so layout facts computed from
/// one stay valid for as long as it lives.
pub type TypeRef = Arc<TypeDescriptor>;

// -----------------------------------------------------------------------------
// TypeKind

/// The shape of a described type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeKind {
    /// A fixed-size value, e.g. `int64` or `bool`.
    ///
    /// `align` is capped by [`Target::max_align`](crate::Target::max_align).
    Scalar { size: usize, align: usize },
    /// A value made of `words` machine words, e.g. `int` (1), `string` (2)
    /// or a slice header (3). Sized by the target.
    Words { words: usize },
    /// A pointer to `pointee`, one machine word.
    Pointer { pointee: TypeRef },
    /// `len` consecutive `elem` values.
    Array { elem: TypeRef, len: usize },
    /// Fields in declaration order.
    Struct { fields: Vec<FieldDescriptor> },
    /// A declared type whose size is not known. Only usable behind a pointer.
    Opaque,
}

// -----------------------------------------------------------------------------
// TypeDescriptor

/// A static, introspectable description of a type.
///
/// # Examples
///
/// ```
/// use mv_layout::{FieldDescriptor, Primitive, TypeDescriptor};
///
/// let x = TypeDescriptor::structure("x", [
///     FieldDescriptor::named("a", Primitive::Int64),
///     FieldDescriptor::named("b", Primitive::Bool),
///     FieldDescriptor::named("c", Primitive::String),
/// ]);
///
/// assert_eq!(x.fields().len(), 3);
/// assert_eq!(x.fields()[2].ty().name(), "string");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    name: Cow<'static, str>,
    kind: TypeKind,
}

impl TypeDescriptor {
    #[inline]
    pub fn new(name: impl Into<Cow<'static, str>>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// A scalar of `size` bytes aligned to `align`.
    #[inline]
    pub fn scalar(name: impl Into<Cow<'static, str>>, size: usize, align: usize) -> Self {
        Self::new(name, TypeKind::Scalar { size, align })
    }

    /// A value of `words` machine words.
    #[inline]
    pub fn words(name: impl Into<Cow<'static, str>>, words: usize) -> Self {
        Self::new(name, TypeKind::Words { words })
    }

    /// A struct with `fields` in declaration order.
    pub fn structure(
        name: impl Into<Cow<'static, str>>,
        fields: impl IntoIterator<Item = FieldDescriptor>,
    ) -> Self {
        Self::new(
            name,
            TypeKind::Struct {
                fields: fields.into_iter().collect(),
            },
        )
    }

    /// `*pointee`.
    pub fn pointer(pointee: impl Into<TypeRef>) -> Self {
        let pointee = pointee.into();
        Self::new(format!("*{}", pointee.name), TypeKind::Pointer { pointee })
    }

    /// `[len]elem`.
    pub fn array(elem: impl Into<TypeRef>, len: usize) -> Self {
        let elem = elem.into();
        Self::new(format!("[{len}]{}", elem.name), TypeKind::Array { elem, len })
    }

    /// `[]elem`, a three-word slice header.
    pub fn slice(elem: impl Into<TypeRef>) -> Self {
        let elem = elem.into();
        Self::new(format!("[]{}", elem.name), TypeKind::Words { words: 3 })
    }

    /// A declared type of unknown size.
    #[inline]
    pub fn opaque(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, TypeKind::Opaque)
    }

    /// Returns the type name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub const fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Returns the fields in declaration order, empty for non-struct types.
    pub fn fields(&self) -> &[FieldDescriptor] {
        match &self.kind {
            TypeKind::Struct { fields } => fields.as_slice(),
            _ => &[],
        }
    }

    /// Returns `true` for [`TypeKind::Struct`].
    #[inline]
    pub const fn is_struct(&self) -> bool {
        matches!(self.kind, TypeKind::Struct { .. })
    }
}

// -----------------------------------------------------------------------------
// FieldDescriptor

/// A field of a struct descriptor.
///
/// - `anonymous`: the field is embedded and its own fields are promoted
///   to the outer type.
/// - `indirect`: the field holds a pointer to `ty`, so its slot is one word.
///
/// An embedded pointer (`anonymous && indirect`) still promotes names, but
/// the promoted fields have no static offset in the outer type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    name: Cow<'static, str>,
    ty: TypeRef,
    #[serde(default)]
    anonymous: bool,
    #[serde(default)]
    indirect: bool,
}

impl FieldDescriptor {
    /// A named field of type `ty`, held by value.
    #[inline]
    pub fn named(name: impl Into<Cow<'static, str>>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            anonymous: false,
            indirect: false,
        }
    }

    /// A named field holding a pointer to `ty`.
    #[inline]
    pub fn pointer(name: impl Into<Cow<'static, str>>, ty: impl Into<TypeRef>) -> Self {
        Self {
            indirect: true,
            ..Self::named(name, ty)
        }
    }

    /// An anonymous field embedding `ty` by value, named after the type
    /// without its package qualifier (`pkg.T` is named `T`).
    pub fn embed(ty: impl Into<TypeRef>) -> Self {
        let ty = ty.into();
        let name = match ty.name.rsplit_once('.') {
            Some((_, unqualified)) => Cow::Owned(unqualified.into()),
            None => ty.name.clone(),
        };
        Self {
            name,
            ty,
            anonymous: true,
            indirect: false,
        }
    }

    /// An anonymous field embedding a pointer to `ty`, named after the type.
    pub fn embed_ptr(ty: impl Into<TypeRef>) -> Self {
        Self {
            indirect: true,
            ..Self::embed(ty)
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field type, the pointee for indirect fields.
    #[inline]
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    #[inline]
    pub const fn is_anonymous_embed(&self) -> bool {
        self.anonymous
    }

    /// Returns `true` for an embedded pointer.
    #[inline]
    pub const fn is_indirect_embed(&self) -> bool {
        self.anonymous && self.indirect
    }

    /// Returns `true` if the slot holds a pointer, embedded or not.
    #[inline]
    pub const fn is_indirect(&self) -> bool {
        self.indirect
    }
}

// -----------------------------------------------------------------------------
// Primitive

/// Built-in types, sized per [`Target`](crate::Target).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Complex64,
    Complex128,
    Int,
    Uint,
    Uintptr,
    UnsafePointer,
    String,
}

impl Primitive {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Uintptr => "uintptr",
            Self::UnsafePointer => "unsafe.Pointer",
            Self::String => "string",
        }
    }

    pub const fn kind(self) -> TypeKind {
        let (size, align) = match self {
            Self::Bool | Self::Int8 | Self::Uint8 => (1, 1),
            Self::Int16 | Self::Uint16 => (2, 2),
            Self::Int32 | Self::Uint32 | Self::Float32 => (4, 4),
            Self::Int64 | Self::Uint64 | Self::Float64 => (8, 8),
            // Aligned like its float parts.
            Self::Complex64 => (8, 4),
            Self::Complex128 => (16, 8),
            Self::Int | Self::Uint | Self::Uintptr | Self::UnsafePointer => {
                return TypeKind::Words { words: 1 };
            }
            Self::String => return TypeKind::Words { words: 2 },
        };
        TypeKind::Scalar { size, align }
    }

    pub fn descriptor(self) -> TypeDescriptor {
        TypeDescriptor::new(self.name(), self.kind())
    }
}

impl From<Primitive> for TypeDescriptor {
    #[inline]
    fn from(value: Primitive) -> Self {
        value.descriptor()
    }
}

impl From<Primitive> for TypeRef {
    #[inline]
    fn from(value: Primitive) -> Self {
        Arc::new(value.descriptor())
    }
}
