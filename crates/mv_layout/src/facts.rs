use alloc::boxed::Box;

use foldhash::fast::FixedState;
use hashbrown::HashMap;
use serde::Serialize;

use crate::LayoutError;

/// A fixed hash seed, so that maps hash identically across runs.
pub(crate) const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x6D76_4C61_796F_7574);

pub(crate) type PathMap = HashMap<Box<str>, PathEntry, FixedState>;

// -----------------------------------------------------------------------------
// FieldLayout

/// Placement of one field: offset within the outer type, size and alignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldLayout {
    pub(crate) name: Box<str>,
    pub(crate) type_name: Box<str>,
    pub(crate) offset: usize,
    pub(crate) size: usize,
    pub(crate) align: usize,
    pub(crate) anonymous: bool,
    pub(crate) indirect: bool,
}

impl FieldLayout {
    /// The field's own name, without any embedding prefix.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Byte offset from the start of the outer type.
    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Byte size of the slot, one word for indirect fields.
    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub const fn align(&self) -> usize {
        self.align
    }

    #[inline]
    pub const fn is_anonymous_embed(&self) -> bool {
        self.anonymous
    }

    #[inline]
    pub const fn is_indirect(&self) -> bool {
        self.indirect
    }
}

// -----------------------------------------------------------------------------
// PathEntry

/// Where a field path leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) enum Slot {
    /// Statically placed.
    Static(FieldLayout),
    /// Behind the embedded pointer `via`, known only after a dereference.
    Indirect { via: Box<str> },
    /// Promoted by `count` embedded fields at the same `depth`.
    Ambiguous { depth: u32, count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct PathEntry {
    pub(crate) slot: Slot,
    /// Promotion depth of a bare name, `None` for dotted paths.
    pub(crate) depth: Option<u32>,
}

// -----------------------------------------------------------------------------
// LayoutFacts

/// Size, alignment and field offsets derived from a
/// [`TypeDescriptor`](crate::TypeDescriptor).
///
/// Field paths are either a bare name (declared directly or promoted from
/// an embedded field) or a dotted path through embedded fields, like `"T.c"`.
///
/// # Examples
///
/// ```
/// use mv_layout::{FieldDescriptor, Primitive, Target, TypeDescriptor, LayoutCalculator};
///
/// let x = TypeDescriptor::structure("x", [
///     FieldDescriptor::named("a", Primitive::Int64),
///     FieldDescriptor::named("b", Primitive::Bool),
///     FieldDescriptor::named("c", Primitive::String),
/// ]);
///
/// let facts = LayoutCalculator::new(Target::LP64).compute(&x).unwrap();
/// assert_eq!((facts.size(), facts.align()), (32, 8));
/// assert_eq!(facts.field_offset("c"), Ok(16));
/// assert_eq!(facts.field("c").unwrap().size(), 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutFacts {
    pub(crate) name: Box<str>,
    pub(crate) size: usize,
    pub(crate) align: usize,
    pub(crate) fields: Box<[FieldLayout]>,
    pub(crate) paths: PathMap,
}

impl LayoutFacts {
    /// Returns the name of the described type.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total size, including trailing padding.
    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub const fn align(&self) -> usize {
        self.align
    }

    /// Returns the directly declared fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &[FieldLayout] {
        &self.fields
    }

    /// Returns an iterator over the directly declared fields in **declaration order**.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &FieldLayout> {
        self.fields.iter()
    }

    /// Returns `true` if `path` names a field, with or without a static offset.
    #[inline]
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains_key(path)
    }

    /// Returns the placement of the field at `path`.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::UnknownField`] if no field has this path.
    /// - [`LayoutError::IndirectFieldOffset`] if the field is reached through
    ///   an embedded pointer.
    /// - [`LayoutError::AmbiguousField`] if a dotted path leads into a name
    ///   that an embedded type promotes twice, like `"I.x"` when `I` embeds
    ///   two structs that both declare `x`.
    pub fn field(&self, path: &str) -> Result<&FieldLayout, LayoutError> {
        match self.paths.get(path).map(|entry| &entry.slot) {
            Some(Slot::Static(field)) => Ok(field),
            Some(Slot::Indirect { via }) => Err(LayoutError::IndirectFieldOffset {
                path: path.into(),
                via: via.clone(),
            }),
            Some(Slot::Ambiguous { depth, count }) => Err(LayoutError::AmbiguousField {
                ty: self.name.clone(),
                path: path.into(),
                depth: *depth,
                count: *count,
            }),
            None => Err(LayoutError::UnknownField {
                ty: self.name.clone(),
                path: path.into(),
            }),
        }
    }

    /// Returns the byte offset of the field at `path`.
    ///
    /// # Errors
    ///
    /// Same as [`field`](Self::field).
    #[inline]
    pub fn field_offset(&self, path: &str) -> Result<usize, LayoutError> {
        self.field(path).map(FieldLayout::offset)
    }
}
