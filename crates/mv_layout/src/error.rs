use alloc::boxed::Box;

use thiserror::Error;

// -----------------------------------------------------------------------------
// Malformed

/// Why a descriptor cannot be laid out.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Malformed {
    #[error("alignment {0} is not a power of two")]
    AlignNotPowerOfTwo(usize),

    #[error("size {size} is not a multiple of alignment {align} for an array element")]
    SizeNotMultipleOfAlign { size: usize, align: usize },

    #[error("type has unknown size")]
    UnknownSize,

    #[error("field `{0}` is declared twice")]
    DuplicateField(Box<str>),

    #[error("`{0}` is not a valid field name")]
    InvalidFieldName(Box<str>),

    #[error("size overflows `isize`")]
    Overflow,

    #[error("target pointer size {pointer_size} or max alignment {max_align} is invalid")]
    InvalidTarget { pointer_size: usize, max_align: usize },
}

// -----------------------------------------------------------------------------
// LayoutError

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LayoutError {
    #[error("malformed descriptor `{ty}`: {reason}")]
    MalformedDescriptor { ty: Box<str>, reason: Malformed },

    #[error("field `{path}` of `{ty}` is ambiguous: {count} embedded fields promote it at depth {depth}")]
    AmbiguousField {
        ty: Box<str>,
        path: Box<str>,
        depth: u32,
        count: usize,
    },

    #[error("field `{path}` is reached through embedded pointer `{via}` and has no static offset")]
    IndirectFieldOffset { path: Box<str>, via: Box<str> },

    #[error("no field `{path}` in `{ty}`")]
    UnknownField { ty: Box<str>, path: Box<str> },
}

impl LayoutError {
    #[cold]
    #[inline(never)]
    pub(crate) fn malformed(ty: &str, reason: Malformed) -> Self {
        log::debug!("rejected descriptor `{ty}`: {reason}");
        LayoutError::MalformedDescriptor {
            ty: ty.into(),
            reason,
        }
    }

    #[cold]
    #[inline(never)]
    pub(crate) fn ambiguous(ty: &str, path: &str, depth: u32, count: usize) -> Self {
        log::debug!("rejected descriptor `{ty}`: `{path}` is ambiguous at depth {depth}");
        LayoutError::AmbiguousField {
            ty: ty.into(),
            path: path.into(),
            depth,
            count,
        }
    }
}
