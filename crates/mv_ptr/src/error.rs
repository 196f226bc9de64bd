use thiserror::Error;

// -----------------------------------------------------------------------------
// InvalidBounds

/// The reason a [`RawView`](crate::RawView) could not be constructed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidBounds {
    #[error("length {len} exceeds capacity {capacity}")]
    LengthExceedsCapacity { len: usize, capacity: usize },

    #[error("element stride must be non-zero")]
    ZeroStride,

    #[error("null base address with non-zero capacity {0}")]
    NullBase(usize),

    #[error("capacity {capacity} with stride {stride} overflows `isize`")]
    Overflow { capacity: usize, stride: usize },
}

// -----------------------------------------------------------------------------
// ViewError

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ViewError {
    #[error("invalid view bounds: {0}")]
    InvalidBounds(InvalidBounds),

    #[error("byte span of {span} bytes is not a multiple of stride {stride}")]
    IncompatibleStride { span: usize, stride: usize },

    #[error("sub-view at {start} with length {len} exceeds capacity {capacity}")]
    OutOfBounds {
        start: usize,
        len: usize,
        capacity: usize,
    },
}

impl From<InvalidBounds> for ViewError {
    #[inline]
    fn from(value: InvalidBounds) -> Self {
        ViewError::InvalidBounds(value)
    }
}

impl ViewError {
    /// Logs the rejection and hands the error back, for use in `Err(..)` position.
    #[cold]
    #[inline(never)]
    pub(crate) fn reject(self) -> Self {
        log::trace!("raw view rejected: {self}");
        self
    }
}
