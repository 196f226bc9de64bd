use core::fmt;
use core::marker::PhantomData;
use core::num::NonZeroUsize;
use core::ptr::NonNull;
use core::slice;

use crate::{InvalidBounds, ViewError};

// -----------------------------------------------------------------------------
// RawView

/// A bounds-carrying, type-erased alias over memory owned by someone else,
/// similar to `&'a [T]` with the element type replaced by a byte stride.
///
/// A view is `(base, stride, len, capacity)`: `len` elements are visible,
/// `capacity` elements are accessible through [`sub_view`](Self::sub_view).
/// It never allocates, frees or resizes the region; every derived view is a
/// new value sharing the same base allocation.
///
/// # Empty view
///
/// A view over a null base is only valid with zero capacity and is always
/// normalized to [`RawView::EMPTY`], whatever constructor produced it.
///
/// # type-erased
///
/// The view only knows the element stride. Reading elements through
/// [`as_slice`](Self::as_slice) or [`get`](Self::get) requires the caller
/// to name the element type and to vouch that the span is still live, so
/// those are `unsafe`. Building and narrowing views never dereferences.
///
/// # Examples
///
/// ```
/// use mv_ptr::RawView;
///
/// let a = [0i64, 1, 2, 3, 4, 5];
/// let view = RawView::from_slice(&a);
///
/// let window = view.sub_view(2, 3).unwrap();
/// assert_eq!(window.len(), 3);
/// assert_eq!(window.capacity(), 4);
/// assert_eq!(unsafe { window.as_slice::<i64>() }, &[2, 3, 4]);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawView<'a> {
    base: Option<NonNull<u8>>,
    stride: NonZeroUsize,
    len: usize,
    capacity: usize,
    _marker: PhantomData<&'a [u8]>,
}

impl<'a> RawView<'a> {
    /// The canonical empty view: null base, zero length and capacity.
    pub const EMPTY: Self = Self {
        base: None,
        stride: NonZeroUsize::MIN,
        len: 0,
        capacity: 0,
        _marker: PhantomData,
    };

    /// Creates a view of `len` visible elements out of `capacity` accessible
    /// ones, each `stride` bytes wide, starting at `base`.
    ///
    /// A null `base` with zero capacity yields [`RawView::EMPTY`].
    ///
    /// # Errors
    ///
    /// [`ViewError::InvalidBounds`] if `len > capacity`, `stride == 0`,
    /// `base` is null with a non-zero capacity, or `capacity * stride`
    /// overflows `isize`.
    ///
    /// The byte span `[base, base + capacity * stride)` is not checked against
    /// any allocation; the typed accessors carry that obligation.
    ///
    /// # Examples
    ///
    /// ```
    /// use mv_ptr::{InvalidBounds, RawView, ViewError};
    ///
    /// let a = [1u16, 2, 3, 4];
    /// let base = a.as_ptr().cast::<u8>();
    ///
    /// let view = RawView::new(base, 2, 2, 4).unwrap();
    /// assert_eq!(unsafe { view.as_slice::<u16>() }, &[1, 2]);
    ///
    /// let err = RawView::new(base, 2, 5, 4).unwrap_err();
    /// assert!(matches!(
    ///     err,
    ///     ViewError::InvalidBounds(InvalidBounds::LengthExceedsCapacity { .. })
    /// ));
    ///
    /// let empty = RawView::new(core::ptr::null(), 8, 0, 0).unwrap();
    /// assert_eq!(empty, RawView::EMPTY);
    /// ```
    pub fn new(
        base: *const u8,
        stride: usize,
        len: usize,
        capacity: usize,
    ) -> Result<Self, ViewError> {
        let Some(stride) = NonZeroUsize::new(stride) else {
            return Err(ViewError::from(InvalidBounds::ZeroStride).reject());
        };
        if len > capacity {
            return Err(ViewError::from(InvalidBounds::LengthExceedsCapacity { len, capacity }).reject());
        }
        match capacity.checked_mul(stride.get()) {
            Some(span) if span <= isize::MAX as usize => {}
            _ => {
                let stride = stride.get();
                return Err(ViewError::from(InvalidBounds::Overflow { capacity, stride }).reject());
            }
        }

        match NonNull::new(base.cast_mut()) {
            Some(base) => Ok(Self {
                base: Some(base),
                stride,
                len,
                capacity,
                _marker: PhantomData,
            }),
            None if capacity == 0 => Ok(Self::EMPTY),
            None => Err(ViewError::from(InvalidBounds::NullBase(capacity)).reject()),
        }
    }

    /// Creates a view over a slice, with `len == capacity == s.len()`.
    ///
    /// An empty slice yields [`RawView::EMPTY`]. Zero-sized `T` is
    /// rejected at compile time, its stride would be zero.
    #[inline]
    pub const fn from_slice<T>(s: &'a [T]) -> Self {
        Self::whole::<T>(NonNull::from_ref(s).cast(), s.len())
    }

    /// Creates a view over a mutable slice, so that
    /// [`as_mut_slice`](Self::as_mut_slice) may later write through it.
    #[inline]
    pub const fn from_mut_slice<T>(s: &'a mut [T]) -> Self {
        let len = s.len();
        Self::whole::<T>(NonNull::from_mut(s).cast(), len)
    }

    #[inline(always)]
    const fn whole<T>(base: NonNull<u8>, len: usize) -> Self {
        const { assert!(size_of::<T>() != 0, "zero-sized elements have no stride") };

        if len == 0 {
            return Self::EMPTY;
        }
        Self {
            base: Some(base),
            // SAFETY: asserted non-zero above.
            stride: unsafe { NonZeroUsize::new_unchecked(size_of::<T>()) },
            len,
            capacity: len,
            _marker: PhantomData,
        }
    }

    /// Returns the base address, `None` for the empty view.
    #[inline(always)]
    pub const fn base(&self) -> Option<NonNull<u8>> {
        self.base
    }

    /// Returns the base address as a raw pointer, null for the empty view.
    #[inline]
    pub const fn as_ptr(&self) -> *const u8 {
        match self.base {
            Some(base) => base.as_ptr(),
            None => core::ptr::null(),
        }
    }

    /// Returns the byte size of one element.
    #[inline(always)]
    pub const fn stride(&self) -> usize {
        self.stride.get()
    }

    /// Returns the number of visible elements.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of accessible elements.
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if no element is visible.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if this is the null-based [`RawView::EMPTY`].
    #[inline(always)]
    pub const fn is_null(&self) -> bool {
        self.base.is_none()
    }

    /// Byte span of the visible elements.
    #[inline(always)]
    pub const fn byte_len(&self) -> usize {
        // No overflow: `len <= capacity` and `capacity * stride` was checked.
        self.len * self.stride.get()
    }

    /// Byte span of the accessible elements.
    #[inline(always)]
    pub const fn byte_capacity(&self) -> usize {
        self.capacity * self.stride.get()
    }

    /// Returns a new view starting `start` elements in, showing `len` elements.
    ///
    /// The result keeps the rest of the accessible region:
    /// `capacity = self.capacity - start`, so `len` may be smaller than it.
    ///
    /// # Errors
    ///
    /// [`ViewError::OutOfBounds`] if `start + len > self.capacity()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mv_ptr::{RawView, ViewError};
    ///
    /// let a = [0u8, 1, 2, 3, 4];
    /// let view = RawView::from_slice(&a);
    ///
    /// let tail = view.sub_view(3, 1).unwrap();
    /// assert_eq!(tail.capacity(), 2);
    /// assert_eq!(unsafe { tail.as_slice::<u8>() }, &[3]);
    ///
    /// assert!(matches!(view.sub_view(3, 3), Err(ViewError::OutOfBounds { .. })));
    /// ```
    pub fn sub_view(self, start: usize, len: usize) -> Result<Self, ViewError> {
        match start.checked_add(len) {
            Some(end) if end <= self.capacity => {}
            _ => {
                let capacity = self.capacity;
                return Err(ViewError::OutOfBounds { start, len, capacity }.reject());
            }
        }

        let Some(base) = self.base else {
            // Only `start == len == 0` reaches here.
            return Ok(Self::EMPTY);
        };
        // Nothing is dereferenced yet, so the address may be computed freely.
        let Some(base) = NonNull::new(base.as_ptr().wrapping_byte_add(start * self.stride.get())) else {
            let capacity = self.capacity;
            return Err(ViewError::OutOfBounds { start, len, capacity }.reject());
        };

        Ok(Self {
            base: Some(base),
            stride: self.stride,
            len,
            capacity: self.capacity - start,
            _marker: PhantomData,
        })
    }

    /// Reinterprets the view as elements of `stride` bytes.
    ///
    /// The visible byte span must be an exact multiple of `stride`; the new
    /// capacity is the number of whole new elements in the accessible span.
    ///
    /// # Errors
    ///
    /// [`ViewError::IncompatibleStride`] if `stride` is zero or does not
    /// divide [`byte_len`](Self::byte_len).
    ///
    /// # Examples
    ///
    /// ```
    /// use mv_ptr::{RawView, ViewError};
    ///
    /// let a = [0u32; 3];
    /// let view = RawView::from_slice(&a);
    ///
    /// let halves = view.reinterpret(2).unwrap();
    /// assert_eq!((halves.len(), halves.capacity()), (6, 6));
    ///
    /// assert!(matches!(view.reinterpret(8), Err(ViewError::IncompatibleStride { .. })));
    /// ```
    pub fn reinterpret(self, stride: usize) -> Result<Self, ViewError> {
        let span = self.byte_len();
        let new_stride = match NonZeroUsize::new(stride) {
            Some(s) if span % s.get() == 0 => s,
            _ => return Err(ViewError::IncompatibleStride { span, stride }.reject()),
        };

        if self.base.is_none() {
            return Ok(Self::EMPTY);
        }

        Ok(Self {
            base: self.base,
            stride: new_stride,
            len: span / new_stride.get(),
            capacity: self.byte_capacity() / new_stride.get(),
            _marker: PhantomData,
        })
    }

    /// Check if the base address is aligned to type `T`.
    ///
    /// The empty view is aligned to everything.
    #[inline]
    pub fn is_aligned<T>(&self) -> bool {
        match self.base {
            Some(base) => base.cast::<T>().as_ptr().is_aligned(),
            None => true,
        }
    }

    /// Checks that `T` matches the stride and alignment of a non-empty view.
    ///
    /// Only active when `debug_assertions` and the `debug` feature are both enabled.
    #[cfg_attr(debug_assertions, track_caller)]
    #[cfg_attr(not(debug_assertions), inline(always))]
    pub fn debug_assert_element<T>(&self) {
        #[cfg(all(debug_assertions, feature = "debug"))]
        if self.base.is_some() {
            assert_eq!(
                self.stride.get(),
                size_of::<T>(),
                "view stride does not match the size of {}",
                core::any::type_name::<T>(),
            );
            assert!(
                self.is_aligned::<T>(),
                "view is not aligned. Address {:p} does not have alignment {} for type {}",
                self.as_ptr(),
                align_of::<T>(),
                core::any::type_name::<T>(),
            );
        }
    }

    /// Returns the visible elements as `&[T]`.
    ///
    /// # Safety
    ///
    /// - The span must lie within one allocation that stays live and
    ///   readable for `'a`. Views built from slices always do.
    /// - `size_of::<T>()` must equal [`stride`](Self::stride).
    /// - The base must be aligned for `T`.
    /// - Every visible element must be a valid `T`.
    #[inline]
    pub unsafe fn as_slice<T>(self) -> &'a [T] {
        self.debug_assert_element::<T>();
        match self.base {
            // SAFETY: the span is live for `'a`, the caller vouches for `T`.
            Some(base) => unsafe { slice::from_raw_parts(base.cast::<T>().as_ptr(), self.len) },
            None => &[],
        }
    }

    /// Returns the visible elements as `&mut [T]`.
    ///
    /// # Safety
    ///
    /// Same as [`as_slice`](Self::as_slice), and additionally:
    /// - the view must come from writable storage (e.g. [`from_mut_slice`](Self::from_mut_slice)),
    /// - no other reference into the visible span may be used while the result is alive.
    #[inline]
    pub unsafe fn as_mut_slice<T>(self) -> &'a mut [T] {
        self.debug_assert_element::<T>();
        match self.base {
            // SAFETY: see above, the caller guarantees exclusivity.
            Some(base) => unsafe { slice::from_raw_parts_mut(base.cast::<T>().as_ptr(), self.len) },
            None => Default::default(),
        }
    }

    /// Returns the visible element at `index`, or `None` when out of range.
    ///
    /// # Safety
    ///
    /// Same as [`as_slice`](Self::as_slice), for the element at `index`.
    #[inline]
    pub unsafe fn get<T>(self, index: usize) -> Option<&'a T> {
        if index >= self.len {
            return None;
        }
        self.debug_assert_element::<T>();
        let base = self.base?;
        // SAFETY: `index < len <= capacity`, inside the asserted span.
        Some(unsafe { base.byte_add(index * self.stride.get()).cast::<T>().as_ref() })
    }
}

impl<'a, T> From<&'a [T]> for RawView<'a> {
    #[inline]
    fn from(slice: &'a [T]) -> Self {
        Self::from_slice(slice)
    }
}

impl Default for RawView<'_> {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for RawView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawView")
            .field("base", &self.as_ptr())
            .field("stride", &self.stride)
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::RawView;
    use crate::{InvalidBounds, ViewError};

    fn sixteen() -> [isize; 16] {
        let mut a = [0isize; 16];
        a[3] = 3;
        a[9] = 9;
        a[11] = 11;
        a
    }

    #[test]
    fn window_exposes_extra_capacity() {
        let a = sixteen();
        let stride = size_of::<isize>();
        let p9 = unsafe { a.as_ptr().add(9) }.cast::<u8>();

        let five = RawView::new(p9, stride, 5, 5).unwrap();
        let three = five.sub_view(0, 3).unwrap();

        assert_eq!(three.len(), 3);
        assert_eq!(three.capacity(), 5);
        assert_eq!(unsafe { three.as_slice::<isize>() }, &[9, 0, 11]);

        let regrown = three.sub_view(0, 5).unwrap();
        assert_eq!(unsafe { regrown.as_slice::<isize>() }, &a[9..14]);
    }

    #[test]
    fn length_beyond_capacity_is_rejected() {
        let a = [0u8; 4];
        for (len, capacity) in [(1, 0), (5, 4), (usize::MAX, 4)] {
            let err = RawView::new(a.as_ptr(), 1, len, capacity).unwrap_err();
            assert_eq!(
                err,
                ViewError::InvalidBounds(InvalidBounds::LengthExceedsCapacity { len, capacity })
            );
        }
    }

    #[test]
    fn degenerate_constructions_are_rejected() {
        let a = [0u8; 4];
        let zero = RawView::new(a.as_ptr(), 0, 0, 0);
        assert_eq!(zero, Err(ViewError::InvalidBounds(InvalidBounds::ZeroStride)));

        let null = RawView::new(core::ptr::null(), 1, 0, 4);
        assert_eq!(null, Err(ViewError::InvalidBounds(InvalidBounds::NullBase(4))));

        let huge = RawView::new(a.as_ptr(), 2, 0, usize::MAX / 2 + 1);
        assert!(matches!(
            huge,
            Err(ViewError::InvalidBounds(InvalidBounds::Overflow { .. }))
        ));
    }

    #[test]
    fn views_are_built_without_touching_memory() {
        let base = core::ptr::without_provenance::<u8>(0x1000);
        let view = RawView::new(base, 8, 2, 4).unwrap();
        let tail = view.sub_view(2, 2).unwrap();

        assert_eq!(tail.as_ptr().addr(), 0x1010);
        assert_eq!((tail.len(), tail.capacity()), (2, 2));
        assert_eq!(tail.reinterpret(4).map(|v| v.len()), Ok(4));
    }

    #[test]
    fn sub_view_beyond_capacity_is_rejected() {
        let a = sixteen();
        let view = RawView::from_slice(&a[9..14]);

        assert!(view.sub_view(5, 0).is_ok());
        for (start, len) in [(0, 6), (5, 1), (3, 3), (usize::MAX, 2)] {
            assert_eq!(
                view.sub_view(start, len),
                Err(ViewError::OutOfBounds { start, len, capacity: 5 })
            );
        }
    }

    #[test]
    fn sub_view_moves_the_base() {
        let a = sixteen();
        let view = RawView::from_slice(&a);
        let tail = view.sub_view(11, 2).unwrap();

        assert_eq!(tail.as_ptr(), a[11..].as_ptr().cast::<u8>());
        assert_eq!(tail.capacity(), 5);
        assert_eq!(unsafe { tail.get::<isize>(0) }, Some(&11));
        assert_eq!(unsafe { tail.get::<isize>(2) }, None);
    }

    #[test]
    fn every_empty_construction_is_canonical() {
        let empty: [u64; 0] = [];
        let from_null = RawView::new(core::ptr::null(), 8, 0, 0).unwrap();

        assert_eq!(from_null, RawView::EMPTY);
        assert_eq!(RawView::from_slice(&empty), RawView::EMPTY);
        assert_eq!(RawView::EMPTY.sub_view(0, 0), Ok(RawView::EMPTY));
        assert_eq!(RawView::EMPTY.reinterpret(16), Ok(RawView::EMPTY));
        assert_eq!(RawView::default(), RawView::EMPTY);
        assert!(RawView::EMPTY.is_null());
        assert_eq!(unsafe { RawView::EMPTY.as_slice::<u8>() }, &[] as &[u8]);
    }

    #[test]
    fn empty_window_over_live_storage_keeps_its_base() {
        let a = [1u8, 2, 3];
        let end = RawView::from_slice(&a).sub_view(3, 0).unwrap();

        assert!(end.is_empty());
        assert!(!end.is_null());
        assert_ne!(end, RawView::EMPTY);
    }

    #[test]
    fn reinterpret_requires_divisible_span() {
        let a = [0u8; 12];
        let view = RawView::from_slice(&a).sub_view(0, 6).unwrap();

        let words = view.reinterpret(2).unwrap();
        assert_eq!((words.len(), words.capacity(), words.stride()), (3, 6, 2));

        let triples = view.reinterpret(3).unwrap();
        assert_eq!((triples.len(), triples.capacity()), (2, 4));

        assert_eq!(
            view.reinterpret(4),
            Err(ViewError::IncompatibleStride { span: 6, stride: 4 })
        );
        assert_eq!(
            view.reinterpret(0),
            Err(ViewError::IncompatibleStride { span: 6, stride: 0 })
        );
    }

    #[test]
    fn reinterpret_reads_the_same_bytes() {
        let a = [0x0102_0304u32, 0x0506_0708];
        let bytes = RawView::from_slice(&a).reinterpret(1).unwrap();

        let expected: [u8; 8] = unsafe { core::mem::transmute(a) };
        assert_eq!(unsafe { bytes.as_slice::<u8>() }, &expected);
    }

    #[test]
    fn writes_through_a_mutable_view() {
        let mut a = [0u16; 4];
        let view = RawView::from_mut_slice(&mut a).sub_view(1, 2).unwrap();

        unsafe { view.as_mut_slice::<u16>() }.copy_from_slice(&[7, 8]);
        assert_eq!(a, [0, 7, 8, 0]);
    }
}
