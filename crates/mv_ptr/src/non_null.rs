use core::fmt;
use core::ptr::NonNull;

use crate::offset_address;

/// A read-only `NonNull<T>` that can be moved by element or byte deltas
/// and reinterpreted as a pointer to another element type.
///
/// # Examples
///
/// ```
/// use mv_ptr::ConstNonNull;
///
/// let a = [10, 20, 30];
///
/// let p0 = ConstNonNull::from_ref(&a).cast::<i32>();
/// let p2 = unsafe { p0.add_elements(2) };
///
/// assert_eq!(unsafe { *p2.as_ref() }, 30);
/// ```
#[repr(transparent)]
pub struct ConstNonNull<T: ?Sized>(NonNull<T>);

impl<T: ?Sized> ConstNonNull<T> {
    /// Create a new `ConstNonNull` or return `None` if `ptr` is null.
    ///
    /// # Examples
    ///
    /// ```
    /// use mv_ptr::ConstNonNull;
    ///
    /// let x = 0u32;
    /// let ptr = ConstNonNull::new(&raw const x).expect("ptr is null!");
    ///
    /// assert!(ConstNonNull::<u32>::new(core::ptr::null()).is_none());
    /// ```
    #[inline]
    pub const fn new(ptr: *const T) -> Option<Self> {
        match NonNull::new(ptr.cast_mut()) {
            Some(x) => Some(Self(x)),
            None => None,
        }
    }

    /// Return an immutable reference to the value.
    ///
    /// # Safety
    ///
    /// When calling this method, you have to ensure that the pointer is
    /// [convertible to a reference](https://doc.rust-lang.org/stable/core/ptr/index.html#pointer-to-reference-conversion).
    #[inline(always)]
    pub const unsafe fn as_ref<'a>(&self) -> &'a T {
        // Safety: See `NonNull::as_ref`
        unsafe { self.0.as_ref() }
    }

    /// Acquires the underlying `*const` pointer.
    #[inline(always)]
    pub const fn as_ptr(&self) -> *const T {
        self.0.as_ptr()
    }

    /// Acquires the address as a type-erased byte pointer.
    #[inline(always)]
    pub const fn as_bytes_ptr(&self) -> NonNull<u8> {
        self.0.cast()
    }

    /// Converts a reference to a `ConstNonNull` pointer.
    #[inline(always)]
    pub const fn from_ref(r: &T) -> Self {
        Self(NonNull::from_ref(r))
    }

    /// Converts a mutable reference to a `ConstNonNull` pointer.
    #[inline(always)]
    pub const fn from_mut(r: &mut T) -> Self {
        Self(NonNull::from_mut(r))
    }

    /// Reinterprets the pointer as pointing to a `U`.
    ///
    /// The address is unchanged; reading through the result requires
    /// the pointee to be a valid, aligned `U`.
    #[inline(always)]
    pub const fn cast<U>(self) -> ConstNonNull<U> {
        ConstNonNull(self.0.cast())
    }
}

impl<T> ConstNonNull<T> {
    /// Moves the pointer by `delta` elements of `size_of::<T>()` bytes.
    ///
    /// # Safety
    ///
    /// Same contract as [`offset_address`].
    #[inline(always)]
    pub const unsafe fn add_elements(self, delta: isize) -> Self {
        // SAFETY: Forwarded to the caller.
        let moved = unsafe { offset_address(self.as_bytes_ptr(), size_of::<T>(), delta) };
        Self(moved.cast())
    }

    /// Moves the pointer by `count` raw bytes.
    ///
    /// # Safety
    ///
    /// Same contract as [`offset_address`].
    #[inline(always)]
    pub const unsafe fn byte_offset(self, count: isize) -> Self {
        // SAFETY: Forwarded to the caller.
        let moved = unsafe { offset_address(self.as_bytes_ptr(), 1, count) };
        Self(moved.cast())
    }

    /// Check if the pointer is aligned to `T`.
    #[inline]
    pub fn is_aligned(&self) -> bool {
        self.0.as_ptr().is_aligned()
    }
}

impl<T: ?Sized> From<NonNull<T>> for ConstNonNull<T> {
    #[inline(always)]
    fn from(value: NonNull<T>) -> Self {
        Self(value)
    }
}

impl<T: ?Sized> Clone for ConstNonNull<T> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for ConstNonNull<T> {}

impl<T: ?Sized> PartialEq for ConstNonNull<T> {
    #[inline]
    #[expect(ambiguous_wide_pointer_comparisons, reason = "address and metadata both compared")]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: ?Sized> Eq for ConstNonNull<T> {}

impl<T: ?Sized> fmt::Debug for ConstNonNull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.as_ptr(), f)
    }
}
