use core::ptr::NonNull;

/// Moves `address` by `delta` elements of `stride` bytes each.
///
/// This is the only unchecked primitive of the crate: the result is never
/// compared against any allocation, a view's bounds, or the base it came from.
/// Everything else ([`RawView::new`], [`RawView::sub_view`], [`RawView::reinterpret`])
/// validates its inputs.
///
/// Passing `stride = 1` turns `delta` into a raw byte count.
///
/// # Safety
///
/// - `address` and the result must lie within (or one byte past the end of)
///   the same live allocation.
/// - `delta * stride` must not overflow `isize`.
///
/// What happens when an out-of-range result is later dereferenced is not
/// something this function can report; it is undefined behavior.
///
/// # Examples
///
/// ```
/// use core::ptr::NonNull;
/// use mv_ptr::offset_address;
///
/// let mut a = [0i64; 16];
/// a[3] = 3;
///
/// let base = NonNull::from_ref(&a).cast::<u8>();
/// let p9 = unsafe { offset_address(base, size_of::<i64>(), 9) };
/// let p3 = unsafe { offset_address(p9, size_of::<i64>(), -6) };
///
/// assert_eq!(unsafe { *p3.cast::<i64>().as_ref() }, 3);
/// ```
///
/// [`RawView::new`]: crate::RawView::new
/// [`RawView::sub_view`]: crate::RawView::sub_view
/// [`RawView::reinterpret`]: crate::RawView::reinterpret
#[inline(always)]
pub const unsafe fn offset_address(address: NonNull<u8>, stride: usize, delta: isize) -> NonNull<u8> {
    // SAFETY: The caller keeps the result inside the allocation of `address`.
    unsafe { address.byte_offset(delta.wrapping_mul(stride as isize)) }
}
