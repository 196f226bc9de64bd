use core::{fmt, str};

use crate::RawView;

// -----------------------------------------------------------------------------
// ByteView

/// A read-only byte sequence aliasing storage owned elsewhere.
///
/// It is a [`RawView`] with a stride of one; [`as_bytes`](Self::as_bytes)
/// is safe because every constructor guarantees the span is initialized and
/// readable for `'a`.
///
/// Two byte views compare equal when they alias the same span, not when
/// their contents match. Compare [`as_bytes`](Self::as_bytes) for content.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteView<'a>(RawView<'a>);

impl<'a> ByteView<'a> {
    /// The canonical empty byte view.
    pub const EMPTY: Self = Self(RawView::EMPTY);

    /// Views the bytes of a slice.
    #[inline]
    pub const fn from_bytes(bytes: &'a [u8]) -> Self {
        Self(RawView::from_slice(bytes))
    }

    /// Views the visible bytes of any raw view, whatever its stride.
    ///
    /// # Safety
    ///
    /// The span of `view` must be live and readable for `'a`, and every
    /// visible byte must be initialized. Padding inside the elements
    /// of a view over structs usually is not.
    #[inline]
    pub unsafe fn from_view(view: RawView<'a>) -> Self {
        match view.reinterpret(1) {
            Ok(bytes) => Self(bytes),
            // Every span is a multiple of one.
            Err(_) => unreachable!(),
        }
    }

    /// Returns the underlying raw view.
    #[inline(always)]
    pub const fn as_view(&self) -> RawView<'a> {
        self.0
    }

    /// Returns the viewed bytes.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        // SAFETY: the span is initialized and readable for `'a`.
        unsafe { self.0.as_slice::<u8>() }
    }

    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> From<&'a [u8]> for ByteView<'a> {
    #[inline]
    fn from(bytes: &'a [u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl fmt::Debug for ByteView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ByteView").field(&self.as_bytes()).finish()
    }
}

// -----------------------------------------------------------------------------
// Conversions

/// Views the bytes of `text` without copying.
///
/// The result has the byte length of `text` and shares its storage. Empty
/// text yields [`ByteView::EMPTY`], never a dangling alias.
///
/// # Examples
///
/// ```
/// use mv_ptr::{ByteView, text_to_bytes};
///
/// let text = "héllo";
/// let bytes = text_to_bytes(text);
///
/// assert_eq!(bytes.len(), text.len());
/// assert_eq!(bytes.as_bytes().as_ptr(), text.as_ptr());
/// assert_eq!(text_to_bytes(""), ByteView::EMPTY);
/// ```
#[inline]
pub const fn text_to_bytes(text: &str) -> ByteView<'_> {
    ByteView::from_bytes(text.as_bytes())
}

/// Views `bytes` as text without copying or validating.
///
/// An empty view yields `""`.
///
/// # Safety
///
/// The visible bytes must be valid UTF-8. Views produced by
/// [`text_to_bytes`] always are.
///
/// # Examples
///
/// ```
/// use mv_ptr::{bytes_to_text, text_to_bytes};
///
/// let text = "zero copy";
/// let back = unsafe { bytes_to_text(text_to_bytes(text)) };
///
/// assert_eq!(back, text);
/// assert_eq!(back.as_ptr(), text.as_ptr());
/// ```
#[inline]
pub unsafe fn bytes_to_text<'a>(bytes: ByteView<'a>) -> &'a str {
    if bytes.is_empty() {
        return "";
    }
    // SAFETY: UTF-8 validity is the caller's precondition.
    unsafe { str::from_utf8_unchecked(bytes.as_bytes()) }
}

#[cfg(test)]
mod tests {
    use super::{ByteView, bytes_to_text, text_to_bytes};
    use crate::RawView;

    #[test]
    fn text_and_bytes_share_storage() {
        let text = "memory layout";
        let bytes = text_to_bytes(text);

        assert_eq!(bytes.as_bytes(), text.as_bytes());
        assert_eq!(bytes.as_view().as_ptr(), text.as_ptr());

        let back = unsafe { bytes_to_text(bytes) };
        assert_eq!(back, text);
        assert_eq!(back.len(), text.len());
        assert_eq!(back.as_ptr(), text.as_ptr());
    }

    #[test]
    fn empty_text_maps_to_canonical_values() {
        let bytes = text_to_bytes("");
        assert_eq!(bytes, ByteView::EMPTY);
        assert!(bytes.as_view().is_null());
        assert_eq!(unsafe { bytes_to_text(ByteView::EMPTY) }, "");

        let a = [b'x'];
        let window = ByteView::from_bytes(&a[1..]);
        assert_eq!(unsafe { bytes_to_text(window) }, "");
    }

    #[test]
    fn equality_is_identity_not_content() {
        let left = "abc";
        let owned = [b'a', b'b', b'c'];
        let right = ByteView::from_bytes(&owned);

        assert_eq!(text_to_bytes(left).as_bytes(), right.as_bytes());
        assert_ne!(text_to_bytes(left), right);
    }

    #[test]
    fn wider_views_are_seen_as_bytes() {
        let a = [u16::from_ne_bytes([b'h', b'i']), u16::from_ne_bytes([b'!', b'?'])];
        let view = RawView::from_slice(&a).sub_view(0, 1).unwrap();

        let bytes = unsafe { ByteView::from_view(view) };
        assert_eq!(bytes.len(), 2);
        assert_eq!(bytes.as_view().capacity(), 4);
        assert_eq!(unsafe { bytes_to_text(bytes) }, "hi");
    }
}
