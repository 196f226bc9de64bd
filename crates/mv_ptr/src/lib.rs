//! Raw pointer arithmetic and bounds-carrying views over externally owned memory.
//!
//! Nothing here allocates, frees or tracks the lifetime of the memory it
//! points into. The caller provides a live region; the crate computes
//! addresses and checked windows over it.
//!
//! **offset_address**
//!
//! [`offset_address`] moves an address by a signed number of elements of a
//! given stride. It is the single unchecked primitive: no bounds, no
//! allocation checks, no failure mode.
//!
//! **ConstNonNull**
//!
//! [`ConstNonNull<T>`] is similar to [`NonNull<T>`](core::ptr::NonNull): a
//! non-null read-only pointer, with element/byte movement and type casts.
//!
//! **RawView**
//!
//! [`RawView<'a>`] is a type-erased `(base, stride, len, capacity)` window.
//! Construction, sub-views and stride reinterpretation are bounds checked and
//! report a [`ViewError`].
//!
//! **ByteView**
//!
//! [`ByteView<'a>`] plus [`text_to_bytes`] / [`bytes_to_text`] alias a `str`
//! and a byte sequence over the same storage, in O(1) and without copying.
#![expect(unsafe_code, reason = "Raw pointers are inherently unsafe.")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Modules

mod bridge;
mod error;
mod non_null;
mod offset;
mod view;

// -----------------------------------------------------------------------------
// Top-level exports

pub use bridge::{ByteView, bytes_to_text, text_to_bytes};
pub use error::{InvalidBounds, ViewError};
pub use non_null::ConstNonNull;
pub use offset::offset_address;
pub use view::RawView;
