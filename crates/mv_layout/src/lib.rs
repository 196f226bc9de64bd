//! Type descriptors and the layout facts derived from them.
//!
//! **TypeDescriptor**
//!
//! [`TypeDescriptor`] describes a type: a scalar, a run of machine words, a
//! pointer, an array, a struct or an opaque declared type. Struct fields are
//! [`FieldDescriptor`]s, possibly embedded (`anonymous`) and possibly held
//! through a pointer (`indirect`). Descriptors are serde-loadable.
//!
//! **LayoutCalculator**
//!
//! [`LayoutCalculator`] computes [`LayoutFacts`] (size, alignment and field
//! offsets) for a [`Target`] data model. Fields of embedded structs are
//! promoted to the outer type. Fields reached through an embedded pointer
//! are rejected with [`LayoutError::IndirectFieldOffset`] when their offset
//! is asked for.
//!
//! Layout facts are deterministic for a given descriptor and target.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod calculator;
mod descriptor;
mod error;
mod facts;
mod target;

// -----------------------------------------------------------------------------
// Top-level exports

pub use calculator::{LayoutCalculator, compute_layout};
pub use descriptor::{FieldDescriptor, Primitive, TypeDescriptor, TypeKind, TypeRef};
pub use error::{LayoutError, Malformed};
pub use facts::{FieldLayout, LayoutFacts};
pub use target::Target;
