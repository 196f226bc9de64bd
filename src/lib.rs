#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use mv_layout as layout;
pub use mv_ptr as ptr;
