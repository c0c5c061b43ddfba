//! bsontree: decoder for BSON-like binary documents into a dynamic value tree.
//!
//! The crate provides:
//! - A growable byte buffer with explicit growth policy (`buffer`)
//! - A bounds-checked cursor, recursive decoder and inverse encoder (`bson`)
//! - The dynamic value tree the decoder writes into (`value`)
//! - File-oriented helpers that stage input before decoding (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use bsontree::bson::{self, DecodeOptions, RootContext};
//! use bsontree::value::Value;
//!
//! // {"a": "hi"}
//! let doc = [
//!     0x0F, 0, 0, 0, 0x02, b'a', 0, 3, 0, 0, 0, b'h', b'i', 0, 0,
//! ];
//! let opts = DecodeOptions {
//!     root: RootContext::Map,
//!     ..Default::default()
//! };
//! let tree = bson::decode_to_value(&doc, &opts).unwrap();
//! assert_eq!(tree.get("a").and_then(Value::as_str), Some("hi"));
//!
//! let bytes = bson::encode(&tree).unwrap();
//! assert_eq!(bytes, doc);
//! ```

pub mod bson;
pub mod buffer;
pub mod io;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;
