//! blobnav - Self-describing binary container with lazy navigation
//!
//! A compact binary format for heterogeneous data: scalars, strings,
//! byte blobs, ordered dicts, lists, and N-dimensional numeric arrays,
//! all encoded as a single self-describing tag stream with no header.
//! Files can be read back two ways: materialize the whole value, or
//! navigate to one spot by key, index, or multi-axis slice without
//! touching anything else.
//!
//! # Features
//!
//! - Single-byte tag grammar, no magic bytes, no footer
//! - Whole-value writes and sequential construction via container
//!   handles, including in-place append to an existing root
//! - Lazy seek-based navigation: keyed lookup, indexed access,
//!   list slicing, and strided array slicing with O(1) element reads
//! - File-wide byte order (big, little, or host) chosen at creation
//! - Optional `ndarray` conversions behind the `ndarray` feature
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//! use blobnav::{ByteOrder, Navigator, Selector, Value, Writer};
//!
//! // Build a file in memory.
//! let mut writer = Writer::new(Cursor::new(Vec::new()), ByteOrder::Big);
//! writer.write_value(&Value::Dict(vec![
//!     ("name".into(), Value::from("example")),
//!     ("xs".into(), Value::List(vec![Value::Int(1), Value::Int(2)])),
//! ])).unwrap();
//! writer.finish().unwrap();
//! let bytes = writer.into_inner().into_inner();
//!
//! // Jump straight to one element without materializing the rest.
//! let mut nav = Navigator::new(Cursor::new(bytes), ByteOrder::Big).unwrap();
//! let last = nav.select(&[Selector::key("xs"), Selector::index(-1)]).unwrap();
//! assert_eq!(last, Value::Int(2));
//! ```

mod codec;
pub mod error;
pub mod reader;
pub mod select;
pub mod tag;
pub mod types;
pub mod writer;

#[cfg(feature = "ndarray")]
pub mod ndarray_ext;

// Re-export common types at crate root
pub use codec::ByteOrder;
pub use error::{Error, Result};
pub use reader::{ContainerKind, DebugLines, DebugOptions, Navigator};
pub use select::{Selector, SliceSel};
pub use types::{Array, DType, Value};
pub use writer::{Handle, Writer};

#[cfg(feature = "ndarray")]
pub use ndarray_ext::{ArrayType, NdarrayError};
