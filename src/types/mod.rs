//! Core types for the blobnav value domain

mod array;
mod dtype;
mod value;

pub use array::Array;
pub use dtype::DType;
pub use value::Value;
