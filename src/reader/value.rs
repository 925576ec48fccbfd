//! Whole-value materialization

use std::io::{Read, Seek};

use crate::codec;
use crate::error::Result;
use crate::tag::Tag;
use crate::types::{Array, Value};

use super::Navigator;

impl<R: Read + Seek> Navigator<R> {
    /// Materialize the value at the cursor, advancing past it.
    pub fn read(&mut self) -> Result<Value> {
        let (tag, at) = self.read_tag()?;
        match tag {
            Tag::Null => Ok(Value::Null),
            Tag::True => Ok(Value::Bool(true)),
            Tag::False => Ok(Value::Bool(false)),
            Tag::Scalar(dtype) => {
                // Width availability was not yet checked; short reads
                // surface as TruncatedPayload from the codec.
                codec::read_scalar(&mut self.src, self.order, dtype)
            }
            Tag::Str => {
                self.seek_to(at)?;
                Ok(Value::String(self.read_string()?))
            }
            Tag::Bin => {
                let len = self.read_length()?;
                Ok(Value::Bytes(self.take(len)?))
            }
            Tag::ListOpen => {
                let mut items = Vec::new();
                while !self.next_is(Tag::ListClose)? {
                    items.push(self.read()?);
                }
                self.read_tag()?; // consume the terminator
                Ok(Value::List(items))
            }
            Tag::DictOpen => {
                let mut pairs: Vec<(String, Value)> = Vec::new();
                while !self.next_is(Tag::DictClose)? {
                    let key = self.read_string()?;
                    let value = self.read()?;
                    // Duplicate keys: the last occurrence wins, at the
                    // first occurrence's position.
                    match pairs.iter_mut().find(|(k, _)| *k == key) {
                        Some(pair) => pair.1 = value,
                        None => pairs.push((key, value)),
                    }
                }
                self.read_tag()?;
                Ok(Value::Dict(pairs))
            }
            Tag::Array => {
                let header = self.read_array_header_body()?;
                let mut data = self.take(header.payload_len())?;
                codec::payload_to_native(&mut data, self.order, header.dtype);
                Ok(Value::Array(Array::new(header.dtype, header.shape, data)))
            }
            Tag::ListClose | Tag::DictClose => {
                self.seek_to(at)?;
                Err(crate::error::Error::UnexpectedTag {
                    tag: tag.to_u8(),
                    offset: at,
                })
            }
        }
    }
}
