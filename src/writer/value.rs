//! Recursive whole-value emission

use std::collections::HashSet;
use std::io::Write;

use crate::codec::{self, ByteOrder};
use crate::error::{Error, Result};
use crate::tag;
use crate::types::{DType, Value};

use super::array::emit_array;

/// Emit one complete value, containers included.
pub(crate) fn emit_value<W: Write>(
    w: &mut W,
    order: ByteOrder,
    value: &Value,
    strict_keys: bool,
) -> Result<()> {
    match value {
        Value::Null => {
            w.write_all(&[tag::NULL])?;
        }
        Value::Bool(b) => {
            w.write_all(&[if *b { tag::TRUE } else { tag::FALSE }])?;
        }
        Value::Int(v) => {
            let dtype = DType::fitting_int(*v);
            w.write_all(&[dtype as u8])?;
            codec::write_scalar(w, order, dtype, value)?;
        }
        Value::UInt(v) => {
            let dtype = DType::fitting_uint(*v);
            w.write_all(&[dtype as u8])?;
            codec::write_scalar(w, order, dtype, value)?;
        }
        Value::F32(v) => {
            w.write_all(&[DType::F32 as u8])?;
            codec::write_f32(w, order, *v)?;
        }
        Value::F64(v) => {
            w.write_all(&[DType::F64 as u8])?;
            codec::write_f64(w, order, *v)?;
        }
        Value::String(s) => {
            emit_string(w, order, s)?;
        }
        Value::Bytes(b) => {
            w.write_all(&[tag::BIN])?;
            codec::write_length(w, order, b.len() as u64)?;
            w.write_all(b)?;
        }
        Value::List(items) => {
            w.write_all(&[tag::LIST_OPEN])?;
            for item in items {
                emit_value(w, order, item, strict_keys)?;
            }
            w.write_all(&[tag::LIST_CLOSE])?;
        }
        Value::Dict(pairs) => {
            w.write_all(&[tag::DICT_OPEN])?;
            let mut seen = strict_keys.then(HashSet::new);
            for (key, val) in pairs {
                if let Some(seen) = seen.as_mut() {
                    if !seen.insert(key.as_str()) {
                        return Err(Error::DuplicateKey(key.clone()));
                    }
                }
                emit_string(w, order, key)?;
                emit_value(w, order, val, strict_keys)?;
            }
            w.write_all(&[tag::DICT_CLOSE])?;
        }
        Value::Array(arr) => {
            emit_array(w, order, arr.dtype, &arr.shape, &arr.data)?;
        }
    }
    Ok(())
}

/// Emit a string: tag, compact length, UTF-8 bytes.
pub(crate) fn emit_string<W: Write>(w: &mut W, order: ByteOrder, s: &str) -> Result<()> {
    w.write_all(&[tag::STR])?;
    codec::write_length(w, order, s.len() as u64)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}
