//! Byte-order aware primitive codec.
//!
//! Everything multi-byte in the wire format (integer and float
//! scalars, compact lengths, array elements) goes through here so the
//! file-wide byte order is applied in exactly one place.

use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::tag;
use crate::types::{DType, Value};

/// Byte order of every multi-byte quantity in one file.
///
/// Chosen at creation time and not recorded in-band; reader and writer
/// agree on it out of band. `Auto` resolves to the host order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    Big,
    Little,
    #[default]
    Auto,
}

impl ByteOrder {
    pub(crate) fn is_big(self) -> bool {
        match self {
            ByteOrder::Big => true,
            ByteOrder::Little => false,
            ByteOrder::Auto => cfg!(target_endian = "big"),
        }
    }

    pub(crate) fn is_native(self) -> bool {
        self.is_big() == cfg!(target_endian = "big")
    }
}

macro_rules! rw_num {
    ($write_fn:ident, $read_fn:ident, $ty:ty, $n:expr) => {
        pub(crate) fn $write_fn<W: Write>(w: &mut W, order: ByteOrder, v: $ty) -> Result<()> {
            let bytes = if order.is_big() {
                v.to_be_bytes()
            } else {
                v.to_le_bytes()
            };
            w.write_all(&bytes)?;
            Ok(())
        }

        pub(crate) fn $read_fn<R: Read>(r: &mut R, order: ByteOrder) -> Result<$ty> {
            let mut buf = [0u8; $n];
            r.read_exact(&mut buf).map_err(Error::from_read)?;
            Ok(if order.is_big() {
                <$ty>::from_be_bytes(buf)
            } else {
                <$ty>::from_le_bytes(buf)
            })
        }
    };
}

rw_num!(write_u8, read_u8, u8, 1);
rw_num!(write_u16, read_u16, u16, 2);
rw_num!(write_u32, read_u32, u32, 4);
rw_num!(write_u64, read_u64, u64, 8);
rw_num!(write_i8, read_i8, i8, 1);
rw_num!(write_i16, read_i16, i16, 2);
rw_num!(write_i32, read_i32, i32, 4);
rw_num!(write_i64, read_i64, i64, 8);
rw_num!(write_f32, read_f32, f32, 4);
rw_num!(write_f64, read_f64, f64, 8);

/// Emit a compact length: tier discriminator, then the length at the
/// tier's width. The smallest tier that fits wins; zero uses the u8
/// tier.
pub(crate) fn write_length<W: Write>(w: &mut W, order: ByteOrder, len: u64) -> Result<()> {
    if let Ok(v) = u8::try_from(len) {
        w.write_all(&[tag::LEN8])?;
        write_u8(w, order, v)
    } else if let Ok(v) = u16::try_from(len) {
        w.write_all(&[tag::LEN16])?;
        write_u16(w, order, v)
    } else if let Ok(v) = u32::try_from(len) {
        w.write_all(&[tag::LEN32])?;
        write_u32(w, order, v)
    } else {
        w.write_all(&[tag::LEN64])?;
        write_u64(w, order, len)
    }
}

/// Parse a compact length. `at` is the stream offset of the
/// discriminator byte, used only for error reporting.
pub(crate) fn read_length<R: Read>(r: &mut R, order: ByteOrder, at: u64) -> Result<u64> {
    let tier = read_u8(r, order)?;
    match tier {
        tag::LEN8 => Ok(read_u8(r, order)?.into()),
        tag::LEN16 => Ok(read_u16(r, order)?.into()),
        tag::LEN32 => Ok(read_u32(r, order)?.into()),
        tag::LEN64 => read_u64(r, order),
        other => Err(Error::UnexpectedTag {
            tag: other,
            offset: at,
        }),
    }
}

/// Read one scalar of the given kind and widen it into a [`Value`].
pub(crate) fn read_scalar<R: Read>(r: &mut R, order: ByteOrder, dtype: DType) -> Result<Value> {
    Ok(match dtype {
        DType::U8 => Value::UInt(read_u8(r, order)?.into()),
        DType::U16 => Value::UInt(read_u16(r, order)?.into()),
        DType::U32 => Value::UInt(read_u32(r, order)?.into()),
        DType::U64 => Value::UInt(read_u64(r, order)?),
        DType::I8 => Value::Int(read_i8(r, order)?.into()),
        DType::I16 => Value::Int(read_i16(r, order)?.into()),
        DType::I32 => Value::Int(read_i32(r, order)?.into()),
        DType::I64 => Value::Int(read_i64(r, order)?),
        DType::F32 => Value::F32(read_f32(r, order)?),
        DType::F64 => Value::F64(read_f64(r, order)?),
    })
}

/// Emit one scalar of the given kind. The caller guarantees the value
/// fits the width (it picked the kind via `DType::fitting_*`).
pub(crate) fn write_scalar<W: Write>(
    w: &mut W,
    order: ByteOrder,
    dtype: DType,
    value: &Value,
) -> Result<()> {
    match (dtype, value) {
        (DType::I8, Value::Int(v)) => write_i8(w, order, *v as i8),
        (DType::I16, Value::Int(v)) => write_i16(w, order, *v as i16),
        (DType::I32, Value::Int(v)) => write_i32(w, order, *v as i32),
        (DType::I64, Value::Int(v)) => write_i64(w, order, *v),
        (DType::U8, Value::UInt(v)) => write_u8(w, order, *v as u8),
        (DType::U16, Value::UInt(v)) => write_u16(w, order, *v as u16),
        (DType::U32, Value::UInt(v)) => write_u32(w, order, *v as u32),
        (DType::U64, Value::UInt(v)) => write_u64(w, order, *v),
        (DType::F32, Value::F32(v)) => write_f32(w, order, *v),
        (DType::F64, Value::F64(v)) => write_f64(w, order, *v),
        _ => Err(Error::TypeMismatch {
            expected: "numeric scalar",
            actual: value.kind(),
        }),
    }
}

/// Decode one array element from a byte slice already in file order.
pub(crate) fn decode_element(bytes: &[u8], order: ByteOrder, dtype: DType) -> Result<Value> {
    let mut cursor = bytes;
    read_scalar(&mut cursor, order, dtype)
}

/// Reverse each `width`-byte element in place. Used to move array
/// payloads between file order and native order.
pub(crate) fn swap_elements(data: &mut [u8], width: usize) {
    if width <= 1 {
        return;
    }
    for chunk in data.chunks_exact_mut(width) {
        chunk.reverse();
    }
}

/// Convert an array payload read from the file into native order.
pub(crate) fn payload_to_native(data: &mut [u8], order: ByteOrder, dtype: DType) {
    if !order.is_native() {
        swap_elements(data, dtype.size());
    }
}
