//! Array emission: rank, dims, element kind, payload

use std::io::Write;

use crate::codec::{self, ByteOrder};
use crate::error::{Error, Result};
use crate::tag;
use crate::types::DType;

/// Emit an array header and payload. `data` holds native-order
/// elements; they are swapped on the way out when the file order
/// differs.
pub(crate) fn emit_array<W: Write>(
    w: &mut W,
    order: ByteOrder,
    dtype: DType,
    shape: &[usize],
    data: &[u8],
) -> Result<()> {
    if shape.is_empty() {
        return Err(Error::ShapeMismatch { rank: 0, given: 0 });
    }
    let count: usize = shape.iter().product();
    let expected = (count * dtype.size()) as u64;
    if data.len() as u64 != expected {
        return Err(Error::DataSizeMismatch {
            expected,
            actual: data.len() as u64,
        });
    }

    w.write_all(&[tag::ARRAY])?;
    codec::write_length(w, order, shape.len() as u64)?;
    for &dim in shape {
        codec::write_length(w, order, dim as u64)?;
    }
    w.write_all(&[dtype as u8])?;

    if order.is_native() || dtype.size() == 1 {
        w.write_all(data)?;
    } else {
        let width = dtype.size();
        let mut element = [0u8; 8];
        for chunk in data.chunks_exact(width) {
            for (i, b) in chunk.iter().rev().enumerate() {
                element[i] = *b;
            }
            w.write_all(&element[..width])?;
        }
    }
    Ok(())
}
