//! ndarray integration for blobnav arrays
//!
//! Conversions between [`Array`] and `ndarray`'s dynamic-dimension
//! types, so encoded tensors can be sliced and computed on with the
//! usual tooling. Enable with the `ndarray` feature flag.

use ndarray::{ArrayD, IxDyn};

use crate::types::{Array, DType};

/// Error type for ndarray conversions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NdarrayError {
    #[error("dtype mismatch: expected {expected}, got {actual}")]
    DTypeMismatch { expected: DType, actual: DType },

    #[error("shape {shape:?} does not match payload of {data_len} bytes")]
    ShapeMismatch { shape: Vec<usize>, data_len: usize },

    #[error("array is not contiguous; call .as_standard_layout().into_owned() first")]
    NotContiguous,
}

/// Rust primitives that can live in a blobnav array.
pub trait ArrayType: Sized + Clone + 'static {
    const DTYPE: DType;
}

impl ArrayType for u8 {
    const DTYPE: DType = DType::U8;
}
impl ArrayType for i8 {
    const DTYPE: DType = DType::I8;
}
impl ArrayType for u16 {
    const DTYPE: DType = DType::U16;
}
impl ArrayType for i16 {
    const DTYPE: DType = DType::I16;
}
impl ArrayType for u32 {
    const DTYPE: DType = DType::U32;
}
impl ArrayType for i32 {
    const DTYPE: DType = DType::I32;
}
impl ArrayType for u64 {
    const DTYPE: DType = DType::U64;
}
impl ArrayType for i64 {
    const DTYPE: DType = DType::I64;
}
impl ArrayType for f32 {
    const DTYPE: DType = DType::F32;
}
impl ArrayType for f64 {
    const DTYPE: DType = DType::F64;
}

impl Array {
    /// Build a blobnav [`Array`] from an `ndarray` array.
    ///
    /// The input must be contiguous row-major; the element buffer is
    /// reinterpreted as bytes without copying.
    pub fn from_ndarray<T: ArrayType>(arr: ArrayD<T>) -> Result<Self, NdarrayError> {
        if !arr.is_standard_layout() {
            return Err(NdarrayError::NotContiguous);
        }

        let shape = arr.shape().to_vec();
        let (vec, offset) = arr.into_raw_vec_and_offset();

        // offset must be 0 for safe reinterpretation: otherwise the
        // elements do not start at the allocation start.
        if offset != Some(0) {
            return Err(NdarrayError::NotContiguous);
        }

        let byte_len = vec.len() * std::mem::size_of::<T>();
        let cap = vec.capacity() * std::mem::size_of::<T>();
        let ptr = vec.as_ptr();

        std::mem::forget(vec);

        // SAFETY:
        // - vec is forgotten so we own the allocation
        // - offset == 0 ensures ptr points to the allocation start
        // - byte_len/cap are scaled for u8
        // - T is a primitive (ArrayType) with a plain byte repr
        let data = unsafe { Vec::from_raw_parts(ptr as *mut u8, byte_len, cap) };
        Ok(Array::new(T::DTYPE, shape, data))
    }

    /// Convert to an `ndarray` array, copying the payload.
    pub fn to_ndarray<T: ArrayType>(&self) -> Result<ArrayD<T>, NdarrayError> {
        if T::DTYPE != self.dtype {
            return Err(NdarrayError::DTypeMismatch {
                expected: T::DTYPE,
                actual: self.dtype,
            });
        }

        let expected_len = self.num_elements() * std::mem::size_of::<T>();
        if self.data.len() != expected_len {
            return Err(NdarrayError::ShapeMismatch {
                shape: self.shape.clone(),
                data_len: self.data.len(),
            });
        }

        let elements: Vec<T> = self
            .data
            .chunks_exact(std::mem::size_of::<T>())
            .map(|chunk| {
                // SAFETY:
                // - chunk is exactly size_of::<T>() valid bytes
                // - T is constrained to ArrayType (primitives only),
                //   so any bit pattern is a valid value
                // - read_unaligned handles any alignment
                unsafe { std::ptr::read_unaligned(chunk.as_ptr() as *const T) }
            })
            .collect();

        ArrayD::from_shape_vec(IxDyn(&self.shape), elements).map_err(|_| {
            NdarrayError::ShapeMismatch {
                shape: self.shape.clone(),
                data_len: self.data.len(),
            }
        })
    }
}
