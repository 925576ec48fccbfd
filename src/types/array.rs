//! N-dimensional typed array values

use super::DType;

/// Dense N-dimensional numeric array, row-major.
///
/// `data` is always held in native byte order in memory; the codec
/// swaps per element on the way to and from disk when the file order
/// differs from the host order.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    pub dtype: DType,
    pub shape: Vec<usize>,
    pub data: Vec<u8>,
}

impl Array {
    pub fn new(dtype: DType, shape: Vec<usize>, data: Vec<u8>) -> Self {
        Self { dtype, shape, data }
    }

    /// Total number of elements
    pub fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }

    /// Expected payload size in bytes
    pub fn expected_size(&self) -> usize {
        self.num_elements() * self.dtype.size()
    }

    /// Number of axes
    pub fn rank(&self) -> usize {
        self.shape.len()
    }
}
