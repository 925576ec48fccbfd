//! Numeric element kinds for scalars and typed arrays

/// Element kind of a numeric scalar or array.
///
/// The discriminant doubles as the wire tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DType {
    U8 = 0x01,
    I8 = 0x02,
    U16 = 0x03,
    I16 = 0x04,
    U32 = 0x05,
    I32 = 0x06,
    U64 = 0x07,
    I64 = 0x08,
    F32 = 0x09,
    F64 = 0x0A,
}

impl DType {
    /// Size in bytes of a single element
    pub fn size(self) -> usize {
        match self {
            DType::U8 | DType::I8 => 1,
            DType::U16 | DType::I16 => 2,
            DType::U32 | DType::I32 | DType::F32 => 4,
            DType::U64 | DType::I64 | DType::F64 => 8,
        }
    }

    /// Try to convert from a tag byte
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(DType::U8),
            0x02 => Some(DType::I8),
            0x03 => Some(DType::U16),
            0x04 => Some(DType::I16),
            0x05 => Some(DType::U32),
            0x06 => Some(DType::I32),
            0x07 => Some(DType::U64),
            0x08 => Some(DType::I64),
            0x09 => Some(DType::F32),
            0x0A => Some(DType::F64),
            _ => None,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(self, DType::I8 | DType::I16 | DType::I32 | DType::I64)
    }

    pub fn is_float(self) -> bool {
        matches!(self, DType::F32 | DType::F64)
    }

    /// Narrowest signed kind that can hold `value`.
    pub fn fitting_int(value: i64) -> DType {
        if i8::try_from(value).is_ok() {
            DType::I8
        } else if i16::try_from(value).is_ok() {
            DType::I16
        } else if i32::try_from(value).is_ok() {
            DType::I32
        } else {
            DType::I64
        }
    }

    /// Narrowest unsigned kind that can hold `value`.
    pub fn fitting_uint(value: u64) -> DType {
        if u8::try_from(value).is_ok() {
            DType::U8
        } else if u16::try_from(value).is_ok() {
            DType::U16
        } else if u32::try_from(value).is_ok() {
            DType::U32
        } else {
            DType::U64
        }
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DType::U8 => "u8",
            DType::I8 => "i8",
            DType::U16 => "u16",
            DType::I16 => "i16",
            DType::U32 => "u32",
            DType::I32 => "i32",
            DType::U64 => "u64",
            DType::I64 => "i64",
            DType::F32 => "f32",
            DType::F64 => "f64",
        };
        f.write_str(name)
    }
}
