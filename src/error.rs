//! Error types for blobnav

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while encoding, decoding, or
/// navigating. No variant is recovered internally; each is reported
/// to the caller verbatim.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unexpected tag 0x{tag:02X} at offset {offset}")]
    UnexpectedTag { tag: u8, offset: u64 },

    #[error("unexpected end of data")]
    TruncatedPayload,

    #[error("invalid length {len} ({remaining} bytes remaining)")]
    InvalidLength { len: u64, remaining: u64 },

    #[error("invalid UTF-8 in string")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("unknown array element kind 0x{0:02X}")]
    UnknownElementKind(u8),

    #[error("key not found: {0:?}")]
    KeyNotFound(String),

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("axis count {given} invalid for array of rank {rank}")]
    ShapeMismatch { rank: usize, given: usize },

    #[error("slice step cannot be zero")]
    InvalidSlice,

    #[error("array payload size mismatch: expected {expected} bytes, got {actual}")]
    DataSizeMismatch { expected: u64, actual: u64 },

    #[error("container handle is closed")]
    HandleClosed,

    #[error("root value is not an extensible container")]
    RootNotExtensible,

    #[error("duplicate dict key: {0:?}")]
    DuplicateKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wraps `io::ErrorKind::UnexpectedEof` as a truncation so short
    /// reads surface as a format error rather than an I/O failure.
    pub(crate) fn from_read(e: std::io::Error) -> Error {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::TruncatedPayload
        } else {
            Error::Io(e)
        }
    }
}
