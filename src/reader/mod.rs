//! Lazy navigator over an encoded byte stream.
//!
//! A [`Navigator`] parses tags on demand from a seekable source. It
//! can materialize the value at the cursor, skip it in bounded time,
//! or descend into containers by key or index without touching
//! sibling payloads. Arrays are the one random-access region: their
//! elements are fixed-width and contiguous, so element reads are a
//! single seek.

mod debug;
mod slice;
mod value;

pub use debug::{DebugLines, DebugOptions};

use std::io::{Read, Seek, SeekFrom};

use tracing::trace;

use crate::codec::{self, ByteOrder};
use crate::error::{Error, Result};
use crate::tag::Tag;
use crate::types::DType;

/// Kind of container the cursor has entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    List,
    Dict,
}

/// One ancestor on the navigator's path stack: how the current cursor
/// position was reached, and where that container's children begin.
#[derive(Debug, Clone, Copy)]
struct NavFrame {
    kind: ContainerKind,
    content_start: u64,
}

/// Cursor + path stack over a seekable encoded source.
pub struct Navigator<R: Read + Seek> {
    src: R,
    order: ByteOrder,
    /// Total stream length, captured once for bounds checks
    end: u64,
    frames: Vec<NavFrame>,
}

/// Array header fields, with the cursor left at the payload start.
#[derive(Debug, Clone)]
pub(crate) struct ArrayHeader {
    pub dtype: DType,
    pub shape: Vec<usize>,
    pub data_start: u64,
}

impl ArrayHeader {
    pub(crate) fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }

    pub(crate) fn payload_len(&self) -> u64 {
        (self.num_elements() * self.dtype.size()) as u64
    }
}

impl<R: Read + Seek> Navigator<R> {
    /// Open a navigator over `source`, cursor parked at the root tag.
    pub fn new(mut source: R, order: ByteOrder) -> Result<Self> {
        let end = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(0))?;
        Ok(Self {
            src: source,
            order,
            end,
            frames: Vec::new(),
        })
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Nesting depth of the cursor (entered containers).
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Kind of the innermost container the cursor has entered, if any.
    pub fn container(&self) -> Option<ContainerKind> {
        self.frames.last().map(|frame| frame.kind)
    }

    /// Move the cursor back to the root value.
    pub fn rewind(&mut self) -> Result<()> {
        self.frames.clear();
        self.seek_to(0)
    }

    /// Tag at the cursor, without advancing.
    pub fn peek_tag(&mut self) -> Result<Tag> {
        let at = self.pos()?;
        let tag = self.read_tag()?.0;
        self.seek_to(at)?;
        Ok(tag)
    }

    /// Advance the cursor past exactly one complete value.
    pub fn skip(&mut self) -> Result<()> {
        let mut depth = 0usize;
        loop {
            let (tag, at) = self.read_tag()?;
            match tag {
                Tag::Null | Tag::True | Tag::False => {}
                Tag::Scalar(dtype) => {
                    self.skip_forward(dtype.size() as u64)?;
                }
                Tag::Str | Tag::Bin => {
                    let len = self.read_length()?;
                    self.skip_forward(len)?;
                }
                Tag::Array => {
                    let header = self.read_array_header_body()?;
                    self.skip_forward(header.payload_len())?;
                }
                Tag::ListOpen | Tag::DictOpen => {
                    depth += 1;
                }
                Tag::ListClose | Tag::DictClose => {
                    if depth == 0 {
                        // A bare terminator is not a value.
                        self.seek_to(at)?;
                        return Err(Error::UnexpectedTag {
                            tag: tag.to_u8(),
                            offset: at,
                        });
                    }
                    depth -= 1;
                }
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }

    /// Enter the container at the cursor, pushing a path frame and
    /// leaving the cursor at its first child (or terminator).
    pub fn enter(&mut self) -> Result<ContainerKind> {
        let (tag, at) = self.read_tag()?;
        let kind = match tag {
            Tag::ListOpen => ContainerKind::List,
            Tag::DictOpen => ContainerKind::Dict,
            other => {
                self.seek_to(at)?;
                return Err(Error::TypeMismatch {
                    expected: "list or dict",
                    actual: tag_kind(other),
                });
            }
        };
        let content_start = self.pos()?;
        self.frames.push(NavFrame {
            kind,
            content_start,
        });
        trace!(?kind, content_start, "entered container");
        Ok(kind)
    }

    /// Length of the value at the cursor: list child count, dict pair
    /// count, or the size of an array's first axis. The cursor does
    /// not move.
    pub fn len(&mut self) -> Result<usize> {
        let save = self.pos()?;
        let result = self.len_inner();
        self.seek_to(save)?;
        result
    }

    /// True when the value at the cursor is an empty container (or an
    /// array with an empty first axis).
    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn len_inner(&mut self) -> Result<usize> {
        let (tag, at) = self.read_tag()?;
        match tag {
            Tag::ListOpen => {
                let mut count = 0;
                while !self.next_is(Tag::ListClose)? {
                    self.skip()?;
                    count += 1;
                }
                Ok(count)
            }
            Tag::DictOpen => {
                let mut count = 0;
                while !self.next_is(Tag::DictClose)? {
                    self.skip()?; // key
                    self.skip()?; // value
                    count += 1;
                }
                Ok(count)
            }
            Tag::Array => {
                let header = self.read_array_header_body()?;
                Ok(header.shape[0])
            }
            other => {
                self.seek_to(at)?;
                Err(Error::TypeMismatch {
                    expected: "list, dict, or array",
                    actual: tag_kind(other),
                })
            }
        }
    }

    /// Keys of the dict at the cursor, in file order. The cursor does
    /// not move.
    pub fn keys(&mut self) -> Result<Vec<String>> {
        let save = self.pos()?;
        let result = self.keys_inner();
        self.seek_to(save)?;
        result
    }

    fn keys_inner(&mut self) -> Result<Vec<String>> {
        let (tag, at) = self.read_tag()?;
        if tag != Tag::DictOpen {
            self.seek_to(at)?;
            return Err(Error::TypeMismatch {
                expected: "dict",
                actual: tag_kind(tag),
            });
        }
        let mut keys = Vec::new();
        while !self.next_is(Tag::DictClose)? {
            keys.push(self.read_string()?);
            self.skip()?;
        }
        Ok(keys)
    }

    /// Current cursor offset into the source.
    pub fn pos(&mut self) -> Result<u64> {
        Ok(self.src.stream_position()?)
    }

    // -- internal cursor plumbing --

    pub(crate) fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.src.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Read and classify one tag byte. On an unknown byte the cursor
    /// is restored so it rests on the offending position.
    pub(crate) fn read_tag(&mut self) -> Result<(Tag, u64)> {
        let at = self.pos()?;
        if at >= self.end {
            return Err(Error::TruncatedPayload);
        }
        let byte = codec::read_u8(&mut self.src, self.order)?;
        match Tag::from_u8(byte) {
            Some(tag) => Ok((tag, at)),
            None => {
                self.seek_to(at)?;
                Err(Error::UnexpectedTag {
                    tag: byte,
                    offset: at,
                })
            }
        }
    }

    /// True when the next tag equals `expected`; does not advance.
    pub(crate) fn next_is(&mut self, expected: Tag) -> Result<bool> {
        Ok(self.peek_tag()? == expected)
    }

    /// Parse a compact length and bounds-check it against the bytes
    /// remaining in the stream.
    pub(crate) fn read_length(&mut self) -> Result<u64> {
        let at = self.pos()?;
        let len = codec::read_length(&mut self.src, self.order, at)?;
        let pos = self.pos()?;
        if len > self.end - pos {
            self.seek_to(at)?;
            return Err(Error::InvalidLength {
                len,
                remaining: self.end - pos,
            });
        }
        Ok(len)
    }

    /// Parse a compact length that counts elements rather than bytes
    /// (array ranks and dimensions), so no byte-span check applies.
    pub(crate) fn read_count(&mut self) -> Result<u64> {
        let at = self.pos()?;
        codec::read_length(&mut self.src, self.order, at)
    }

    /// Advance the cursor by `len` bytes, staying within the stream.
    pub(crate) fn skip_forward(&mut self, len: u64) -> Result<()> {
        let pos = self.pos()?;
        if len > self.end - pos {
            return Err(Error::InvalidLength {
                len,
                remaining: self.end - pos,
            });
        }
        self.src.seek(SeekFrom::Current(len as i64))?;
        Ok(())
    }

    /// Read exactly `len` bytes at the cursor.
    pub(crate) fn take(&mut self, len: u64) -> Result<Vec<u8>> {
        let pos = self.pos()?;
        if len > self.end - pos {
            return Err(Error::InvalidLength {
                len,
                remaining: self.end - pos,
            });
        }
        let mut buf = vec![0u8; len as usize];
        self.src.read_exact(&mut buf).map_err(Error::from_read)?;
        Ok(buf)
    }

    /// Read a string value (tag, length, UTF-8 payload) at the cursor.
    pub(crate) fn read_string(&mut self) -> Result<String> {
        let (tag, at) = self.read_tag()?;
        if tag != Tag::Str {
            self.seek_to(at)?;
            return Err(Error::UnexpectedTag {
                tag: tag.to_u8(),
                offset: at,
            });
        }
        let len = self.read_length()?;
        let payload_start = self.pos()?;
        let bytes = self.take(len)?;
        match std::str::from_utf8(&bytes) {
            Ok(s) => Ok(s.to_string()),
            Err(e) => {
                self.seek_to(payload_start + e.valid_up_to() as u64)?;
                Err(e.into())
            }
        }
    }

    /// Parse the array header after its tag has been consumed,
    /// leaving the cursor at the payload start.
    pub(crate) fn read_array_header_body(&mut self) -> Result<ArrayHeader> {
        let rank = self.read_count()?;
        let remaining = self.end - self.pos()?;
        // Every dimension needs at least a length tier, so a rank
        // beyond the remaining bytes is corrupt.
        if rank == 0 || rank > remaining {
            return Err(Error::InvalidLength {
                len: rank,
                remaining,
            });
        }
        let mut shape = Vec::with_capacity(rank as usize);
        let mut count: u64 = 1;
        for _ in 0..rank {
            let dim = self.read_count()?;
            count = count
                .checked_mul(dim)
                .ok_or(Error::InvalidLength { len: dim, remaining: 0 })?;
            shape.push(usize::try_from(dim).map_err(|_| Error::InvalidLength {
                len: dim,
                remaining: 0,
            })?);
        }
        let elem_byte = codec::read_u8(&mut self.src, self.order)?;
        let dtype = DType::from_u8(elem_byte).ok_or(Error::UnknownElementKind(elem_byte))?;

        let data_start = self.pos()?;
        let payload = count
            .checked_mul(dtype.size() as u64)
            .ok_or(Error::InvalidLength {
                len: count,
                remaining: 0,
            })?;
        if payload > self.end - data_start {
            return Err(Error::InvalidLength {
                len: payload,
                remaining: self.end - data_start,
            });
        }
        Ok(ArrayHeader {
            dtype,
            shape,
            data_start,
        })
    }

    /// Consume an array tag + header at the cursor.
    pub(crate) fn read_array_header(&mut self) -> Result<ArrayHeader> {
        let (tag, at) = self.read_tag()?;
        if tag != Tag::Array {
            self.seek_to(at)?;
            return Err(Error::TypeMismatch {
                expected: "array",
                actual: tag_kind(tag),
            });
        }
        self.read_array_header_body()
    }
}

/// Human-readable kind for a tag, for error messages.
pub(crate) fn tag_kind(tag: Tag) -> &'static str {
    match tag {
        Tag::Null => "null",
        Tag::True | Tag::False => "bool",
        Tag::Scalar(dtype) => {
            if dtype.is_float() {
                "float"
            } else if dtype.is_signed() {
                "int"
            } else {
                "uint"
            }
        }
        Tag::Str => "string",
        Tag::Bin => "bytes",
        Tag::ListOpen | Tag::ListClose => "list",
        Tag::DictOpen | Tag::DictClose => "dict",
        Tag::Array => "array",
    }
}
