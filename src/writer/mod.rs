//! Encoder state machine for sequential and whole-value writes.
//!
//! A [`Writer`] owns an append-position cursor over a seekable sink
//! and a stack of open container frames. Containers can be written
//! whole via [`Writer::write_value`] or built incrementally through
//! [`Handle`]s, which stay usable while their container is open:
//! adding through an ancestor handle first closes every deeper open
//! container, so the byte stream always nests correctly.

mod array;
mod value;

use std::collections::HashSet;
use std::io::{Read, Seek, SeekFrom, Write};

use tracing::{debug, trace};

use crate::codec::ByteOrder;
use crate::error::{Error, Result};
use crate::tag;
use crate::types::{DType, Value};

use value::emit_string;

/// Reference to an open container frame.
///
/// Handles are plain tokens: a stack depth plus the serial stamped on
/// the frame when it was opened. A closed container's frame is gone
/// (or reoccupied under a different serial), so staleness is a single
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle {
    depth: usize,
    serial: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    List,
    Dict,
}

struct Frame {
    kind: FrameKind,
    serial: u64,
    opened_at: u64,
    /// Dict only: a key has been written and its value has not
    awaiting_value: bool,
    /// Keys seen so far, tracked only in strict mode
    seen_keys: Option<HashSet<String>>,
}

/// Streaming encoder over a seekable byte sink.
pub struct Writer<W: Write + Seek> {
    sink: W,
    order: ByteOrder,
    frames: Vec<Frame>,
    next_serial: u64,
    root_written: bool,
    strict_keys: bool,
}

impl<W: Write + Seek> Writer<W> {
    /// Open a fresh sink for writing a new root value.
    pub fn new(sink: W, order: ByteOrder) -> Self {
        Self {
            sink,
            order,
            frames: Vec::new(),
            next_serial: 0,
            root_written: false,
            strict_keys: false,
        }
    }

    /// Re-open a sink that already holds a complete root container.
    ///
    /// Reads the final byte; if it is a list or dict terminator the
    /// cursor is parked on that terminator slot so the next child
    /// overwrites it, and the matching root frame is pushed. A scalar
    /// or array root (or an empty sink) fails with
    /// [`Error::RootNotExtensible`].
    pub fn append(mut sink: W, order: ByteOrder) -> Result<Self>
    where
        W: Read,
    {
        let end = sink.seek(SeekFrom::End(0))?;
        if end == 0 {
            return Err(Error::RootNotExtensible);
        }
        sink.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        sink.read_exact(&mut last).map_err(Error::from_read)?;
        let kind = match last[0] {
            tag::LIST_CLOSE => FrameKind::List,
            tag::DICT_CLOSE => FrameKind::Dict,
            _ => return Err(Error::RootNotExtensible),
        };
        debug!(?kind, len = end, "re-opening root container for append");
        // Park on the terminator slot; it is re-emitted on close.
        sink.seek(SeekFrom::End(-1))?;

        let mut writer = Self::new(sink, order);
        writer.root_written = true;
        writer.push_frame(kind, end - 1);
        Ok(writer)
    }

    /// Reject duplicate keys within a single dict from now on.
    pub fn set_strict_keys(&mut self, strict: bool) {
        self.strict_keys = strict;
    }

    /// Write one complete value at the current insertion point.
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        self.begin_value()?;
        value::emit_value(&mut self.sink, self.order, value, self.strict_keys)?;
        self.end_value();
        Ok(())
    }

    /// Write an array from a raw payload at the current insertion
    /// point. `data` must be `product(shape) * dtype.size()` bytes of
    /// native-order elements.
    pub fn write_array(&mut self, dtype: DType, shape: &[usize], data: &[u8]) -> Result<()> {
        self.begin_value()?;
        array::emit_array(&mut self.sink, self.order, dtype, shape, data)?;
        self.end_value();
        Ok(())
    }

    /// Open a list where a value is expected and return its handle.
    pub fn open_list(&mut self) -> Result<Handle> {
        self.open_container(FrameKind::List)
    }

    /// Open a dict where a value is expected and return its handle.
    pub fn open_dict(&mut self) -> Result<Handle> {
        self.open_container(FrameKind::Dict)
    }

    /// Handle of the innermost still-open container.
    pub fn last(&self) -> Option<Handle> {
        self.frames.last().map(|frame| Handle {
            depth: self.frames.len() - 1,
            serial: frame.serial,
        })
    }

    /// Append a value to the container behind `handle`, closing any
    /// containers opened inside it since.
    pub fn add(&mut self, handle: Handle, value: &Value) -> Result<()> {
        self.rewind_to(handle)?;
        self.write_value(value)
    }

    /// Write a dict key through `handle`; the next `add` supplies its
    /// value.
    pub fn key(&mut self, handle: Handle, key: &str) -> Result<()> {
        self.rewind_to(handle)?;
        let frame = self.frames.last_mut().ok_or(Error::HandleClosed)?;
        if frame.kind != FrameKind::Dict {
            return Err(Error::TypeMismatch {
                expected: "dict",
                actual: "list",
            });
        }
        if frame.awaiting_value {
            return Err(Error::TypeMismatch {
                expected: "value",
                actual: "key",
            });
        }
        if let Some(seen) = frame.seen_keys.as_mut() {
            if !seen.insert(key.to_string()) {
                return Err(Error::DuplicateKey(key.to_string()));
            }
        }
        emit_string(&mut self.sink, self.order, key)?;
        let frame = self.frames.last_mut().ok_or(Error::HandleClosed)?;
        frame.awaiting_value = true;
        Ok(())
    }

    /// `key` + `add` in one call.
    pub fn insert(&mut self, handle: Handle, key: &str, value: &Value) -> Result<()> {
        self.key(handle, key)?;
        self.add(handle, value)
    }

    /// Append an array through `handle`; see [`Writer::write_array`].
    pub fn add_array(
        &mut self,
        handle: Handle,
        dtype: DType,
        shape: &[usize],
        data: &[u8],
    ) -> Result<()> {
        self.rewind_to(handle)?;
        self.write_array(dtype, shape, data)
    }

    /// Close the container behind `handle`, and everything open
    /// inside it, emitting terminators innermost-first.
    pub fn close(&mut self, handle: Handle) -> Result<()> {
        self.rewind_to(handle)?;
        self.close_top()
    }

    /// Close every open container in LIFO order and flush the sink.
    pub fn finish(&mut self) -> Result<()> {
        while !self.frames.is_empty() {
            self.close_top()?;
        }
        self.sink.flush()?;
        debug!("writer finished");
        Ok(())
    }

    /// Consume the writer and hand back the sink. Call
    /// [`Writer::finish`] first; open containers are not terminated
    /// here.
    pub fn into_inner(self) -> W {
        self.sink
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    fn open_container(&mut self, kind: FrameKind) -> Result<Handle> {
        self.begin_value()?;
        let opened_at = self.sink.stream_position()?;
        let open_tag = match kind {
            FrameKind::List => tag::LIST_OPEN,
            FrameKind::Dict => tag::DICT_OPEN,
        };
        self.sink.write_all(&[open_tag])?;
        Ok(self.push_frame(kind, opened_at))
    }

    fn push_frame(&mut self, kind: FrameKind, opened_at: u64) -> Handle {
        let serial = self.next_serial;
        self.next_serial += 1;
        trace!(?kind, serial, opened_at, "open container");
        self.frames.push(Frame {
            kind,
            serial,
            opened_at,
            awaiting_value: false,
            seen_keys: self.strict_keys.then(HashSet::new),
        });
        Handle {
            depth: self.frames.len() - 1,
            serial,
        }
    }

    /// Ensure `handle` is live, then close every frame nested deeper.
    fn rewind_to(&mut self, handle: Handle) -> Result<()> {
        match self.frames.get(handle.depth) {
            Some(frame) if frame.serial == handle.serial => {
                while self.frames.len() > handle.depth + 1 {
                    self.close_top()?;
                }
                Ok(())
            }
            _ => Err(Error::HandleClosed),
        }
    }

    fn close_top(&mut self) -> Result<()> {
        // Refuse before popping so a failed close leaves the frame
        // stack intact.
        match self.frames.last() {
            None => return Err(Error::HandleClosed),
            Some(frame) if frame.awaiting_value => {
                return Err(Error::TypeMismatch {
                    expected: "value",
                    actual: "close",
                })
            }
            Some(_) => {}
        }
        let frame = self.frames.pop().ok_or(Error::HandleClosed)?;
        let close_tag = match frame.kind {
            FrameKind::List => tag::LIST_CLOSE,
            FrameKind::Dict => tag::DICT_CLOSE,
        };
        self.sink.write_all(&[close_tag])?;
        trace!(kind = ?frame.kind, serial = frame.serial, opened_at = frame.opened_at, "close container");
        self.value_completed();
        Ok(())
    }

    /// State check before emitting a value at the insertion point.
    fn begin_value(&mut self) -> Result<()> {
        match self.frames.last() {
            None => {
                if self.root_written {
                    Err(Error::TypeMismatch {
                        expected: "open container",
                        actual: "finished root",
                    })
                } else {
                    Ok(())
                }
            }
            Some(frame) if frame.kind == FrameKind::Dict && !frame.awaiting_value => {
                Err(Error::TypeMismatch {
                    expected: "key",
                    actual: "value",
                })
            }
            Some(_) => Ok(()),
        }
    }

    fn end_value(&mut self) {
        if self.frames.is_empty() {
            self.root_written = true;
        } else {
            self.value_completed();
        }
    }

    fn value_completed(&mut self) {
        match self.frames.last_mut() {
            Some(frame) => frame.awaiting_value = false,
            None => self.root_written = true,
        }
    }
}
