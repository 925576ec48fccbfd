//! Token-by-token structural dump for debugging encoded streams.
//!
//! The exact text is not part of the format contract; it exists so a
//! human can eyeball what a file contains without materializing it.

use std::io::{Read, Seek};

use crate::error::Result;
use crate::tag::Tag;

use super::Navigator;

/// Formatting knobs for [`Navigator::read_debug`].
#[derive(Debug, Clone, Copy)]
pub struct DebugOptions {
    /// Spaces per nesting level
    pub indent_size: usize,
    /// Indentation stops growing past this depth
    pub max_indent_level: usize,
    /// Payload preview cap, in bytes
    pub max_binary_bytes: usize,
}

impl Default for DebugOptions {
    fn default() -> Self {
        Self {
            indent_size: 2,
            max_indent_level: 10,
            max_binary_bytes: 15,
        }
    }
}

/// Lazy line-per-token iterator; see [`Navigator::read_debug`].
pub struct DebugLines<'a, R: Read + Seek> {
    nav: &'a mut Navigator<R>,
    options: DebugOptions,
    indent: usize,
    done: bool,
}

impl<R: Read + Seek> Navigator<R> {
    /// Dump the stream as indented text lines, one per token, lazily.
    /// Rewinds to the root first.
    pub fn read_debug(&mut self, options: DebugOptions) -> Result<DebugLines<'_, R>> {
        self.rewind()?;
        Ok(DebugLines {
            nav: self,
            options,
            indent: 0,
            done: false,
        })
    }
}

impl<R: Read + Seek> Iterator for DebugLines<'_, R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read + Seek> DebugLines<'_, R> {
    fn step(&mut self) -> Result<Option<String>> {
        if self.nav.pos()? >= self.nav.end {
            return Ok(None);
        }
        let (tag, _) = self.nav.read_tag()?;
        let line = match tag {
            Tag::ListOpen => {
                let line = format!("{}[", self.pad());
                self.indent += 1;
                line
            }
            Tag::ListClose => {
                self.indent = self.indent.saturating_sub(1);
                format!("{}]", self.pad())
            }
            Tag::DictOpen => {
                let line = format!("{}{{", self.pad());
                self.indent += 1;
                line
            }
            Tag::DictClose => {
                self.indent = self.indent.saturating_sub(1);
                format!("{}}}", self.pad())
            }
            Tag::Null => format!("{}null", self.pad()),
            Tag::True => format!("{}true", self.pad()),
            Tag::False => format!("{}false", self.pad()),
            Tag::Scalar(dtype) => {
                let bytes = self.nav.take(dtype.size() as u64)?;
                format!("{}{}: {}", self.pad(), dtype, hex(&bytes))
            }
            Tag::Str => {
                let len = self.nav.read_length()?;
                let (preview, truncated) = self.preview(len)?;
                let body = match std::str::from_utf8(&preview) {
                    Ok(s) if !truncated => format!("{s:?}"),
                    _ => hex_capped(&preview, len),
                };
                format!("{}str({len}): {body}", self.pad())
            }
            Tag::Bin => {
                let len = self.nav.read_length()?;
                let (preview, _) = self.preview(len)?;
                format!("{}bin({len}): {}", self.pad(), hex_capped(&preview, len))
            }
            Tag::Array => {
                let header = self.nav.read_array_header_body()?;
                let len = header.payload_len();
                let (preview, _) = self.preview(len)?;
                format!(
                    "{}array {} {:?}: {}",
                    self.pad(),
                    header.dtype,
                    header.shape,
                    hex_capped(&preview, len),
                )
            }
        };
        Ok(Some(line))
    }

    /// Read up to the preview cap and skip the rest of the payload.
    fn preview(&mut self, len: u64) -> Result<(Vec<u8>, bool)> {
        let cap = self.options.max_binary_bytes as u64;
        let shown = len.min(cap);
        let bytes = self.nav.take(shown)?;
        self.nav.skip_forward(len - shown)?;
        Ok((bytes, shown < len))
    }

    fn pad(&self) -> String {
        " ".repeat(self.indent.min(self.options.max_indent_level) * self.options.indent_size)
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn hex_capped(preview: &[u8], total: u64) -> String {
    if (preview.len() as u64) < total {
        format!("{} ... ({total} bytes total)", hex(preview))
    } else {
        hex(preview)
    }
}
