//! Path resolution: keyed lookup, indexed access, and slicing.
//!
//! Containers are walked lazily (siblings are skipped, never
//! materialized); arrays are resolved with strided seeks so the
//! gather never reads bytes the selection does not cover.

use std::io::{Read, Seek};

use tracing::{debug, trace};

use crate::codec;
use crate::error::{Error, Result};
use crate::select::{resolve_index, ResolvedSlice, Selector, SliceSel};
use crate::tag::Tag;
use crate::types::{Array, Value};

use super::{tag_kind, Navigator};

/// Per-axis plan for an array gather.
#[derive(Clone, Copy)]
enum Axis {
    /// One element of this axis; contributes no output dimension
    Single(u64),
    /// A run of indices in slice order
    Sliced(ResolvedSlice),
}

impl<R: Read + Seek> Navigator<R> {
    /// Resolve a whole navigation expression and materialize the
    /// selected value.
    ///
    /// Container selectors descend without materializing siblings.
    /// Once the path reaches an array, every remaining selector
    /// applies to one of its axes. A slice on a list materializes a
    /// new list and must be the final selector.
    pub fn select(&mut self, path: &[Selector]) -> Result<Value> {
        debug!(steps = path.len(), "resolving navigation expression");
        let mut i = 0;
        loop {
            if i == path.len() {
                return self.read();
            }
            match self.peek_tag()? {
                Tag::DictOpen => {
                    self.descend(path[i].clone())?;
                    i += 1;
                }
                Tag::ListOpen => match &path[i] {
                    Selector::Index(_) => {
                        self.descend(path[i].clone())?;
                        i += 1;
                    }
                    Selector::Slice(sel) => {
                        if i + 1 != path.len() {
                            return Err(Error::TypeMismatch {
                                expected: "terminal slice",
                                actual: "slice followed by more selectors",
                            });
                        }
                        return self.slice_list(sel);
                    }
                    Selector::Key(_) => {
                        return Err(Error::TypeMismatch {
                            expected: "dict",
                            actual: "list",
                        })
                    }
                },
                Tag::Array => return self.select_array(&path[i..]),
                other => {
                    return Err(Error::TypeMismatch {
                        expected: "container",
                        actual: tag_kind(other),
                    })
                }
            }
        }
    }

    /// Apply one container selector, leaving the cursor at the start
    /// of the selected child. Returns `self` for chaining.
    pub fn descend(&mut self, selector: impl Into<Selector>) -> Result<&mut Self> {
        match (selector.into(), self.peek_tag()?) {
            (Selector::Key(key), Tag::DictOpen) => self.lookup_key(&key)?,
            (Selector::Index(index), Tag::ListOpen) => self.lookup_index(index)?,
            (Selector::Key(_), other) => {
                return Err(Error::TypeMismatch {
                    expected: "dict",
                    actual: tag_kind(other),
                })
            }
            (Selector::Index(_), other) => {
                return Err(Error::TypeMismatch {
                    expected: "list",
                    actual: tag_kind(other),
                })
            }
            (Selector::Slice(_), _) => {
                return Err(Error::TypeMismatch {
                    expected: "key or index selector",
                    actual: "slice",
                })
            }
        }
        Ok(self)
    }

    /// Walk dict entries until `key` matches; first match wins.
    fn lookup_key(&mut self, key: &str) -> Result<()> {
        trace!(key, "dict lookup");
        self.enter()?;
        loop {
            if self.next_is(Tag::DictClose)? {
                return Err(Error::KeyNotFound(key.to_string()));
            }
            let candidate = self.read_string()?;
            if candidate == key {
                return Ok(());
            }
            self.skip()?;
        }
    }

    /// Position the cursor on the list child at `index`. Negative
    /// indices first count the children, then re-seek from the
    /// container's content start.
    fn lookup_index(&mut self, index: i64) -> Result<()> {
        trace!(index, "list lookup");
        self.enter()?;
        if index >= 0 {
            let mut seen = 0usize;
            while (seen as i64) < index {
                if self.next_is(Tag::ListClose)? {
                    return Err(Error::IndexOutOfRange { index, len: seen });
                }
                self.skip()?;
                seen += 1;
            }
            if self.next_is(Tag::ListClose)? {
                return Err(Error::IndexOutOfRange { index, len: seen });
            }
            Ok(())
        } else {
            // Count the children, then re-seek from the content start
            // cached on the path frame.
            let content_start = match self.frames.last() {
                Some(frame) => frame.content_start,
                None => self.pos()?,
            };
            let mut count = 0usize;
            while !self.next_is(Tag::ListClose)? {
                self.skip()?;
                count += 1;
            }
            let resolved = resolve_index(index, count)?;
            self.seek_to(content_start)?;
            for _ in 0..resolved {
                self.skip()?;
            }
            Ok(())
        }
    }

    /// Materialize a new list from the selected child indices, in
    /// slice order. Cursor ends past the source list.
    fn slice_list(&mut self, sel: &SliceSel) -> Result<Value> {
        self.read_tag()?; // consume ListOpen
        let mut offsets = Vec::new();
        while !self.next_is(Tag::ListClose)? {
            offsets.push(self.pos()?);
            self.skip()?;
        }
        let close_at = self.pos()?;

        let resolved = sel.resolve(offsets.len())?;
        trace!(children = offsets.len(), selected = resolved.len(), "list slice");
        let mut items = Vec::with_capacity(resolved.len());
        for idx in resolved.indices() {
            self.seek_to(offsets[idx])?;
            items.push(self.read()?);
        }

        self.seek_to(close_at)?;
        self.read_tag()?; // past the terminator
        Ok(Value::List(items))
    }

    /// Resolve the remaining selectors against the array at the
    /// cursor. Full-rank integer indexing is a single seek; anything
    /// else gathers chunks by the strided-address formula.
    fn select_array(&mut self, sels: &[Selector]) -> Result<Value> {
        let header = self.read_array_header()?;
        let rank = header.shape.len();
        let width = header.dtype.size();
        if sels.len() > rank {
            return Err(Error::ShapeMismatch {
                rank,
                given: sels.len(),
            });
        }

        // Strides in elements, row-major.
        let mut strides = vec![1u64; rank];
        for i in (0..rank.saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * header.shape[i + 1] as u64;
        }
        let past_payload = header.data_start + header.payload_len();

        // Full-rank integer indexing: one seek, one element.
        if sels.len() == rank {
            let mut indices = Vec::with_capacity(rank);
            for sel in sels {
                match sel {
                    Selector::Index(i) => indices.push(*i),
                    _ => {
                        indices.clear();
                        break;
                    }
                }
            }
            if indices.len() == rank {
                let mut offset = 0u64;
                for (axis, &index) in indices.iter().enumerate() {
                    let resolved = resolve_index(index, header.shape[axis])? as u64;
                    offset += resolved * strides[axis];
                }
                self.seek_to(header.data_start + offset * width as u64)?;
                let bytes = self.take(width as u64)?;
                let value = codec::decode_element(&bytes, self.order, header.dtype)?;
                self.seek_to(past_payload)?;
                return Ok(value);
            }
        }

        // Build the per-axis plan and the output shape.
        let mut axes = Vec::with_capacity(sels.len());
        let mut out_shape = Vec::new();
        for (axis, sel) in sels.iter().enumerate() {
            match sel {
                Selector::Index(index) => {
                    axes.push(Axis::Single(resolve_index(*index, header.shape[axis])? as u64));
                }
                Selector::Slice(slice) => {
                    let resolved = slice.resolve(header.shape[axis])?;
                    out_shape.push(resolved.len());
                    axes.push(Axis::Sliced(resolved));
                }
                Selector::Key(_) => {
                    return Err(Error::TypeMismatch {
                        expected: "dict",
                        actual: "array",
                    })
                }
            }
        }
        out_shape.extend_from_slice(&header.shape[sels.len()..]);

        if out_shape.contains(&0) {
            self.seek_to(past_payload)?;
            return Ok(Value::Array(Array::new(header.dtype, out_shape, Vec::new())));
        }

        // Unspecified trailing axes are read whole; trailing
        // full-range step-1 slices merge into the same contiguous
        // chunk, and one final partial step-1 slice folds in too.
        let mut chunk_elems: u64 = header.shape[sels.len()..]
            .iter()
            .map(|&d| d as u64)
            .product();
        while let Some(Axis::Sliced(resolved)) = axes.last().copied() {
            let dim = header.shape[axes.len() - 1];
            if resolved.is_full(dim) {
                chunk_elems *= dim as u64;
                axes.pop();
            } else {
                break;
            }
        }
        if let Some(Axis::Sliced(resolved)) = axes.last().copied() {
            if resolved.step == 1 {
                chunk_elems *= resolved.len() as u64;
                let tail = axes.len() - 1;
                axes[tail] = Axis::Single(resolved.start as u64);
            }
        }

        let lists: Vec<Vec<u64>> = axes
            .iter()
            .map(|axis| match axis {
                Axis::Single(v) => vec![*v],
                Axis::Sliced(resolved) => resolved.indices().map(|i| i as u64).collect(),
            })
            .collect();

        let chunk_bytes = chunk_elems * width as u64;
        let total: usize = out_shape.iter().product();
        trace!(rank, chunk_bytes, total, "array gather");
        let mut data = Vec::with_capacity(total * width);

        // Odometer over the remaining axes, last axis fastest, which
        // is exactly row-major order of the output shape.
        let mut combo = vec![0usize; lists.len()];
        'outer: loop {
            let mut elem_offset = 0u64;
            for (axis, &j) in combo.iter().enumerate() {
                elem_offset += lists[axis][j] * strides[axis];
            }
            self.seek_to(header.data_start + elem_offset * width as u64)?;
            let chunk = self.take(chunk_bytes)?;
            data.extend_from_slice(&chunk);

            let mut axis = lists.len();
            while axis > 0 {
                axis -= 1;
                combo[axis] += 1;
                if combo[axis] < lists[axis].len() {
                    continue 'outer;
                }
                combo[axis] = 0;
            }
            break;
        }

        codec::payload_to_native(&mut data, self.order, header.dtype);
        self.seek_to(past_payload)?;
        Ok(Value::Array(Array::new(header.dtype, out_shape, data)))
    }
}
