//! Navigation selectors and slice-bound resolution.
//!
//! A navigation expression is a sequence of selectors: dict key
//! lookups, integer indices (negative counts from the end), and slice
//! triples with the standard half-open semantics.

use crate::error::{Error, Result};

/// One step of a navigation expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Dict key lookup
    Key(String),
    /// List or array index; negative counts from the end
    Index(i64),
    /// List or array-axis slice
    Slice(SliceSel),
}

impl Selector {
    pub fn key(k: impl Into<String>) -> Selector {
        Selector::Key(k.into())
    }

    pub fn index(i: i64) -> Selector {
        Selector::Index(i)
    }

    pub fn slice(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Selector {
        Selector::Slice(SliceSel { start, stop, step })
    }

    /// Full-range slice, `[:]`
    pub fn full() -> Selector {
        Selector::Slice(SliceSel::default())
    }
}

impl From<&str> for Selector {
    fn from(k: &str) -> Self {
        Selector::Key(k.to_string())
    }
}

impl From<String> for Selector {
    fn from(k: String) -> Self {
        Selector::Key(k)
    }
}

impl From<i64> for Selector {
    fn from(i: i64) -> Self {
        Selector::Index(i)
    }
}

impl From<i32> for Selector {
    fn from(i: i32) -> Self {
        Selector::Index(i.into())
    }
}

impl From<std::ops::Range<i64>> for Selector {
    fn from(r: std::ops::Range<i64>) -> Self {
        Selector::slice(Some(r.start), Some(r.end), None)
    }
}

impl From<std::ops::RangeFull> for Selector {
    fn from(_: std::ops::RangeFull) -> Self {
        Selector::full()
    }
}

/// Unresolved slice bounds; `None` means "default for the step sign".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SliceSel {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl SliceSel {
    /// Resolve against a known length, clamping bounds the way the
    /// standard half-open slice semantics require. Step 0 is rejected.
    pub(crate) fn resolve(&self, len: usize) -> Result<ResolvedSlice> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(Error::InvalidSlice);
        }
        let len = len as i64;
        let (lower, upper) = if step > 0 { (0, len) } else { (-1, len - 1) };

        let start = match self.start {
            None => {
                if step > 0 {
                    lower
                } else {
                    upper
                }
            }
            Some(s) if s < 0 => (s + len).max(lower),
            Some(s) => s.min(upper),
        };
        let stop = match self.stop {
            None => {
                if step > 0 {
                    upper
                } else {
                    lower
                }
            }
            Some(s) if s < 0 => (s + len).max(lower),
            Some(s) => s.min(upper),
        };

        Ok(ResolvedSlice { start, stop, step })
    }
}

/// Slice bounds after resolution; `start` is in range, `stop` is
/// exclusive in the direction of `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResolvedSlice {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
}

impl ResolvedSlice {
    /// Number of selected indices
    pub(crate) fn len(&self) -> usize {
        let span = if self.step > 0 {
            self.stop - self.start
        } else {
            self.start - self.stop
        };
        if span <= 0 {
            0
        } else {
            ((span - 1) / self.step.abs() + 1) as usize
        }
    }

    /// Selected indices, in slice order
    pub(crate) fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len() as i64).map(move |k| (self.start + k * self.step) as usize)
    }

    /// True when this selects every index, ascending with step 1
    pub(crate) fn is_full(&self, len: usize) -> bool {
        self.step == 1 && self.start == 0 && self.len() == len
    }
}

/// Normalize a possibly-negative index against a length.
pub(crate) fn resolve_index(index: i64, len: usize) -> Result<usize> {
    let adjusted = if index < 0 {
        index + len as i64
    } else {
        index
    };
    if adjusted < 0 || adjusted >= len as i64 {
        Err(Error::IndexOutOfRange { index, len })
    } else {
        Ok(adjusted as usize)
    }
}
