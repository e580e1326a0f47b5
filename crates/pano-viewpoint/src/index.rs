//! Bounds-checked indices and per-index flag arrays
//!
//! Navigation and loading state address viewpoints and landmarks by position.
//! [`BoundedIndex`] carries the collection length with the index so stepping
//! and clamping cannot leave the valid range; [`IndexFlags`] replaces loose
//! index-keyed maps with a dense array sized to the collection.

use serde::Serialize;

/// An index known to be in `[0, len)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BoundedIndex {
    index: usize,
    len: usize,
}

impl BoundedIndex {
    /// Validate `index` against `len`
    #[inline]
    #[must_use]
    pub fn new(index: usize, len: usize) -> Option<Self> {
        (index < len).then_some(Self { index, len })
    }

    /// Clamp `index` into `[0, len)`; `None` when the collection is empty
    #[inline]
    #[must_use]
    pub fn clamped(index: usize, len: usize) -> Option<Self> {
        (len > 0).then(|| Self {
            index: index.min(len - 1),
            len,
        })
    }

    /// First index of a non-empty collection
    #[inline]
    #[must_use]
    pub fn first(len: usize) -> Option<Self> {
        Self::new(0, len)
    }

    /// Raw index
    #[inline]
    #[must_use]
    pub fn get(self) -> usize {
        self.index
    }

    /// Collection length
    #[inline]
    #[must_use]
    pub fn len(self) -> usize {
        self.len
    }

    /// Never true; a bounded index implies a non-empty collection
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len == 0
    }

    /// Step by `delta`, wrapping modulo the length
    #[must_use]
    pub fn wrapping_offset(self, delta: isize) -> Self {
        let len = self.len as isize;
        let index = (self.index as isize + delta).rem_euclid(len);
        Self {
            index: index as usize,
            len: self.len,
        }
    }
}

/// Dense per-index boolean flags
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IndexFlags {
    flags: Vec<bool>,
}

impl IndexFlags {
    /// All-clear flags for a collection of `len`
    #[inline]
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            flags: vec![false; len],
        }
    }

    /// Number of slots
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether there are no slots
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Set flag; returns `false` when `index` is out of range
    #[inline]
    pub fn set(&mut self, index: usize) -> bool {
        self.assign(index, true)
    }

    /// Clear flag; returns `false` when `index` is out of range
    #[inline]
    pub fn clear(&mut self, index: usize) -> bool {
        self.assign(index, false)
    }

    /// Assign flag value; returns `false` when `index` is out of range
    pub fn assign(&mut self, index: usize, value: bool) -> bool {
        match self.flags.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Flag value; out-of-range reads as clear
    #[inline]
    #[must_use]
    pub fn is_set(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    /// Number of set flags
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.flags.iter().filter(|f| **f).count()
    }

    /// Whether any flag is set
    #[inline]
    #[must_use]
    pub fn any(&self) -> bool {
        self.flags.iter().any(|f| *f)
    }

    /// Indices with the flag set, ascending
    pub fn iter_set(&self) -> impl Iterator<Item = usize> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.then_some(i))
    }

    /// Clear every flag
    #[inline]
    pub fn clear_all(&mut self) {
        self.flags.iter_mut().for_each(|f| *f = false);
    }

    /// Resize to `len`, clearing all flags
    #[inline]
    pub fn reset(&mut self, len: usize) {
        self.flags.clear();
        self.flags.resize(len, false);
    }
}
