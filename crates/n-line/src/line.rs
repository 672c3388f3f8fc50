//! Line buffer: one line of text as a growable byte sequence.
//!
//! The editing model is byte/column oriented: every byte the user types is
//! one slot in the buffer. Storage grows geometrically (doubling from a
//! small minimum) and all growth is fallible, so an allocation failure
//! surfaces as [`EditError::OutOfMemory`] instead of aborting the process.
//!
//! Interior insert and erase shift the tail of the line, which is O(line
//! length). Terminal input is human-paced; a line is never long enough for
//! that to matter.

use std::fmt;

use crate::error::{EditError, Result};

/// Capacity of a buffer's first allocation.
pub const MIN_CAPACITY: usize = 32;

/// A resizable byte sequence with insert/erase at arbitrary offsets.
///
/// Invariant: `len() <= capacity()`. `capacity()` reports the logical
/// capacity this buffer has grown to, independent of allocator rounding.
#[derive(Clone, Default)]
pub struct LineBuffer {
    bytes: Vec<u8>,
    capacity: usize,
}

impl LineBuffer {
    /// An empty buffer. Nothing is allocated until the first insert.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: Vec::new(),
            capacity: 0,
        }
    }

    /// A buffer holding a copy of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::OutOfMemory`] if allocation fails.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut line = Self::new();
        line.extend(bytes)?;
        Ok(line)
    }

    /// Number of bytes in the line.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Logical capacity: how many bytes fit before the next reallocation.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// The line's content.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte at `offset`, if any.
    #[inline]
    #[must_use]
    pub fn get(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }

    /// Guarantee room for at least `n` bytes.
    ///
    /// Doubles the current capacity (or starts from [`MIN_CAPACITY`]) until
    /// it reaches `n`, then reallocates once.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::OutOfMemory`] if the capacity computation
    /// overflows or the allocation fails. The buffer is unchanged on error.
    pub fn ensure_capacity(&mut self, n: usize) -> Result<()> {
        if n <= self.capacity {
            return Ok(());
        }

        let mut cap = if self.capacity == 0 {
            MIN_CAPACITY
        } else {
            self.capacity
        };
        while cap < n {
            cap = cap.checked_mul(2).ok_or(EditError::OutOfMemory)?;
        }

        self.bytes
            .try_reserve_exact(cap - self.bytes.len())
            .map_err(|_| EditError::OutOfMemory)?;
        self.capacity = cap;
        Ok(())
    }

    /// Insert `byte` at `offset`, shifting the tail right by one.
    ///
    /// `offset` must be `<= len()`; larger offsets append.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::OutOfMemory`] if growing fails.
    pub fn insert_at(&mut self, offset: usize, byte: u8) -> Result<()> {
        debug_assert!(offset <= self.len(), "insert offset {offset} past end");
        let offset = offset.min(self.len());
        self.ensure_capacity(self.len() + 1)?;
        self.bytes.insert(offset, byte);
        Ok(())
    }

    /// Remove `count` bytes starting at `offset`, shifting the tail left.
    ///
    /// `offset + count` must be `<= len()`; the range is clamped otherwise.
    pub fn erase_at(&mut self, offset: usize, count: usize) {
        debug_assert!(
            offset.saturating_add(count) <= self.len(),
            "erase {offset}+{count} past end"
        );
        let start = offset.min(self.len());
        let end = offset.saturating_add(count).min(self.len());
        self.bytes.drain(start..end);
    }

    /// Append one byte.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::OutOfMemory`] if growing fails.
    pub fn push(&mut self, byte: u8) -> Result<()> {
        self.ensure_capacity(self.len() + 1)?;
        self.bytes.push(byte);
        Ok(())
    }

    /// Append a run of bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::OutOfMemory`] if growing fails.
    pub fn extend(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.ensure_capacity(self.len() + bytes.len())?;
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    /// Replace the whole content.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::OutOfMemory`] if growing fails.
    pub fn set(&mut self, bytes: &[u8]) -> Result<()> {
        self.bytes.clear();
        self.extend(bytes)
    }

    /// Shorten the line to `len` bytes. No-op if already shorter.
    /// Capacity is kept.
    pub fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }

    /// Empty the line, keeping capacity.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Split at `offset`: this buffer keeps `[..offset]`, the returned
    /// buffer gets a copy of `[offset..]`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::OutOfMemory`] if the new buffer can't be
    /// allocated. This buffer is unchanged on error.
    pub fn split_off(&mut self, offset: usize) -> Result<Self> {
        let offset = offset.min(self.len());
        let tail = Self::from_bytes(&self.bytes[offset..])?;
        self.truncate(offset);
        Ok(tail)
    }

    /// Export an owned copy of the content as text.
    ///
    /// The editor only ever stores ASCII, so this is lossless in practice.
    #[must_use]
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Export the content as text and leave this buffer empty and
    /// unallocated.
    pub fn take(&mut self) -> String {
        let bytes = std::mem::take(&mut self.bytes);
        self.capacity = 0;
        String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
    }
}

impl PartialEq for LineBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for LineBuffer {}

impl fmt::Debug for LineBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineBuffer")
            .field("text", &String::from_utf8_lossy(&self.bytes))
            .field("capacity", &self.capacity)
            .finish()
    }
}
