//! Cell indices and circular-buffer index arithmetic.

use serde::{Deserialize, Serialize};

/// A `(row, col)` cell index.
///
/// Whether it is a storage slot or a logical position depends on context,
/// see [`wrap_index`] and [`unwrap_index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Index {
    pub row: usize,
    pub col: usize,
}

impl Index {
    /// Create a new index
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Map a logical (unwrapped) index to its storage slot.
///
/// `start` is the buffer start index, both `unwrapped` and `start` must be
/// smaller than `size` on each axis.
#[inline]
pub fn wrap_index(unwrapped: Index, start: Index, size: usize) -> Index {
    Index::new(
        (unwrapped.row + start.row) % size,
        (unwrapped.col + start.col) % size,
    )
}

/// Map a storage slot back to its logical (unwrapped) index.
#[inline]
pub fn unwrap_index(wrapped: Index, start: Index, size: usize) -> Index {
    Index::new(
        (wrapped.row + size - start.row) % size,
        (wrapped.col + size - start.col) % size,
    )
}

/// Apply a signed cell shift to a buffer start coordinate.
#[inline]
pub(crate) fn shift_start(start: usize, shift: i64, size: usize) -> usize {
    let size = size as i64;
    (start as i64 - shift).rem_euclid(size) as usize
}
