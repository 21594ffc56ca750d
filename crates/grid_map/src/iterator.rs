//! Storage-order iteration over every cell

use crate::index::{unwrap_index, Index};

/// One visited cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    /// Storage slot, use it to look up layer data
    pub index: Index,
    /// Logical position relative to the map centre
    pub unwrapped: Index,
}

/// Visits every cell exactly once in storage (column-major) order
#[derive(Debug, Clone)]
pub struct GridIterator {
    size: usize,
    start: Index,
    linear: usize,
    end: usize,
}

impl GridIterator {
    pub(crate) fn new(size: usize, start: Index) -> Self {
        Self {
            size,
            start,
            linear: 0,
            end: size * size,
        }
    }
}

impl Iterator for GridIterator {
    type Item = GridCell;

    fn next(&mut self) -> Option<Self::Item> {
        if self.linear >= self.end {
            return None;
        }
        let index = Index::new(self.linear % self.size, self.linear / self.size);
        self.linear += 1;
        Some(GridCell {
            index,
            unwrapped: unwrap_index(index, self.start, self.size),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.linear;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GridIterator {}
