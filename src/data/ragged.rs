//! Ragged collections backed by a flat buffer plus per-row offsets
//!
//! Sequence tasks produce one variable-length row per instance. Instead of
//! nested `Vec<Vec<T>>`, rows live in one contiguous buffer and an offsets
//! array marks row boundaries: `offsets[0] == 0`, `offsets[i]..offsets[i + 1]`
//! is row `i`, `offsets[num_rows] == buffer.len()`. Flattening and
//! unflattening is index arithmetic over this representation.

use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView2};
use std::ops::Range;

/// A ragged array of `T`: variable-length rows over a flat buffer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RaggedArray<T> {
    data: Vec<T>,
    offsets: Vec<usize>,
}

impl<T> RaggedArray<T> {
    /// Create an empty ragged array
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            offsets: vec![0],
        }
    }

    /// Build from nested rows, consuming them into the flat representation
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<T>>,
    {
        let mut out = Self::new();
        for row in rows {
            out.push_row(row);
        }
        out
    }

    /// Append one row
    pub fn push_row(&mut self, row: Vec<T>) {
        self.data.extend(row);
        self.offsets.push(self.data.len());
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Total number of sub-units across all rows
    pub fn total_len(&self) -> usize {
        self.data.len()
    }

    /// Whether the array holds no rows
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Row `i` as a slice
    pub fn row(&self, i: usize) -> &[T] {
        &self.data[self.flat_range(i)]
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        (0..self.num_rows()).map(|i| self.row(i))
    }

    /// Per-row lengths
    pub fn sizes(&self) -> Vec<usize> {
        self.offsets.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// The flat buffer spanning all rows in order
    pub fn flat(&self) -> &[T] {
        &self.data
    }

    /// The offsets array (`num_rows + 1` entries)
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Flat index range covered by row `i`
    pub fn flat_range(&self, i: usize) -> Range<usize> {
        self.offsets[i]..self.offsets[i + 1]
    }
}

impl<T: Clone> RaggedArray<T> {
    /// New ragged array holding the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut out = Self::new();
        for &i in indices {
            out.push_row(self.row(i).to_vec());
        }
        out
    }
}

impl<T> FromIterator<Vec<T>> for RaggedArray<T> {
    fn from_iter<I: IntoIterator<Item = Vec<T>>>(iter: I) -> Self {
        Self::from_rows(iter)
    }
}

/// Ragged probability output: one class distribution per sub-unit.
///
/// Rows of `data` are sub-unit distributions flattened across all sequences;
/// `offsets` carries the same row boundaries as the input [`RaggedArray`].
#[derive(Clone, Debug, PartialEq)]
pub struct RaggedMatrix {
    data: Array2<f64>,
    offsets: Vec<usize>,
}

impl RaggedMatrix {
    /// Build from the flat distribution matrix and row offsets.
    ///
    /// The offsets must start at 0, be non-decreasing, and end at the number
    /// of matrix rows.
    pub fn new(data: Array2<f64>, offsets: Vec<usize>) -> Result<Self> {
        let valid = offsets.first() == Some(&0)
            && offsets.windows(2).all(|w| w[0] <= w[1])
            && offsets.last() == Some(&data.nrows());
        if !valid {
            return Err(Error::InvalidParameter(
                "offsets do not partition the distribution matrix".into(),
            ));
        }
        Ok(Self { data, offsets })
    }

    /// Build from one distribution block per sequence
    pub fn from_blocks(blocks: &[Array2<f64>]) -> Result<Self> {
        let num_classes = blocks.first().map_or(0, |b| b.ncols());
        let total: usize = blocks.iter().map(|b| b.nrows()).sum();
        let mut data = Array2::zeros((total, num_classes));
        let mut offsets = Vec::with_capacity(blocks.len() + 1);
        offsets.push(0);
        let mut start = 0;
        for block in blocks {
            if block.ncols() != num_classes {
                return Err(Error::ClassCountMismatch {
                    expected: num_classes,
                    actual: block.ncols(),
                });
            }
            data.slice_mut(ndarray::s![start..start + block.nrows(), ..])
                .assign(block);
            start += block.nrows();
            offsets.push(start);
        }
        Ok(Self { data, offsets })
    }

    /// Number of sequences
    pub fn num_rows(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Total number of sub-units
    pub fn total_len(&self) -> usize {
        self.data.nrows()
    }

    /// Number of classes (matrix columns)
    pub fn num_classes(&self) -> usize {
        self.data.ncols()
    }

    /// Distribution block of sequence `i`
    pub fn row_block(&self, i: usize) -> ArrayView2<'_, f64> {
        self.data
            .slice(ndarray::s![self.offsets[i]..self.offsets[i + 1], ..])
    }

    /// The flat distribution matrix
    pub fn flat(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// The offsets array
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Per-sequence lengths
    pub fn sizes(&self) -> Vec<usize> {
        self.offsets.windows(2).map(|w| w[1] - w[0]).collect()
    }
}
