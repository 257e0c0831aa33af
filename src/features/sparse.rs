//! Compressed sparse row matrices for TF-IDF features.
//!
//! Rows are documents and columns are vocabulary terms. Within a row, column indices are
//! sorted ascending and unique.

use serde::{Deserialize, Serialize};

use super::FeatureError;

/// A compressed sparse row matrix of `f64` values
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CsrMatrix {
    n_rows: usize,
    n_cols: usize,

    /// `indptr[r]..indptr[r + 1]` is the slice of `indices` / `data` belonging to row `r`
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl CsrMatrix {
    /// An empty matrix with no rows
    pub fn empty(n_cols: usize) -> Self {
        Self {
            n_rows: 0,
            n_cols,
            indptr: vec![0],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Build a matrix from rows of `(column, value)` pairs, which are sorted and validated
    pub fn from_rows(
        n_cols: usize,
        rows: impl IntoIterator<Item = Vec<(usize, f64)>>,
    ) -> Result<Self, FeatureError> {
        let mut matrix = Self::empty(n_cols);

        for mut row in rows {
            row.sort_by_key(|&(col, _)| col);

            for (position, &(col, value)) in row.iter().enumerate() {
                if col >= n_cols {
                    return Err(FeatureError::ColumnOutOfBounds { col, n_cols });
                }

                if position > 0 && row[position - 1].0 == col {
                    return Err(FeatureError::DuplicateColumn {
                        row: matrix.n_rows,
                        col,
                    });
                }

                matrix.indices.push(col);
                matrix.data.push(value);
            }

            matrix.indptr.push(matrix.indices.len());
            matrix.n_rows += 1;
        }

        Ok(matrix)
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// `(n_rows, n_cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Number of stored values
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Column indices and values of a row
    pub fn row(&self, row: usize) -> Option<(&[usize], &[f64])> {
        if row >= self.n_rows {
            return None;
        }

        let span = self.indptr[row]..self.indptr[row + 1];

        Some((&self.indices[span.clone()], &self.data[span]))
    }

    /// The value at a position, zero when not stored
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if col >= self.n_cols {
            return None;
        }

        let (indices, values) = self.row(row)?;

        Some(
            indices
                .binary_search(&col)
                .map(|position| values[position])
                .unwrap_or(0.0),
        )
    }

    /// Expand into row-major dense storage
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        (0..self.n_rows)
            .map(|r| {
                let mut dense = vec![0.0; self.n_cols];
                if let Some((indices, values)) = self.row(r) {
                    for (&col, &value) in indices.iter().zip(values) {
                        dense[col] = value;
                    }
                }
                dense
            })
            .collect()
    }

    /// Place matrices side by side. All of them must have the same number of rows.
    pub fn hstack(blocks: &[&CsrMatrix]) -> Result<Self, FeatureError> {
        let n_rows = blocks.first().map_or(0, |block| block.n_rows);

        if let Some(block) = blocks.iter().find(|block| block.n_rows != n_rows) {
            return Err(FeatureError::RowMismatch {
                expected: n_rows,
                found: block.n_rows,
            });
        }

        let n_cols = blocks.iter().map(|block| block.n_cols).sum();
        let mut stacked = Self {
            n_rows,
            n_cols,
            indptr: Vec::with_capacity(n_rows + 1),
            indices: Vec::with_capacity(blocks.iter().map(|block| block.nnz()).sum()),
            data: Vec::with_capacity(blocks.iter().map(|block| block.nnz()).sum()),
        };
        stacked.indptr.push(0);

        for r in 0..n_rows {
            let mut offset = 0;

            for block in blocks {
                if let Some((indices, values)) = block.row(r) {
                    stacked.indices.extend(indices.iter().map(|col| col + offset));
                    stacked.data.extend_from_slice(values);
                }
                offset += block.n_cols;
            }

            stacked.indptr.push(stacked.indices.len());
        }

        Ok(stacked)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn left() -> CsrMatrix {
        CsrMatrix::from_rows(3, vec![vec![(2, 1.0), (0, 0.5)], vec![]]).unwrap()
    }

    fn right() -> CsrMatrix {
        CsrMatrix::from_rows(2, vec![vec![(1, 2.0)], vec![(0, 3.0)]]).unwrap()
    }

    #[test]
    fn test_from_rows_sorts_columns() {
        let matrix = left();

        assert_eq!(matrix.shape(), (2, 3));
        assert_eq!(matrix.nnz(), 2);
        assert_eq!(matrix.row(0), Some((&[0, 2][..], &[0.5, 1.0][..])));
        assert_eq!(matrix.get(0, 1), Some(0.0));
        assert_eq!(matrix.get(0, 3), None);
    }

    #[test]
    fn test_from_rows_validates_columns() {
        assert!(matches!(
            CsrMatrix::from_rows(2, vec![vec![(2, 1.0)]]),
            Err(FeatureError::ColumnOutOfBounds { col: 2, n_cols: 2 })
        ));
        assert!(matches!(
            CsrMatrix::from_rows(2, vec![vec![(1, 1.0), (1, 2.0)]]),
            Err(FeatureError::DuplicateColumn { row: 0, col: 1 })
        ));
    }

    #[test]
    fn test_hstack_offsets_columns() {
        let stacked = CsrMatrix::hstack(&[&left(), &right()]).unwrap();

        assert_eq!(stacked.shape(), (2, 5));
        assert_eq!(
            stacked.to_dense(),
            vec![
                vec![0.5, 0.0, 1.0, 0.0, 2.0],
                vec![0.0, 0.0, 0.0, 3.0, 0.0],
            ]
        );
    }

    #[test]
    fn test_hstack_rejects_row_mismatch() {
        let single = CsrMatrix::from_rows(1, vec![vec![(0, 1.0)]]).unwrap();

        assert!(matches!(
            CsrMatrix::hstack(&[&left(), &single]),
            Err(FeatureError::RowMismatch {
                expected: 2,
                found: 1
            })
        ));
    }
}
