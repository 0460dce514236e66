//! Accumulated cost storage
//!
//! A `rows x cols` grid of `f32` stored column-major in one flat buffer.
//! Rows are reference frames and never change; columns are live frames and
//! are appended as live input arrives. New cells start at `+inf`, which
//! marks them as not yet computed.

/// Column-major accumulated cost matrix with a fixed row count
#[derive(Debug, Clone)]
pub struct CostMatrix {
    rows: usize,
    data: Vec<f32>,
}

impl CostMatrix {
    /// Create an empty matrix with `rows` reference frames
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            data: Vec::new(),
        }
    }

    /// Number of reference rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of live columns appended so far
    pub fn cols(&self) -> usize {
        if self.rows == 0 {
            0
        } else {
            self.data.len() / self.rows
        }
    }

    /// Append one live column filled with `+inf`
    pub fn push_column(&mut self) {
        self.data.resize(self.data.len() + self.rows, f32::INFINITY);
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols());
        col * self.rows + row
    }

    /// Cost at (reference row, live column)
    ///
    /// # Panics
    ///
    /// Panics if the cell is outside the matrix.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[self.offset(row, col)]
    }

    /// Cost at (row, col), or `None` outside the matrix
    pub fn try_get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.rows && col < self.cols() {
            Some(self.data[col * self.rows + row])
        } else {
            None
        }
    }

    /// Store a cost
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        let idx = self.offset(row, col);
        self.data[idx] = value;
    }

    /// True once the cell has been written
    pub fn is_computed(&self, row: usize, col: usize) -> bool {
        self.try_get(row, col).map_or(false, f32::is_finite)
    }

    /// Index of the first minimum of `row` over columns `0..=last_col`
    pub fn argmin_in_row(&self, row: usize, last_col: usize) -> usize {
        let mut best = 0;
        let mut best_value = f32::INFINITY;
        for col in 0..=last_col {
            let value = self.get(row, col);
            if value < best_value {
                best_value = value;
                best = col;
            }
        }
        best
    }

    /// Index of the first minimum of `col` over rows `0..=last_row`
    pub fn argmin_in_col(&self, col: usize, last_row: usize) -> usize {
        let column = &self.data[col * self.rows..col * self.rows + last_row + 1];
        let mut best = 0;
        let mut best_value = f32::INFINITY;
        for (row, &value) in column.iter().enumerate() {
            if value < best_value {
                best_value = value;
                best = row;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_columns_are_infinite() {
        let mut m = CostMatrix::new(3);
        assert_eq!(m.cols(), 0);
        m.push_column();
        m.push_column();
        assert_eq!(m.cols(), 2);
        assert_eq!(m.rows(), 3);
        for r in 0..3 {
            for c in 0..2 {
                assert!(m.get(r, c).is_infinite());
                assert!(!m.is_computed(r, c));
            }
        }
    }

    #[test]
    fn test_set_get() {
        let mut m = CostMatrix::new(4);
        m.push_column();
        m.push_column();
        m.set(2, 1, 0.5);
        assert_eq!(m.get(2, 1), 0.5);
        assert!(m.is_computed(2, 1));
        assert!(m.get(2, 0).is_infinite());
        assert_eq!(m.try_get(4, 0), None);
        assert_eq!(m.try_get(0, 2), None);
    }

    #[test]
    fn test_argmin_prefers_first_minimum() {
        let mut m = CostMatrix::new(3);
        for _ in 0..3 {
            m.push_column();
        }
        m.set(1, 0, 2.0);
        m.set(1, 1, 1.0);
        m.set(1, 2, 1.0);
        assert_eq!(m.argmin_in_row(1, 2), 1);

        m.set(0, 2, 3.0);
        m.set(2, 2, 1.0);
        assert_eq!(m.argmin_in_col(2, 2), 1);
        assert_eq!(m.argmin_in_col(2, 0), 0);
    }

    #[test]
    fn test_argmin_all_infinite_returns_zero() {
        let mut m = CostMatrix::new(2);
        m.push_column();
        assert_eq!(m.argmin_in_row(1, 0), 0);
        assert_eq!(m.argmin_in_col(0, 1), 0);
    }
}
