use log::warn;

use super::cursor::{Coverage, Cursor};
use super::{validate_axis, validate_finite, ExtrapolationWarning, TableError};

// ---------------------------------------------------------------------------
// Two-dimensional bilinear table
// ---------------------------------------------------------------------------

/// `y(x1, x2)` sampled on a rectangular grid; `values[i][j]` sits at
/// `(axis1[i], axis2[j])`.
///
/// Each axis keeps its own cursor, resolved with the same sequential scan as
/// [`Table1D`](super::Table1D). The four corner values of the resolved cell
/// are cached so [`value_at`](Table2D::value_at) is a handful of flops.
#[derive(Debug, Clone)]
pub struct Table2D {
    label: &'static str,
    axis1: Vec<f64>,
    axis2: Vec<f64>,
    values: Vec<f64>, // row-major, axis1 rows by axis2 columns
    cursor1: Cursor,
    cursor2: Cursor,
    corners: [f64; 4], // (lo,lo) (lo,hi) (hi,lo) (hi,hi)
    extrapolations: usize,
}

impl Table2D {
    pub fn new(
        axis1: Vec<f64>,
        axis2: Vec<f64>,
        grid: Vec<Vec<f64>>,
        initial_query: (f64, f64),
    ) -> Result<Self, TableError> {
        validate_axis(&axis1, "axis1")?;
        validate_axis(&axis2, "axis2")?;
        if grid.len() != axis1.len() {
            return Err(TableError::LengthMismatch {
                axis: "axis1",
                axis_len: axis1.len(),
                values_len: grid.len(),
            });
        }

        let mut values = Vec::with_capacity(axis1.len() * axis2.len());
        for (row, line) in grid.iter().enumerate() {
            if line.len() != axis2.len() {
                return Err(TableError::Ragged {
                    row,
                    len: line.len(),
                    expected: axis2.len(),
                });
            }
            values.extend_from_slice(line);
        }
        validate_finite(&values, "values")?;

        let cursor1 = Cursor::new(&axis1, initial_query.0);
        let cursor2 = Cursor::new(&axis2, initial_query.1);
        let mut table = Self {
            label: "table",
            axis1,
            axis2,
            values,
            cursor1,
            cursor2,
            corners: [0.0; 4],
            extrapolations: 0,
        };
        table.cache_cell();
        Ok(table)
    }

    pub fn labelled(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Move both cursors to the cell covering `(x1, x2)`.
    pub fn resolve(&mut self, x1: f64, x2: f64) -> (Coverage, Coverage) {
        let previous = (self.cursor1.index(), self.cursor2.index());
        let c1 = self.cursor1.seek(&self.axis1, x1);
        let c2 = self.cursor2.seek(&self.axis2, x2);
        if (self.cursor1.index(), self.cursor2.index()) != previous {
            self.cache_cell();
        }
        if c1.is_extrapolated() || c2.is_extrapolated() {
            if self.extrapolations == 0 {
                warn!(
                    "table '{}' queried at ({}, {}) outside its grid, extrapolating",
                    self.label, x1, x2
                );
            }
            self.extrapolations += 1;
        }
        (c1, c2)
    }

    /// Bilinear evaluation on the cached cell; extrapolates linearly when
    /// the point lies outside it.
    pub fn value_at(&self, x1: f64, x2: f64) -> f64 {
        let [y00, y01, y10, y11] = self.corners;
        let t1 = self.cursor1.fraction(x1);
        let t2 = self.cursor2.fraction(x2);
        let low = y00 + (y01 - y00) * t2;
        let high = y10 + (y11 - y10) * t2;
        low + (high - low) * t1
    }

    pub fn eval(&mut self, x1: f64, x2: f64) -> f64 {
        self.resolve(x1, x2);
        self.value_at(x1, x2)
    }

    pub fn axis1(&self) -> &[f64] {
        &self.axis1
    }

    pub fn axis2(&self) -> &[f64] {
        &self.axis2
    }

    /// Grid value at row `i`, column `j`.
    pub fn at(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.axis2.len() + j]
    }

    pub fn cell(&self) -> (usize, usize) {
        (self.cursor1.index(), self.cursor2.index())
    }

    pub fn cursor_moves(&self) -> usize {
        self.cursor1.moves() + self.cursor2.moves()
    }

    pub fn extrapolations(&self) -> usize {
        self.extrapolations
    }

    pub fn extrapolation_warning(&self) -> Option<ExtrapolationWarning> {
        (self.extrapolations > 0).then(|| ExtrapolationWarning {
            table: self.label,
            count: self.extrapolations,
        })
    }

    fn cache_cell(&mut self) {
        let (i, j) = self.cell();
        self.corners = [
            self.at(i, j),
            self.at(i, j + 1),
            self.at(i + 1, j),
            self.at(i + 1, j + 1),
        ];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // y = 2*x1 + 3*x2 + x1*x2 sampled on an uneven grid; bilinear
    // interpolation reproduces it exactly inside every cell.
    fn plane(x1: f64, x2: f64) -> f64 {
        2.0 * x1 + 3.0 * x2 + x1 * x2
    }

    fn sample() -> Table2D {
        let axis1 = vec![0.0, 0.5, 2.0];
        let axis2 = vec![-10.0, 0.0, 5.0, 20.0];
        let grid = axis1
            .iter()
            .map(|&a| axis2.iter().map(|&b| plane(a, b)).collect())
            .collect();
        Table2D::new(axis1, axis2, grid, (0.0, 0.0)).unwrap()
    }

    #[test]
    fn exact_at_nodes() {
        let mut t = sample();
        for &a in &[0.0, 0.5, 2.0] {
            for &b in &[-10.0, 0.0, 5.0, 20.0] {
                assert_relative_eq!(t.eval(a, b), plane(a, b), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn bilinear_inside_cells() {
        let mut t = sample();
        for &(a, b) in &[(0.25, -3.0), (1.2, 7.5), (1.9, 19.0), (0.1, 4.9)] {
            assert_relative_eq!(t.eval(a, b), plane(a, b), epsilon = 1e-9);
        }
    }

    #[test]
    fn extrapolates_on_both_axes() {
        let mut t = sample();
        let (c1, c2) = t.resolve(3.0, 30.0);
        assert_eq!(c1, Coverage::Above);
        assert_eq!(c2, Coverage::Above);
        // bilinear extension of the last cell is still exact for this surface
        assert_relative_eq!(t.value_at(3.0, 30.0), plane(3.0, 30.0), epsilon = 1e-9);
        assert_eq!(t.extrapolations(), 1);
    }

    #[test]
    fn rejects_ragged_grid() {
        let err = Table2D::new(
            vec![0.0, 1.0],
            vec![0.0, 1.0, 2.0],
            vec![vec![0.0, 1.0, 2.0], vec![0.0, 1.0]],
            (0.0, 0.0),
        )
        .unwrap_err();
        assert_eq!(err, TableError::Ragged { row: 1, len: 2, expected: 3 });
    }

    #[test]
    fn rejects_row_count_mismatch() {
        let err = Table2D::new(
            vec![0.0, 0.3, 0.5, 0.9],
            vec![0.0, 1.0],
            vec![vec![0.0, 1.0]; 5],
            (0.0, 0.0),
        )
        .unwrap_err();
        assert!(matches!(err, TableError::LengthMismatch { axis_len: 4, values_len: 5, .. }));
    }

    #[test]
    fn rejects_non_monotonic_axis() {
        let err = Table2D::new(
            vec![0.0, 1.0],
            vec![0.0, -1.0],
            vec![vec![0.0, 0.0], vec![0.0, 0.0]],
            (0.0, 0.0),
        )
        .unwrap_err();
        assert!(matches!(err, TableError::NotIncreasing { axis: "axis2", .. }));
    }
}
