use log::warn;

use super::cursor::{Coverage, Cursor};
use super::{validate_axis, validate_finite, ExtrapolationWarning, TableError};

// ---------------------------------------------------------------------------
// One-dimensional piecewise-linear table
// ---------------------------------------------------------------------------

/// `y(x)` sampled on a strictly increasing axis.
///
/// Lookups are split in two: [`resolve`](Table1D::resolve) moves the cursor
/// and caches the segment line, [`value_at`](Table1D::value_at) evaluates
/// that cached line. Callers that know the query stays inside the cached
/// segment can skip the resolve.
#[derive(Debug, Clone)]
pub struct Table1D {
    label: &'static str,
    axis: Vec<f64>,
    values: Vec<f64>,
    cursor: Cursor,
    x0: f64,
    y0: f64,
    slope: f64,
    extrapolations: usize,
}

impl Table1D {
    pub fn new(axis: Vec<f64>, values: Vec<f64>, initial_query: f64) -> Result<Self, TableError> {
        validate_axis(&axis, "axis")?;
        if values.len() != axis.len() {
            return Err(TableError::LengthMismatch {
                axis: "axis",
                axis_len: axis.len(),
                values_len: values.len(),
            });
        }
        validate_finite(&values, "values")?;

        let cursor = Cursor::new(&axis, initial_query);
        let mut table = Self {
            label: "table",
            axis,
            values,
            cursor,
            x0: 0.0,
            y0: 0.0,
            slope: 0.0,
            extrapolations: 0,
        };
        table.cache_segment();
        Ok(table)
    }

    /// Name used in diagnostics.
    pub fn labelled(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Move the cursor to the segment covering `x` and cache its line.
    pub fn resolve(&mut self, x: f64) -> Coverage {
        let previous = self.cursor.index();
        let coverage = self.cursor.seek(&self.axis, x);
        if self.cursor.index() != previous {
            self.cache_segment();
        }
        if coverage.is_extrapolated() {
            if self.extrapolations == 0 {
                warn!(
                    "table '{}' queried at {} outside [{}, {}], extrapolating",
                    self.label,
                    x,
                    self.axis[0],
                    self.axis[self.axis.len() - 1]
                );
            }
            self.extrapolations += 1;
        }
        coverage
    }

    /// Evaluate the cached segment line at `x`.
    pub fn value_at(&self, x: f64) -> f64 {
        self.y0 + self.slope * (x - self.x0)
    }

    /// Resolve then evaluate.
    pub fn eval(&mut self, x: f64) -> f64 {
        self.resolve(x);
        self.value_at(x)
    }

    pub fn axis(&self) -> &[f64] {
        &self.axis
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Index of the segment the cursor sits on.
    pub fn segment(&self) -> usize {
        self.cursor.index()
    }

    pub fn cursor_moves(&self) -> usize {
        self.cursor.moves()
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

    fn cache_segment(&mut self) {
        let i = self.cursor.index();
        self.x0 = self.axis[i];
        self.y0 = self.values[i];
        self.slope = (self.values[i + 1] - self.y0) / (self.axis[i + 1] - self.x0);
    }
}
