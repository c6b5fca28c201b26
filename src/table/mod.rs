//! Piecewise-linear lookup tables with a sequential-access cursor.
//!
//! Every table owns its cursor. Resolving a query moves the cursor to the
//! segment that contains it, scanning linearly from the previous segment, so
//! a stream of slowly varying queries (time stepping, RK4 sub-stages) costs
//! amortised O(1) per lookup. Tables are cheap to clone and each simulation
//! run works on its own copies.

pub mod cursor;
pub mod one;
pub mod two;

pub use cursor::{Coverage, Cursor};
pub use one::Table1D;
pub use two::Table2D;

use thiserror::Error;

/// Reasons a table is rejected at construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("{axis} needs at least 2 points, got {len}")]
    TooShort { axis: &'static str, len: usize },
    #[error("{axis} has {axis_len} points but {values_len} values were supplied")]
    LengthMismatch {
        axis: &'static str,
        axis_len: usize,
        values_len: usize,
    },
    #[error("{axis} is not strictly increasing at index {index}")]
    NotIncreasing { axis: &'static str, index: usize },
    #[error("{axis} holds a non-finite value at index {index}")]
    NonFinite { axis: &'static str, index: usize },
    #[error("row {row} has {len} values, expected {expected}")]
    Ragged { row: usize, len: usize, expected: usize },
}

/// A table query fell outside the tabulated domain and was extrapolated.
///
/// Not an error: the simulation carries on with the boundary slope. Runs
/// collect one warning per table so the excursion can be reported.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrapolationWarning {
    pub table: &'static str,
    pub count: usize,
}

impl std::fmt::Display for ExtrapolationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "table '{}' extrapolated {} time(s) outside its domain",
            self.table, self.count
        )
    }
}

pub(crate) fn validate_axis(axis: &[f64], name: &'static str) -> Result<(), TableError> {
    if axis.len() < 2 {
        return Err(TableError::TooShort { axis: name, len: axis.len() });
    }
    validate_finite(axis, name)?;
    match axis.windows(2).position(|w| w[1] <= w[0]) {
        Some(i) => Err(TableError::NotIncreasing { axis: name, index: i + 1 }),
        None => Ok(()),
    }
}

pub(crate) fn validate_finite(values: &[f64], name: &'static str) -> Result<(), TableError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(TableError::NonFinite { axis: name, index }),
        None => Ok(()),
    }
}
