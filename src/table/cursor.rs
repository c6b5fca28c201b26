// ---------------------------------------------------------------------------
// Segment cursor over a strictly increasing axis
// ---------------------------------------------------------------------------

/// Where a query landed relative to the tabulated domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    Inside,
    Below,
    Above,
}

impl Coverage {
    pub fn is_extrapolated(self) -> bool {
        self != Coverage::Inside
    }
}

/// Last resolved segment `[axis[index], axis[index + 1])` and its bounds.
///
/// The axis itself is owned by the table; the cursor only remembers where
/// the previous query was. Queries outside the domain park the cursor on
/// the first or last segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    index: usize,
    lo: f64,
    hi: f64,
    moves: usize,
}

impl Cursor {
    /// Cursor positioned on the segment containing `x`.
    ///
    /// `axis` must already be validated (length >= 2, strictly increasing).
    pub fn new(axis: &[f64], x: f64) -> Self {
        let mut cursor = Self {
            index: 0,
            lo: axis[0],
            hi: axis[1],
            moves: 0,
        };
        cursor.seek(axis, x);
        cursor.moves = 0;
        cursor
    }

    /// Move to the segment containing `x` by scanning from the current one.
    pub fn seek(&mut self, axis: &[f64], x: f64) -> Coverage {
        let last = axis.len() - 2;

        if x >= self.hi {
            while self.index < last && x >= axis[self.index + 1] {
                self.index += 1;
                self.moves += 1;
            }
        } else if x < self.lo {
            while self.index > 0 && x < axis[self.index] {
                self.index -= 1;
                self.moves += 1;
            }
        }

        self.lo = axis[self.index];
        self.hi = axis[self.index + 1];

        if x < axis[0] {
            Coverage::Below
        } else if x > axis[last + 1] {
            Coverage::Above
        } else {
            Coverage::Inside
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    /// Position of `x` inside the cached segment (0 at `lo`, 1 at `hi`).
    /// Outside `[0, 1]` when extrapolating.
    pub fn fraction(&self, x: f64) -> f64 {
        (x - self.lo) / (self.hi - self.lo)
    }

    /// Number of segment transitions since construction.
    pub fn moves(&self) -> usize {
        self.moves
    }
}
