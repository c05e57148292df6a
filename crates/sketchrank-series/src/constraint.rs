//! Warping window constraint for DTW alignment.

use std::ops::Range;

/// Constraint on the DTW warping window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BandConstraint {
    /// No constraint; every cell of the cost matrix is reachable.
    #[default]
    Unconstrained,

    /// Sakoe-Chiba band: cell (i,j) is valid only if |i - j| <= radius.
    SakoeChibaRadius(usize),
}

impl BandConstraint {
    /// Build a constraint from a CLI-style radius where `0` means unconstrained.
    #[must_use]
    pub fn from_radius(radius: usize) -> Self {
        if radius == 0 {
            Self::Unconstrained
        } else {
            Self::SakoeChibaRadius(radius)
        }
    }

    /// Return the valid column range for a given row in the cost matrix.
    ///
    /// For unconstrained DTW, returns `0..n_cols`.
    /// For Sakoe-Chiba, returns the intersection of `[row - r, row + r]` with `[0, n_cols)`.
    #[must_use]
    pub fn column_range(&self, row: usize, n_cols: usize) -> Range<usize> {
        match self {
            Self::Unconstrained => 0..n_cols,
            Self::SakoeChibaRadius(r) => {
                let start = row.saturating_sub(*r);
                let end = (row + r + 1).min(n_cols);
                start..end
            }
        }
    }

    /// Return the maximum band width for `m` columns.
    #[must_use]
    pub fn band_width(&self, m: usize) -> usize {
        match self {
            Self::Unconstrained => m,
            Self::SakoeChibaRadius(r) => (2 * r + 1).min(m),
        }
    }
}
