//! DTW alignment cost.

use crate::constraint::BandConstraint;

/// Immutable DTW configuration. Thread-safe and copyable.
///
/// The local cost between two points is their absolute difference, and the
/// alignment cost is the sum of local costs along the cheapest warping path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dtw {
    constraint: BandConstraint,
}

impl Dtw {
    /// Create an unconstrained DTW calculator.
    #[must_use]
    pub fn unconstrained() -> Self {
        Self {
            constraint: BandConstraint::Unconstrained,
        }
    }

    /// Create a DTW calculator with a Sakoe-Chiba band constraint.
    #[must_use]
    pub fn with_sakoe_chiba(radius: usize) -> Self {
        Self {
            constraint: BandConstraint::SakoeChibaRadius(radius),
        }
    }

    /// Create a DTW calculator from an existing [`BandConstraint`].
    #[must_use]
    pub fn from_constraint(constraint: BandConstraint) -> Self {
        Self { constraint }
    }

    /// Return the band constraint configuration.
    #[must_use]
    pub fn constraint(&self) -> BandConstraint {
        self.constraint
    }

    /// Compute the accumulated alignment cost between two sequences.
    ///
    /// Uses a rolling two-row buffer rather than the full cost matrix. Runs in
    /// O(n * bw) time and O(bw) space, where `bw` is the band width (`m` for
    /// unconstrained, `2r+1` for Sakoe-Chiba radius `r`).
    ///
    /// | Condition | Result |
    /// |---|---|
    /// | Either input empty | `f64::INFINITY` |
    /// | Band too narrow to reach `(n-1, m-1)` | `f64::INFINITY` |
    /// | Non-finite input | Non-finite cost (callers must check) |
    /// | Otherwise | Optimal accumulated cost, `>= 0` |
    #[must_use]
    pub fn cost(&self, a: &[f64], b: &[f64]) -> f64 {
        let n = a.len();
        let m = b.len();
        if n == 0 || m == 0 {
            return f64::INFINITY;
        }

        let bw = self.constraint.band_width(m);
        // Index 0 and `bw + 1` are INF sentinels; active columns live in 1..=bw.
        let buf_width = bw + 2;

        let mut prev = vec![f64::INFINITY; buf_width];
        let mut curr = vec![f64::INFINITY; buf_width];
        let mut prev_start: usize = 0;
        let mut last_start: usize = 0;

        #[allow(clippy::needless_range_loop)]
        for i in 0..n {
            curr.fill(f64::INFINITY);

            let col_range = self.constraint.column_range(i, m);
            let curr_start = col_range.start;

            for j in col_range {
                let cost = (a[i] - b[j]).abs();
                let cj = j - curr_start + 1;

                if i == 0 && j == 0 {
                    curr[cj] = cost;
                    continue;
                }

                // Left: C[i][j-1]
                let left = if j > curr_start { curr[cj - 1] } else { f64::INFINITY };

                // Above: C[i-1][j]
                let above = if i > 0 {
                    let pj = j.wrapping_sub(prev_start).wrapping_add(1);
                    if pj < buf_width { prev[pj] } else { f64::INFINITY }
                } else {
                    f64::INFINITY
                };

                // Diagonal: C[i-1][j-1]
                let diag = if i > 0 && j > 0 {
                    let pj = (j - 1).wrapping_sub(prev_start).wrapping_add(1);
                    if pj < buf_width { prev[pj] } else { f64::INFINITY }
                } else {
                    f64::INFINITY
                };

                curr[cj] = cost + left.min(above).min(diag);
            }

            last_start = curr_start;
            prev_start = curr_start;
            std::mem::swap(&mut prev, &mut curr);
        }

        // After the final swap, `prev` holds the last completed row.
        let local = (m - 1).wrapping_sub(last_start).wrapping_add(1);
        if local < buf_width { prev[local] } else { f64::INFINITY }
    }
}
