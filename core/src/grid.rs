//! Work-group-size grid generation.
//!
//! A sweep explores a two-dimensional grid of OpenCL work-group sizes. Each
//! axis is an inclusive `low..=high` range expanded to the powers of two it
//! contains; the grid is the cross product filtered to the pairs where the
//! local size does not exceed the global size (anything else is rejected by
//! the OpenCL runtime anyway).

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// pow2_range
// ---------------------------------------------------------------------------

/// Expand inclusive bounds to an ascending sequence of powers of two.
///
/// The sequence runs from `2^floor(log2(low))` to `2^floor(log2(high))`,
/// so a bound that is not itself a power of two selects the power-of-two
/// range that contains it. Empty when `high < low` or either bound is zero.
pub fn pow2_range(low: u64, high: u64) -> Vec<u64> {
    if low == 0 || high == 0 || high < low {
        return Vec::new();
    }
    let mut cur = 1u64 << low.ilog2();
    let last = 1u64 << high.ilog2();
    let mut powers = Vec::new();
    while cur < last {
        powers.push(cur);
        cur <<= 1;
    }
    powers.push(last);
    powers
}

// ---------------------------------------------------------------------------
// AxisBounds
// ---------------------------------------------------------------------------

/// Inclusive bounds for one grid axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub low: u64,
    pub high: u64,
}

impl AxisBounds {
    pub fn new(low: u64, high: u64) -> Self {
        AxisBounds { low, high }
    }

    /// The powers of two this axis covers.
    pub fn powers(&self) -> Vec<u64> {
        pow2_range(self.low, self.high)
    }
}

// ---------------------------------------------------------------------------
// GridPoint
// ---------------------------------------------------------------------------

/// One (local, global) work-group-size combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPoint {
    pub local_ws: u64,
    pub global_ws: u64,
}

impl GridPoint {
    pub fn new(local_ws: u64, global_ws: u64) -> Self {
        GridPoint {
            local_ws,
            global_ws,
        }
    }

    /// Result-file suffix: `<global>-<local>`.
    pub fn suffix(&self) -> String {
        format!("{}-{}", self.global_ws, self.local_ws)
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.local_ws, self.global_ws)
    }
}

// ---------------------------------------------------------------------------
// build_grid
// ---------------------------------------------------------------------------

/// Enumerate the sweep grid: global sizes ascending in the outer loop, local
/// sizes ascending in the inner loop, keeping pairs with `local <= global`.
pub fn build_grid(local: AxisBounds, global: AxisBounds) -> Vec<GridPoint> {
    let locals = local.powers();
    let mut grid = Vec::new();
    for global_ws in global.powers() {
        for &local_ws in &locals {
            if local_ws <= global_ws {
                grid.push(GridPoint::new(local_ws, global_ws));
            }
        }
    }
    grid
}
