//! Cumulative weighted-choice tables.
//!
//! Every random policy in the synthesizers is expressed as a table of
//! `(cumulative_threshold, outcome)` pairs. A uniform draw `p` in `[0, 1)` selects the first
//! entry whose threshold is strictly greater than `p`. Keeping the thresholds as data (rather
//! than as `if` chains) keeps each distribution named, testable and tunable.

use rand::Rng;

/// A non-empty, ascending table of cumulative thresholds.
#[derive(Debug, Clone, Copy)]
pub struct WeightedTable<T: 'static> {
    entries: &'static [(f64, T)],
}

impl<T: Copy + 'static> WeightedTable<T> {
    /// Creates a table from cumulative `(threshold, outcome)` entries.
    ///
    /// The final threshold should be `1.0`; any draw at or beyond the last threshold
    /// resolves to the last outcome.
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in a `const`) if `entries` is empty.
    pub const fn new(entries: &'static [(f64, T)]) -> Self {
        assert!(!entries.is_empty(), "weighted table must not be empty");
        Self { entries }
    }

    /// Resolves a draw `p` in `[0, 1)` to an outcome.
    pub fn pick(&self, p: f64) -> T {
        for &(threshold, outcome) in self.entries {
            if p < threshold {
                return outcome;
            }
        }
        self.entries[self.entries.len() - 1].1
    }

    /// Draws a uniform `p` from `rng` and resolves it.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        self.pick(rng.gen::<f64>())
    }
}

/// Picks one element of a non-empty fixed pool uniformly at random.
///
/// # Panics
///
/// Panics if `pool` is empty. Pools in this workspace are `const` arrays.
pub fn pick_uniform<T: Copy, R: Rng + ?Sized>(rng: &mut R, pool: &[T]) -> T {
    pool[rng.gen_range(0..pool.len())]
}
