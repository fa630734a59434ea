//! Seeded train/test partition.
//!
//! Row indices are shuffled with a Fisher-Yates shuffle driven by a
//! `StdRng` seeded from a fixed constant, then cut in two: the first
//! `ceil(test_fraction * n)` shuffled rows form the test set, the rest the
//! training set. Same table + fraction + seed always gives the same split.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::model::{Split, Table};
use crate::error::{IngestError, Result};

/// Seed used unless a caller overrides it.
pub const DEFAULT_SEED: u64 = 42;

/// Number of test rows for `rows` rows at `test_fraction`.
pub fn test_len(rows: usize, test_fraction: f64) -> usize {
    ((rows as f64) * test_fraction).ceil() as usize
}

/// Randomly partition `table` into disjoint, exhaustive train and test tables.
///
/// `test_fraction` must lie strictly between 0 and 1. Both sides must end up
/// non-empty, so a zero-row (or too small) table is rejected.
pub fn split(table: &Table, test_fraction: f64, seed: u64) -> Result<Split> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(IngestError::InvalidSplitFraction(test_fraction));
    }

    let total = table.len();
    let n_test = test_len(total, test_fraction).min(total);
    let n_train = total - n_test;
    if n_test == 0 || n_train == 0 {
        return Err(IngestError::EmptyPartition {
            rows: total,
            test_fraction,
            train: n_train,
            test: n_test,
        });
    }

    let mut order: Vec<usize> = (0..total).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let train_idx = order.split_off(n_test);
    Ok(Split {
        train: table.take_rows(&train_idx),
        test: table.take_rows(&order),
    })
}
