//! Baby-step discrete-log table for small-plaintext ElGamal decryption.
//!
//! Built once per [`super::EncryptionParams`] and shared (behind an `Arc`)
//! by every component constructed from those params, per the constructor
//! contract in spec §9 ("model as an immutable value handed to every
//! component at construction").

use std::collections::HashMap;

use crate::curve::{encode_point, generator, PointBytes, Scalar};

/// Maps `m*G` (for `m` stepping by `gap` across `[-max_dlog, max_dlog]`) back
/// to `m`. Lookups for a `gap > 1` must additionally try dividing the
/// candidate point by each scalar in `[0, gap)` (see [`Self::lookup`]).
pub struct DlogTable {
    table: HashMap<PointBytes, i64>,
    pub max_dlog: i64,
    pub gap: u32,
}

impl DlogTable {
    pub fn build(max_dlog: i64, gap: u32) -> Self {
        assert!(gap >= 1, "table gap must be >= 1");
        let g = generator();
        let mut table = HashMap::new();
        let mut m = -max_dlog;
        // Always include 0 exactly, then step by `gap` in both directions.
        while m <= max_dlog {
            let point = g * Scalar::from(m.unsigned_abs())
                * if m < 0 { -Scalar::from(1u64) } else { Scalar::from(1u64) };
            table.insert(encode_point(&point), m);
            m += gap as i64;
        }
        if !table.values().any(|&v| v == 0) {
            table.insert(encode_point(&(g * Scalar::from(0u64))), 0);
        }
        Self {
            table,
            max_dlog,
            gap,
        }
    }

    /// Looks up `point = m*G` for some `m` in `[-max_dlog, max_dlog]`.
    ///
    /// When `gap > 1` the table only stores every `gap`-th multiple of `G`,
    /// so we probe `point - j*G` for `j` in `[0, gap)` until a hit lands on
    /// a tabulated multiple.
    pub fn lookup(&self, point: &crate::curve::Point) -> Option<i64> {
        let g = generator();
        for j in 0..self.gap as i64 {
            let candidate = *point - g * Scalar::from(j as u64);
            if let Some(&m) = self.table.get(&encode_point(&candidate)) {
                let recovered = m + j;
                if recovered.unsigned_abs() as i64 <= self.max_dlog {
                    return Some(recovered);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::generator;

    #[test]
    fn exact_gap_lookup() {
        let table = DlogTable::build(64, 1);
        let p = generator() * Scalar::from(30u64);
        assert_eq!(table.lookup(&p), Some(30));
    }

    #[test]
    fn negative_lookup() {
        let table = DlogTable::build(64, 1);
        let p = generator() * (-Scalar::from(30u64));
        assert_eq!(table.lookup(&p), Some(-30));
    }

    #[test]
    fn gapped_lookup() {
        let table = DlogTable::build(64, 3);
        let p = generator() * Scalar::from(29u64);
        assert_eq!(table.lookup(&p), Some(29));
    }

    #[test]
    fn out_of_range_fails() {
        let table = DlogTable::build(8, 1);
        let p = generator() * Scalar::from(100u64);
        assert_eq!(table.lookup(&p), None);
    }
}
