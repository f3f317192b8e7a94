//! Fixed-bucket counters with lock-free increments
//!
//! Each bucket is an independent `AtomicU64`. Increments never get lost, but
//! a [`Histogram::snapshot`] taken while other threads tally is not a
//! consistent cut across buckets; readers accept approximate totals.
//! [`Histogram::clear`] zeroes bucket by bucket, so a concurrent increment
//! lands either before or after the reset of its bucket.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Number of buckets in every histogram
pub const HIST_MAX: usize = 32;

/// Bucket index for a log2-bucketed observation: the smallest `i` with `2^i >= value`
///
/// Zero and one both land in bucket 0. The result may exceed the last
/// bucket; [`Histogram::tally`] clamps it.
pub fn log2_bucket(value: u64) -> u64 {
    if value <= 1 {
        0
    } else {
        u64::from(u64::BITS - (value - 1).leading_zeros())
    }
}

/// Order-of-magnitude histogram safe to share between I/O workers
#[derive(Debug)]
pub struct Histogram {
    buckets: [AtomicU64; HIST_MAX],
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    pub fn new() -> Self {
        Self {
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    /// Count one observation in bucket `value`, clamped to the last bucket
    pub fn tally(&self, value: u64) {
        let idx = value.min(HIST_MAX as u64 - 1) as usize;
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    /// Count one observation in its [`log2_bucket`]
    pub fn tally_log2(&self, value: u64) {
        self.tally(log2_bucket(value));
    }

    /// Current count of bucket `idx`; zero for an index past the end
    pub fn bucket(&self, idx: usize) -> u64 {
        self.buckets
            .get(idx)
            .map_or(0, |b| b.load(Ordering::Relaxed))
    }

    /// Total observations across all buckets
    pub fn sum(&self) -> u64 {
        self.buckets
            .iter()
            .map(|b| b.load(Ordering::Relaxed))
            .fold(0u64, u64::wrapping_add)
    }

    /// Point-in-time copy of the buckets (racy with respect to concurrent tallies)
    pub fn snapshot(&self) -> HistogramSnapshot {
        HistogramSnapshot {
            buckets: std::array::from_fn(|i| self.buckets[i].load(Ordering::Relaxed)),
        }
    }

    /// Reset every bucket to zero
    pub fn clear(&self) {
        for bucket in &self.buckets {
            bucket.store(0, Ordering::Relaxed);
        }
    }
}

/// Plain copy of a [`Histogram`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramSnapshot {
    pub buckets: [u64; HIST_MAX],
}

impl Default for HistogramSnapshot {
    fn default() -> Self {
        Self {
            buckets: [0; HIST_MAX],
        }
    }
}

impl HistogramSnapshot {
    pub fn sum(&self) -> u64 {
        self.buckets.iter().fold(0u64, |acc, b| acc.wrapping_add(*b))
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|b| *b == 0)
    }
}
