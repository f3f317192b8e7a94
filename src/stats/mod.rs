//! Bulk I/O contiguity statistics
//!
//! - [`histogram`]: lock-free fixed-bucket counters
//! - [`brw`]: read/write classification into six histograms
//! - [`report`]: cumulative-percentage rendering
//!
//! All state is owned by the caller: create a [`BrwStats`] per storage
//! target and share it by reference or `Arc` with the I/O workers.

pub mod brw;
pub mod histogram;
pub mod report;

pub use brw::{BrwSnapshot, BrwStats, LocalBuf};
pub use histogram::{log2_bucket, Histogram, HistogramSnapshot, HIST_MAX};
pub use report::{pct, BrwReport, ColumnStats, ReportRow, ReportSection, RowLabel};
