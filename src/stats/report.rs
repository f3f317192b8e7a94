//! Cumulative-percentage report over a [`BrwSnapshot`]
//!
//! Three sections (pages per request, discontiguous pages, discontiguous
//! blocks), each with a read and a write column group. Rows stop as soon as
//! both read and write cumulative counts reach their totals. A zero total
//! yields 0% rather than a division by zero.

use super::brw::BrwSnapshot;
use super::histogram::{HistogramSnapshot, HIST_MAX};
use serde::Serialize;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Integer percentage of `part` in `total`; 0 when `total` is 0
pub fn pct(part: u64, total: u64) -> u64 {
    if total == 0 {
        0
    } else {
        (u128::from(part) * 100 / u128::from(total)) as u64
    }
}

/// How a section labels its rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowLabel {
    /// Row `i` is labelled `2^i`
    PowerOfTwo,
    /// Row `i` is labelled `i`
    Index,
}

impl RowLabel {
    fn label(self, idx: usize) -> u64 {
        match self {
            RowLabel::PowerOfTwo => 1u64 << idx,
            RowLabel::Index => idx as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnStats {
    pub count: u64,
    pub pct: u64,
    pub cum_pct: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub label: u64,
    pub read: ColumnStats,
    pub write: ColumnStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub title: &'static str,
    /// What one observation is called in the read column
    pub unit: &'static str,
    pub label: RowLabel,
    pub read_total: u64,
    pub write_total: u64,
    pub rows: Vec<ReportRow>,
}

impl ReportSection {
    fn build(
        title: &'static str,
        unit: &'static str,
        label: RowLabel,
        read: &HistogramSnapshot,
        write: &HistogramSnapshot,
    ) -> Self {
        let read_total = read.sum();
        let write_total = write.sum();
        let mut read_cum = 0u64;
        let mut write_cum = 0u64;
        let mut rows = Vec::new();

        for idx in 0..HIST_MAX {
            let r = read.buckets[idx];
            let w = write.buckets[idx];
            read_cum = read_cum.wrapping_add(r);
            write_cum = write_cum.wrapping_add(w);

            rows.push(ReportRow {
                label: label.label(idx),
                read: ColumnStats {
                    count: r,
                    pct: pct(r, read_total),
                    cum_pct: pct(read_cum, read_total),
                },
                write: ColumnStats {
                    count: w,
                    pct: pct(w, write_total),
                    cum_pct: pct(write_cum, write_total),
                },
            });

            if read_cum == read_total && write_cum == write_total {
                break;
            }
        }

        Self {
            title,
            unit,
            label,
            read_total,
            write_total,
            rows,
        }
    }
}

/// Rendered brw statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrwReport {
    pub snapshot_secs: u64,
    pub snapshot_usecs: u32,
    pub sections: Vec<ReportSection>,
}

impl BrwReport {
    /// Report stamped with the current wall-clock time
    pub fn new(snapshot: &BrwSnapshot) -> Self {
        Self::at(snapshot, SystemTime::now())
    }

    /// Report stamped with `now`
    pub fn at(snapshot: &BrwSnapshot, now: SystemTime) -> Self {
        let since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or_default();

        let sections = vec![
            ReportSection::build(
                "pages per brw",
                "brws",
                RowLabel::PowerOfTwo,
                &snapshot.read_pages,
                &snapshot.write_pages,
            ),
            ReportSection::build(
                "discont pages",
                "rpcs",
                RowLabel::Index,
                &snapshot.read_discont_pages,
                &snapshot.write_discont_pages,
            ),
            ReportSection::build(
                "discont blocks",
                "rpcs",
                RowLabel::Index,
                &snapshot.read_discont_blocks,
                &snapshot.write_discont_blocks,
            ),
        ];

        Self {
            snapshot_secs: since_epoch.as_secs(),
            snapshot_usecs: since_epoch.subsec_micros(),
            sections,
        }
    }
}

impl fmt::Display for BrwReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "snapshot_time:         {}.{} (secs.usecs)",
            self.snapshot_secs, self.snapshot_usecs
        )?;

        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "\t\t\tread\t\t\twrite")?;
            writeln!(
                f,
                "{:<20} {:>5}   % cum % |       rpcs   % cum %",
                section.title, section.unit
            )?;
            for row in &section.rows {
                writeln!(
                    f,
                    "{}:\t\t{:>10} {:>3} {:>3}   | {:>10} {:>3} {:>3}",
                    row.label,
                    row.read.count,
                    row.read.pct,
                    row.read.cum_pct,
                    row.write.count,
                    row.write.pct,
                    row.write.cum_pct
                )?;
            }
        }
        Ok(())
    }
}
