//! Bulk I/O trace replay
//!
//! A trace is JSON lines, one bulk request per line:
//!
//! ```text
//! {"op":"write","pages":[10,11,13,14]}
//! {"op":"write","pages":[0,1],"blocks":[100,101,500,501]}
//! {"op":"read","bufs":[{"page":10,"block":80},{"page":11},{"page":null}]}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. A write without
//! `blocks` is treated as laid out linearly on disk.
//!
//! Replay hands record indices to a pool of scoped workers through a
//! lock-free queue; all workers tally into the same [`BrwStats`].

use crate::config::MAX_BLOCKS_PER_PAGE;
use crate::stats::{BrwStats, LocalBuf};
use anyhow::{anyhow, Context, Result};
use crossbeam::queue::ArrayQueue;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// One bulk request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum TraceRecord {
    Write {
        pages: Vec<u64>,
        #[serde(default)]
        blocks: Vec<u64>,
    },
    Read {
        bufs: Vec<LocalBuf>,
    },
}

impl TraceRecord {
    /// Tally this record into `stats`
    pub fn apply(&self, stats: &BrwStats, blocks_per_page: usize) {
        match self {
            TraceRecord::Write { pages, blocks } if blocks.is_empty() => {
                let linear = linear_blocks(pages, blocks_per_page);
                stats.tally_write(pages, &linear, blocks_per_page);
            }
            TraceRecord::Write { pages, blocks } => {
                stats.tally_write(pages, blocks, blocks_per_page);
            }
            TraceRecord::Read { bufs } => stats.tally_read(bufs),
        }
    }

    fn is_write(&self) -> bool {
        matches!(self, TraceRecord::Write { .. })
    }
}

/// Block numbers of pages mapped one-to-one onto consecutive blocks
fn linear_blocks(pages: &[u64], blocks_per_page: usize) -> Vec<u64> {
    let bpp = blocks_per_page as u64;
    pages
        .iter()
        .flat_map(|page| {
            let first = page.wrapping_mul(bpp);
            (0..bpp).map(move |i| first.wrapping_add(i))
        })
        .collect()
}

/// Parse a JSON-lines trace
pub fn parse_trace<R: BufRead>(reader: R) -> Result<Vec<TraceRecord>> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let lineno = idx + 1;
        let line = line.with_context(|| format!("Failed to read trace line {}", lineno))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let record: TraceRecord = serde_json::from_str(line)
            .with_context(|| format!("Invalid trace record on line {}", lineno))?;
        records.push(record);
    }
    debug!(records = records.len(), "parsed trace");
    Ok(records)
}

/// Load a JSON-lines trace from disk
pub fn load_trace<P: AsRef<Path>>(path: P) -> Result<Vec<TraceRecord>> {
    let file = File::open(path.as_ref())
        .with_context(|| format!("Failed to open trace file: {}", path.as_ref().display()))?;
    parse_trace(BufReader::new(file))
        .with_context(|| format!("Failed to parse trace file: {}", path.as_ref().display()))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub writes: u64,
    pub reads: u64,
}

/// Tally every record into `stats` using `workers` threads
pub fn replay(
    stats: &BrwStats,
    records: &[TraceRecord],
    blocks_per_page: usize,
    workers: usize,
) -> Result<ReplaySummary> {
    if !(1..=MAX_BLOCKS_PER_PAGE).contains(&blocks_per_page) {
        anyhow::bail!(
            "blocks_per_page must be in [1, {}], got {}",
            MAX_BLOCKS_PER_PAGE,
            blocks_per_page
        );
    }
    if records.is_empty() {
        return Ok(ReplaySummary::default());
    }

    let workers = workers.clamp(1, records.len());
    let queue = ArrayQueue::new(records.len());
    for idx in 0..records.len() {
        // Capacity equals the record count
        let _ = queue.push(idx);
    }

    let writes = AtomicU64::new(0);
    let reads = AtomicU64::new(0);

    crossbeam::thread::scope(|s| {
        for worker in 0..workers {
            let (queue, writes, reads) = (&queue, &writes, &reads);
            s.spawn(move |_| {
                let mut handled = 0usize;
                while let Some(idx) = queue.pop() {
                    let record = &records[idx];
                    record.apply(stats, blocks_per_page);
                    if record.is_write() {
                        writes.fetch_add(1, Ordering::Relaxed);
                    } else {
                        reads.fetch_add(1, Ordering::Relaxed);
                    }
                    handled += 1;
                }
                debug!(worker, handled, "replay worker done");
            });
        }
    })
    .map_err(|_| anyhow!("replay worker panicked"))?;

    let summary = ReplaySummary {
        writes: writes.into_inner(),
        reads: reads.into_inner(),
    };
    info!(
        writes = summary.writes,
        reads = summary.reads,
        workers,
        "trace replayed"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TRACE: &str = r#"
# two writes and a short read
{"op":"write","pages":[10,11,13,14]}
{"op":"write","pages":[0,1],"blocks":[100,101,500,501]}

{"op":"read","bufs":[{"page":10,"block":80},{"page":11,"block":81},{"page":null}]}
"#;

    #[test]
    fn test_parse_trace() {
        let records = parse_trace(Cursor::new(TRACE)).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            TraceRecord::Write {
                pages: vec![10, 11, 13, 14],
                blocks: vec![],
            }
        );
        match &records[2] {
            TraceRecord::Read { bufs } => {
                assert_eq!(bufs[0], LocalBuf::mapped(10).with_block(80));
                assert_eq!(bufs[2], LocalBuf::unmapped());
            }
            other => panic!("unexpected record: {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_names_line() {
        let err = parse_trace(Cursor::new("{\"op\":\"write\",\"pages\":[]}\n{\"op\":\"erase\"}\n"))
            .unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn test_linear_blocks() {
        assert_eq!(linear_blocks(&[3, 4], 2), vec![6, 7, 8, 9]);
        assert!(linear_blocks(&[], 4).is_empty());
    }

    #[test]
    fn test_missing_blocks_follow_pages() {
        let stats = BrwStats::new();
        let record = TraceRecord::Write {
            pages: vec![0, 1, 5],
            blocks: vec![],
        };
        record.apply(&stats, 4);

        let snap = stats.snapshot();
        assert_eq!(snap.write_discont_pages.buckets[1], 1);
        assert_eq!(snap.write_discont_blocks.buckets[1], 1);
    }

    #[test]
    fn test_replay_single_and_multi_worker_agree() {
        let records = parse_trace(Cursor::new(TRACE)).unwrap();
        let records: Vec<_> = records.iter().cycle().take(300).cloned().collect();

        let serial = BrwStats::new();
        let summary = replay(&serial, &records, 1, 1).unwrap();
        assert_eq!(summary, ReplaySummary { writes: 200, reads: 100 });

        let parallel = BrwStats::new();
        let summary = replay(&parallel, &records, 1, 8).unwrap();
        assert_eq!(summary.writes + summary.reads, 300);

        assert_eq!(serial.snapshot(), parallel.snapshot());
    }

    #[test]
    fn test_replay_empty_and_invalid() {
        let stats = BrwStats::new();
        assert_eq!(replay(&stats, &[], 1, 4).unwrap(), ReplaySummary::default());
        assert!(replay(&stats, &[], 0, 4).is_err());

        let huge = [TraceRecord::Write {
            pages: vec![0],
            blocks: vec![],
        }];
        assert!(replay(&stats, &huge, MAX_BLOCKS_PER_PAGE + 1, 1).is_err());
        assert!(stats.snapshot().write_pages.is_empty());
    }

    #[test]
    fn test_load_trace_missing_file() {
        assert!(load_trace("/nonexistent/trace.jsonl").is_err());
    }
}
