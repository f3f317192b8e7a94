//! Bulk read/write contiguity statistics
//!
//! Every bulk request is classified three ways, separately for reads and
//! writes:
//!
//! - **pages per request**, log2-bucketed
//! - **discontiguous pages**: how many times a page index is not exactly one
//!   past the previous page's
//! - **discontiguous blocks**: the same adjacency rule over on-disk block
//!   numbers
//!
//! Block contiguity for reads is best effort: it is only counted between two
//! pages that both carry a resolved block number. A backend that cannot
//! resolve buffers reports zero read block discontinuities.

use super::histogram::{Histogram, HistogramSnapshot};
use super::report::BrwReport;
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

/// One prepared local buffer of a read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalBuf {
    /// Page index; `None` when no page backs this buffer (short read)
    pub page: Option<u64>,
    /// First block number of the page, when the backend could resolve it
    #[serde(default)]
    pub block: Option<u64>,
}

impl LocalBuf {
    pub fn mapped(page: u64) -> Self {
        Self {
            page: Some(page),
            block: None,
        }
    }

    pub fn unmapped() -> Self {
        Self::default()
    }

    pub fn with_block(mut self, block: u64) -> Self {
        self.block = Some(block);
        self
    }
}

/// The six histograms of one storage target
#[derive(Debug, Default)]
pub struct BrwStats {
    read_pages: Histogram,
    write_pages: Histogram,
    read_discont_pages: Histogram,
    write_discont_pages: Histogram,
    read_discont_blocks: Histogram,
    write_discont_blocks: Histogram,
}

impl BrwStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account one bulk write
    ///
    /// `pages` are page indices in request order; `blocks` holds
    /// `blocks_per_page` block numbers for each page, in the same order.
    /// Block numbers past `pages.len() * blocks_per_page` are ignored.
    pub fn tally_write(&self, pages: &[u64], blocks: &[u64], blocks_per_page: usize) {
        if pages.is_empty() {
            return;
        }

        let block_span = pages.len().saturating_mul(blocks_per_page);
        let discont_pages = count_gaps(pages.iter().copied());
        let discont_blocks = count_gaps(blocks.iter().copied().take(block_span));

        trace!(
            pages = pages.len(),
            discont_pages,
            discont_blocks,
            "tally write"
        );

        self.write_pages.tally_log2(pages.len() as u64);
        self.write_discont_pages.tally(discont_pages);
        self.write_discont_blocks.tally(discont_blocks);
    }

    /// Account one bulk read over already prepared local buffers
    ///
    /// The scan stops at the first buffer without a page. The request size
    /// recorded is the full buffer count, short read or not.
    pub fn tally_read(&self, bufs: &[LocalBuf]) {
        if bufs.is_empty() {
            return;
        }

        let mut discont_pages = 0u64;
        let mut discont_blocks = 0u64;
        let mut last: Option<(u64, Option<u64>)> = None;

        for (page, block) in bufs.iter().map_while(|b| b.page.map(|p| (p, b.block))) {
            if let Some((last_page, last_block)) = last {
                if page != last_page.wrapping_add(1) {
                    discont_pages += 1;
                }
                if let (Some(block), Some(last_block)) = (block, last_block) {
                    if block != last_block.wrapping_add(1) {
                        discont_blocks += 1;
                    }
                }
            }
            last = Some((page, block));
        }

        trace!(
            bufs = bufs.len(),
            discont_pages,
            discont_blocks,
            "tally read"
        );

        self.read_pages.tally_log2(bufs.len() as u64);
        self.read_discont_pages.tally(discont_pages);
        self.read_discont_blocks.tally(discont_blocks);
    }

    /// Zero all six histograms
    pub fn clear(&self) {
        self.read_pages.clear();
        self.write_pages.clear();
        self.read_discont_pages.clear();
        self.write_discont_pages.clear();
        self.read_discont_blocks.clear();
        self.write_discont_blocks.clear();
        info!("brw stats cleared");
    }

    pub fn snapshot(&self) -> BrwSnapshot {
        BrwSnapshot {
            read_pages: self.read_pages.snapshot(),
            write_pages: self.write_pages.snapshot(),
            read_discont_pages: self.read_discont_pages.snapshot(),
            write_discont_pages: self.write_discont_pages.snapshot(),
            read_discont_blocks: self.read_discont_blocks.snapshot(),
            write_discont_blocks: self.write_discont_blocks.snapshot(),
        }
    }

    /// Snapshot and render; races with concurrent tallies
    pub fn report(&self) -> BrwReport {
        BrwReport::new(&self.snapshot())
    }
}

/// Plain copy of all six histograms
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrwSnapshot {
    pub read_pages: HistogramSnapshot,
    pub write_pages: HistogramSnapshot,
    pub read_discont_pages: HistogramSnapshot,
    pub write_discont_pages: HistogramSnapshot,
    pub read_discont_blocks: HistogramSnapshot,
    pub write_discont_blocks: HistogramSnapshot,
}

/// Number of positions whose index is not exactly one past the previous one
fn count_gaps(indices: impl Iterator<Item = u64>) -> u64 {
    let mut gaps = 0;
    let mut last: Option<u64> = None;
    for idx in indices {
        if let Some(prev) = last {
            if idx != prev.wrapping_add(1) {
                gaps += 1;
            }
        }
        last = Some(idx);
    }
    gaps
}
