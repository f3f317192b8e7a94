//! attrsync - masked object attribute synchronization for a distributed
//! object store, plus bulk I/O contiguity statistics
//!
//! - [`attr`]: the attribute record, its validity mask and the inline buffer
//! - [`translate`]: conversion to and from backend, request, metadata and
//!   inode representations, with the set-group-ID policy
//! - [`stats`]: lock-free histograms of bulk read/write contiguity and their
//!   cumulative-percentage report
//! - [`replay`]: JSON-lines trace replay over a worker pool

pub mod attr;
pub mod cli;
pub mod config;
pub mod replay;
pub mod stats;
pub mod translate;
