//! Cached local object metadata ⇄ [`AttributeSet`]
//!
//! [`InodeAttrs`] is the client-side cached copy of an object's attributes.
//! Besides plain copies in both directions it supports a *refresh*, used when
//! a possibly older remote view is folded into the cache: timestamps, block
//! count and block size only move forward.

use crate::attr::{mode, AttributeKind, AttributeSet, ValidMask};
use serde::{Deserialize, Serialize};

/// Kinds an [`InodeAttrs`] has a slot for
pub const INODE_KINDS: ValidMask = ValidMask::TIMES
    .union(ValidMask::SIZE)
    .union(ValidMask::BLOCKS)
    .union(ValidMask::BLKSIZE)
    .union(ValidMask::TYPE)
    .union(ValidMask::MODE)
    .union(ValidMask::OWNER)
    .union(ValidMask::FLAGS)
    .union(ValidMask::NLINK)
    .union(ValidMask::GENERATION);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InodeAttrs {
    pub atime: i64,
    pub mtime: i64,
    pub ctime: i64,
    pub size: u64,
    pub blocks: u64,
    pub blksize: u32,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub flags: u32,
    pub nlink: u32,
    pub generation: u32,
}

impl AttributeSet {
    /// Take every kind in `mask` the inode has a slot for
    ///
    /// The cached inode is authoritative for all its fields, so no validity
    /// check is made on the source side.
    pub fn update_from_inode(&mut self, inode: &InodeAttrs, mask: ValidMask) {
        let effective = mask & INODE_KINDS;

        for kind in effective.kinds() {
            match kind {
                AttributeKind::AccessTime => self.atime = inode.atime,
                AttributeKind::ModifyTime => self.mtime = inode.mtime,
                AttributeKind::ChangeTime => self.ctime = inode.ctime,
                AttributeKind::Size => self.size = inode.size,
                AttributeKind::Blocks => self.blocks = inode.blocks,
                AttributeKind::BlockSize => self.blksize = inode.blksize,
                AttributeKind::Type => self.mode = mode::splice_kind(self.mode, inode.mode),
                AttributeKind::Mode => self.mode = mode::splice_perm(self.mode, inode.mode),
                AttributeKind::Uid => self.uid = inode.uid,
                AttributeKind::Gid => self.gid = inode.gid,
                AttributeKind::Flags => self.flags = inode.flags,
                AttributeKind::LinkCount => self.nlink = inode.nlink,
                AttributeKind::Generation => self.generation = inode.generation,
                AttributeKind::Id | AttributeKind::InlineData | AttributeKind::Group => {}
            }
        }
        self.valid |= effective;
    }
}

impl InodeAttrs {
    /// Overwrite the fields in `mask ∩ set.valid` with the values from `set`
    pub fn update_from_attrs(&mut self, set: &AttributeSet, mask: ValidMask) {
        let effective = mask & set.valid & INODE_KINDS;

        for kind in effective.kinds() {
            match kind {
                AttributeKind::AccessTime => self.atime = set.atime,
                AttributeKind::ModifyTime => self.mtime = set.mtime,
                AttributeKind::ChangeTime => self.ctime = set.ctime,
                AttributeKind::Size => self.size = set.size,
                AttributeKind::Blocks => self.blocks = set.blocks,
                AttributeKind::BlockSize => self.blksize = set.blksize,
                AttributeKind::Type => self.mode = mode::splice_kind(self.mode, set.mode),
                AttributeKind::Mode => self.mode = mode::splice_perm(self.mode, set.mode),
                AttributeKind::Uid => self.uid = set.uid,
                AttributeKind::Gid => self.gid = set.gid,
                AttributeKind::Flags => self.flags = set.flags,
                AttributeKind::LinkCount => self.nlink = set.nlink,
                AttributeKind::Generation => self.generation = set.generation,
                AttributeKind::Id | AttributeKind::InlineData | AttributeKind::Group => {}
            }
        }
    }

    /// Fold a remote view into the cache without regressing it
    ///
    /// Times, blocks and block size are taken only when strictly newer or
    /// larger; size is always taken. Other kinds are not refreshed. Returns
    /// whether any field changed.
    pub fn refresh_from_attrs(&mut self, set: &AttributeSet, mask: ValidMask) -> bool {
        let effective = mask & set.valid;
        let before = self.clone();

        if effective.contains(ValidMask::ATIME) && set.atime > self.atime {
            self.atime = set.atime;
        }
        if effective.contains(ValidMask::MTIME) && set.mtime > self.mtime {
            self.mtime = set.mtime;
        }
        if effective.contains(ValidMask::CTIME) && set.ctime > self.ctime {
            self.ctime = set.ctime;
        }
        if effective.contains(ValidMask::SIZE) {
            self.size = set.size;
        }
        if effective.contains(ValidMask::BLKSIZE) && set.blksize > self.blksize {
            self.blksize = set.blksize;
        }
        if effective.contains(ValidMask::BLOCKS) && set.blocks > self.blocks {
            self.blocks = set.blocks;
        }

        *self != before
    }
}
