//! Storage backend attributes ⇄ [`AttributeSet`]
//!
//! The local backend describes objects with [`LocalAttrs`], which carries its
//! own validity mask ([`LocalValid`]) with a different bit layout. Translation
//! walks a fixed table pairing each local bit with an [`AttributeKind`]; bits
//! outside the table are ignored in both directions, and the destination's
//! existing validity is only ever widened.

use crate::attr::{mode, AttributeKind, AttributeSet, ValidMask};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Validity bits of [`LocalAttrs`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct LocalValid: u32 {
        const ATIME = 1 << 0;
        const MTIME = 1 << 1;
        const CTIME = 1 << 2;
        const SIZE = 1 << 3;
        const MODE = 1 << 4;
        const UID = 1 << 5;
        const GID = 1 << 6;
        const BLOCKS = 1 << 7;
        const TYPE = 1 << 8;
        const FLAGS = 1 << 9;
        const NLINK = 1 << 10;
        const BLKSIZE = 1 << 12;
    }
}

/// Attributes as reported or accepted by the local storage backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalAttrs {
    pub valid: LocalValid,
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
}

const LOCAL_MAP: [(LocalValid, AttributeKind); 12] = [
    (LocalValid::ATIME, AttributeKind::AccessTime),
    (LocalValid::MTIME, AttributeKind::ModifyTime),
    (LocalValid::CTIME, AttributeKind::ChangeTime),
    (LocalValid::SIZE, AttributeKind::Size),
    (LocalValid::BLOCKS, AttributeKind::Blocks),
    (LocalValid::BLKSIZE, AttributeKind::BlockSize),
    (LocalValid::TYPE, AttributeKind::Type),
    (LocalValid::MODE, AttributeKind::Mode),
    (LocalValid::UID, AttributeKind::Uid),
    (LocalValid::GID, AttributeKind::Gid),
    (LocalValid::FLAGS, AttributeKind::Flags),
    (LocalValid::NLINK, AttributeKind::LinkCount),
];

impl LocalValid {
    /// Local bits corresponding to the kinds in `mask`
    pub fn from_attr_mask(mask: ValidMask) -> Self {
        LOCAL_MAP
            .iter()
            .filter(|(_, kind)| mask.has(*kind))
            .fold(LocalValid::empty(), |acc, (bit, _)| acc | *bit)
    }

    /// Attribute kinds corresponding to these local bits
    pub fn to_attr_mask(self) -> ValidMask {
        LOCAL_MAP
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .fold(ValidMask::empty(), |acc, (_, kind)| acc | kind.mask())
    }
}

impl AttributeSet {
    /// Take the fields of `la` that are in `mask ∩ la.valid`
    pub fn update_from_local(&mut self, la: &LocalAttrs, mask: LocalValid) {
        let effective = mask & la.valid;

        for (bit, kind) in LOCAL_MAP {
            if !effective.contains(bit) {
                continue;
            }
            match kind {
                AttributeKind::AccessTime => self.atime = la.atime,
                AttributeKind::ModifyTime => self.mtime = la.mtime,
                AttributeKind::ChangeTime => self.ctime = la.ctime,
                AttributeKind::Size => self.size = la.size,
                AttributeKind::Blocks => self.blocks = la.blocks,
                AttributeKind::BlockSize => self.blksize = la.blksize,
                AttributeKind::Type => self.mode = mode::splice_kind(self.mode, la.mode),
                AttributeKind::Mode => self.mode = mode::splice_perm(self.mode, la.mode),
                AttributeKind::Uid => self.uid = la.uid,
                AttributeKind::Gid => self.gid = la.gid,
                AttributeKind::Flags => self.flags = la.flags,
                AttributeKind::LinkCount => self.nlink = la.nlink,
                _ => continue,
            }
            self.valid |= kind.mask();
        }
    }
}

impl LocalAttrs {
    /// Take the fields of `set` that are in `mask ∩ set.valid`
    pub fn update_from_attrs(&mut self, set: &AttributeSet, mask: ValidMask) {
        let effective = mask & set.valid;

        for (bit, kind) in LOCAL_MAP {
            if !effective.has(kind) {
                continue;
            }
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
                _ => continue,
            }
            self.valid |= bit;
        }
    }
}
