//! Sparse, validity-masked attribute record
//!
//! An [`AttributeSet`] carries one slot per [`AttributeKind`] plus a
//! [`ValidMask`] saying which slots are authoritative. Slots whose bit is
//! clear may hold stale data and must not be read.
//!
//! # Merge contract
//!
//! `dst.merge(&src, mask)` copies exactly the kinds in `mask ∩ src.valid` and
//! ORs that intersection into `dst.valid`. Nothing else in `dst` moves, so a
//! merge can never erase knowledge the destination already had, and never
//! invents a value the source did not have.
//!
//! ```
//! use attrsync::attr::{AttributeSet, ValidMask};
//!
//! let mut dst = AttributeSet::default();
//! let src = AttributeSet {
//!     size: 100,
//!     mtime: 500,
//!     valid: ValidMask::SIZE | ValidMask::MTIME,
//!     ..Default::default()
//! };
//!
//! dst.merge(&src, ValidMask::all());
//! assert_eq!(dst.valid, ValidMask::SIZE | ValidMask::MTIME);
//! assert_eq!(dst.size, 100);
//! assert_eq!(dst.mtime, 500);
//! ```

use super::inline::InlineData;
use super::kind::{AttributeKind, ValidMask};
use super::mode;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Attribute record shared between the storage backend, the wire and the
/// metadata layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeSet {
    pub id: u64,
    /// Seconds since the epoch
    pub atime: i64,
    pub mtime: i64,
    pub ctime: i64,
    pub size: u64,
    /// Allocated space in 512-byte units
    pub blocks: u64,
    pub blksize: u32,
    /// Kind and permission bits; see [`mode`]
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub flags: u32,
    pub nlink: u32,
    pub generation: u32,
    /// Object group (sequence) the id belongs to
    pub group: u64,
    pub inline: InlineData,
    pub valid: ValidMask,
}

/// Whether a comparison also looks at the inline buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompareInline {
    #[default]
    No,
    Yes,
}

/// Compact descriptor attached to bulk I/O requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoObject {
    pub id: u64,
    /// Zero when the record does not carry a valid group
    pub group: u64,
    /// Full mode word of the object
    pub object_type: u32,
}

impl AttributeSet {
    /// Empty record for object `id`; nothing is valid yet
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn is_valid(&self, kind: AttributeKind) -> bool {
        self.valid.has(kind)
    }

    /// Copy the kinds in `mask ∩ src.valid` from `src`
    ///
    /// `Type` and `Mode` splice their half of the mode word; `InlineData`
    /// copies the whole buffer.
    pub fn merge(&mut self, src: &AttributeSet, mask: ValidMask) {
        let effective = mask & src.valid;

        debug!(
            src_id = src.id,
            src_valid = src.valid.bits(),
            dst_id = self.id,
            mask = mask.bits(),
            "merging attributes"
        );

        for kind in effective.kinds() {
            copy_field(self, src, kind);
        }
        self.valid |= effective;
    }

    /// True if any kind in `mask` differs between `self` and `other`
    ///
    /// Validity is not consulted: callers ask about the kinds they care about.
    /// `Type` and `Mode` only look at their half of the mode word. The inline
    /// buffer is never part of this comparison; see [`Self::compare_with`].
    pub fn compare(&self, other: &AttributeSet, mask: ValidMask) -> bool {
        mask.kinds()
            .filter(|kind| *kind != AttributeKind::InlineData)
            .any(|kind| field_differs(self, other, kind))
    }

    /// True if the inline buffers differ
    pub fn compare_inline(&self, other: &AttributeSet) -> bool {
        self.inline != other.inline
    }

    /// [`Self::compare`], optionally widened to the inline buffer
    pub fn compare_with(
        &self,
        other: &AttributeSet,
        mask: ValidMask,
        inline: CompareInline,
    ) -> bool {
        self.compare(other, mask) || (inline == CompareInline::Yes && self.compare_inline(other))
    }

    /// Descriptor for a bulk I/O request on this object
    pub fn to_io_object(&self) -> IoObject {
        IoObject {
            id: self.id,
            group: if self.is_valid(AttributeKind::Group) {
                self.group
            } else {
                0
            },
            object_type: self.mode,
        }
    }
}

fn copy_field(dst: &mut AttributeSet, src: &AttributeSet, kind: AttributeKind) {
    match kind {
        AttributeKind::Id => dst.id = src.id,
        AttributeKind::AccessTime => dst.atime = src.atime,
        AttributeKind::ModifyTime => dst.mtime = src.mtime,
        AttributeKind::ChangeTime => dst.ctime = src.ctime,
        AttributeKind::Size => dst.size = src.size,
        AttributeKind::Blocks => dst.blocks = src.blocks,
        AttributeKind::BlockSize => dst.blksize = src.blksize,
        AttributeKind::Type => dst.mode = mode::splice_kind(dst.mode, src.mode),
        AttributeKind::Mode => dst.mode = mode::splice_perm(dst.mode, src.mode),
        AttributeKind::Uid => dst.uid = src.uid,
        AttributeKind::Gid => dst.gid = src.gid,
        AttributeKind::Flags => dst.flags = src.flags,
        AttributeKind::LinkCount => dst.nlink = src.nlink,
        AttributeKind::Generation => dst.generation = src.generation,
        AttributeKind::InlineData => dst.inline = src.inline,
        AttributeKind::Group => dst.group = src.group,
    }
}

fn field_differs(a: &AttributeSet, b: &AttributeSet, kind: AttributeKind) -> bool {
    match kind {
        AttributeKind::Id => a.id != b.id,
        AttributeKind::AccessTime => a.atime != b.atime,
        AttributeKind::ModifyTime => a.mtime != b.mtime,
        AttributeKind::ChangeTime => a.ctime != b.ctime,
        AttributeKind::Size => a.size != b.size,
        AttributeKind::Blocks => a.blocks != b.blocks,
        AttributeKind::BlockSize => a.blksize != b.blksize,
        AttributeKind::Type => mode::kind_bits(a.mode ^ b.mode) != 0,
        AttributeKind::Mode => mode::perm_bits(a.mode ^ b.mode) != 0,
        AttributeKind::Uid => a.uid != b.uid,
        AttributeKind::Gid => a.gid != b.gid,
        AttributeKind::Flags => a.flags != b.flags,
        AttributeKind::LinkCount => a.nlink != b.nlink,
        AttributeKind::Generation => a.generation != b.generation,
        AttributeKind::InlineData => a.inline != b.inline,
        AttributeKind::Group => a.group != b.group,
    }
}
