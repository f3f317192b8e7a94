//! Set-attributes requests ⇄ [`AttributeSet`]
//!
//! Both directions write the permission half of the mode word, so both pass
//! it through [`sanitize_mode`]. Applying the policy in only one direction
//! would let a caller launder a set-group-ID bit through a round trip.

use super::policy::{sanitize_mode, PrivilegeCheck};
use crate::attr::{mode, AttributeSet, ValidMask};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::debug;

bitflags! {
    /// Which fields of a [`SetAttrRequest`] the caller wants applied
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct AttrValid: u32 {
        const MODE = 1 << 0;
        const UID = 1 << 1;
        const GID = 1 << 2;
        const SIZE = 1 << 3;
        const ATIME = 1 << 4;
        const MTIME = 1 << 5;
        const CTIME = 1 << 6;
        const ATTR_FLAG = 1 << 10;
        const BLOCKS = 1 << 27;
    }
}

/// A request to change some attributes of an object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetAttrRequest {
    pub valid: AttrValid,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub atime: i64,
    pub mtime: i64,
    pub ctime: i64,
}

impl SetAttrRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self.valid |= AttrValid::MODE;
        self
    }

    pub fn with_uid(mut self, uid: u32) -> Self {
        self.uid = uid;
        self.valid |= AttrValid::UID;
        self
    }

    pub fn with_gid(mut self, gid: u32) -> Self {
        self.gid = gid;
        self.valid |= AttrValid::GID;
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self.valid |= AttrValid::SIZE;
        self
    }

    pub fn with_mtime(mut self, mtime: i64) -> Self {
        self.mtime = mtime;
        self.valid |= AttrValid::MTIME;
        self
    }

    /// Build a request carrying the fields of `set` in `mask ∩ set.valid`
    pub fn from_attrs<P: PrivilegeCheck + ?Sized>(
        set: &AttributeSet,
        mask: ValidMask,
        who: &P,
    ) -> Self {
        let mut req = Self::new();
        req.update_from_attrs(set, mask, who);
        req
    }

    /// Refill this request from `set`
    ///
    /// The request's mask is reset first: a request only asks for what is
    /// being sent now. Field values outside the new mask are left as they
    /// were, including the kind bits of `mode`; the object type is never
    /// changed through a set-attributes request.
    pub fn update_from_attrs<P: PrivilegeCheck + ?Sized>(
        &mut self,
        set: &AttributeSet,
        mask: ValidMask,
        who: &P,
    ) {
        let effective = mask & set.valid;

        if effective.intersects(ValidMask::MTIME | ValidMask::CTIME) {
            debug!(
                valid = set.valid.bits(),
                mtime = set.mtime,
                ctime = set.ctime,
                "new times for set-attributes request"
            );
        }

        self.valid = AttrValid::empty();
        if effective.contains(ValidMask::ATIME) {
            self.atime = set.atime;
            self.valid |= AttrValid::ATIME;
        }
        if effective.contains(ValidMask::MTIME) {
            self.mtime = set.mtime;
            self.valid |= AttrValid::MTIME;
        }
        if effective.contains(ValidMask::CTIME) {
            self.ctime = set.ctime;
            self.valid |= AttrValid::CTIME;
        }
        if effective.contains(ValidMask::SIZE) {
            self.size = set.size;
            self.valid |= AttrValid::SIZE;
        }
        if effective.contains(ValidMask::MODE) {
            let requested = mode::splice_perm(self.mode, set.mode);
            self.mode = sanitize_mode(requested, set.gid, who);
            self.valid |= AttrValid::MODE;
        }
        if effective.contains(ValidMask::UID) {
            self.uid = set.uid;
            self.valid |= AttrValid::UID;
        }
        if effective.contains(ValidMask::GID) {
            self.gid = set.gid;
            self.valid |= AttrValid::GID;
        }
    }
}

impl AttributeSet {
    /// Apply every field `req` carries
    pub fn update_from_request<P: PrivilegeCheck + ?Sized>(
        &mut self,
        req: &SetAttrRequest,
        who: &P,
    ) {
        self.update_from_request_masked(req, req.valid, who);
    }

    /// Apply the fields of `req` in `mask ∩ req.valid`
    ///
    /// A requested mode replaces the whole mode word and marks both `Type`
    /// and `Mode` valid. The mode is applied before ownership, so the
    /// set-group-ID check runs against the object's current group.
    pub fn update_from_request_masked<P: PrivilegeCheck + ?Sized>(
        &mut self,
        req: &SetAttrRequest,
        mask: AttrValid,
        who: &P,
    ) {
        let effective = mask & req.valid;

        if effective.contains(AttrValid::ATIME) {
            self.atime = req.atime;
            self.valid |= ValidMask::ATIME;
        }
        if effective.contains(AttrValid::MTIME) {
            self.mtime = req.mtime;
            self.valid |= ValidMask::MTIME;
        }
        if effective.contains(AttrValid::CTIME) {
            self.ctime = req.ctime;
            self.valid |= ValidMask::CTIME;
        }
        if effective.contains(AttrValid::SIZE) {
            self.size = req.size;
            self.valid |= ValidMask::SIZE;
        }
        if effective.contains(AttrValid::MODE) {
            // Checked against the group the object has before this request
            self.mode = sanitize_mode(req.mode, self.gid, who);
            self.valid |= ValidMask::TYPE | ValidMask::MODE;
        }
        if effective.contains(AttrValid::UID) {
            self.uid = req.uid;
            self.valid |= ValidMask::UID;
        }
        if effective.contains(AttrValid::GID) {
            self.gid = req.gid;
            self.valid |= ValidMask::GID;
        }
    }
}
