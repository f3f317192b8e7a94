//! Metadata-operation records ⇄ [`AttributeSet`]
//!
//! [`MdOpData`] wraps a [`SetAttrRequest`] and adds the two fields the plain
//! request has no room for: allocated blocks and extended flags. The core
//! fields go through the set-attributes translation (including its policy);
//! this module only layers the extra two on top.

use super::policy::PrivilegeCheck;
use super::setattr::{AttrValid, SetAttrRequest};
use crate::attr::{AttributeSet, ValidMask};
use serde::{Deserialize, Serialize};

/// Attribute payload of a metadata operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MdOpData {
    pub attr: SetAttrRequest,
    /// Valid when `attr.valid` has [`AttrValid::BLOCKS`]
    pub attr_blocks: u64,
    /// Valid when `attr.valid` has [`AttrValid::ATTR_FLAG`]
    pub attr_flags: u32,
}

impl MdOpData {
    pub fn from_attrs<P: PrivilegeCheck + ?Sized>(
        set: &AttributeSet,
        mask: ValidMask,
        who: &P,
    ) -> Self {
        let mut op = Self::default();
        op.update_from_attrs(set, mask, who);
        op
    }

    /// Refill from `set`; see [`SetAttrRequest::update_from_attrs`]
    pub fn update_from_attrs<P: PrivilegeCheck + ?Sized>(
        &mut self,
        set: &AttributeSet,
        mask: ValidMask,
        who: &P,
    ) {
        self.attr.update_from_attrs(set, mask, who);

        let effective = mask & set.valid;
        if effective.contains(ValidMask::BLOCKS) {
            self.attr_blocks = set.blocks;
            self.attr.valid |= AttrValid::BLOCKS;
        }
        if effective.contains(ValidMask::FLAGS) {
            self.attr_flags = set.flags;
            self.attr.valid |= AttrValid::ATTR_FLAG;
        }
    }
}

impl AttributeSet {
    /// Apply the fields of `op` in `mask ∩ op.attr.valid`
    pub fn update_from_md<P: PrivilegeCheck + ?Sized>(
        &mut self,
        op: &MdOpData,
        mask: AttrValid,
        who: &P,
    ) {
        self.update_from_request_masked(&op.attr, mask, who);

        let effective = mask & op.attr.valid;
        if effective.contains(AttrValid::BLOCKS) {
            self.blocks = op.attr_blocks;
            self.valid |= ValidMask::BLOCKS;
        }
        if effective.contains(AttrValid::ATTR_FLAG) {
            self.flags = op.attr_flags;
            self.valid |= ValidMask::FLAGS;
        }
    }
}
