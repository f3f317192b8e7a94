//! Set-group-ID clearing policy
//!
//! Any translation that writes the permission half of a mode word runs it
//! through [`sanitize_mode`]. A principal that is neither a member of the
//! object's group nor holds the override capability cannot leave
//! [`S_ISGID`] set, whatever it asked for. Identity resolution is not done
//! here; callers supply a [`PrivilegeCheck`].

use crate::attr::mode::S_ISGID;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Answers the two questions the policy needs about the acting principal
pub trait PrivilegeCheck {
    /// Whether the principal is a member of group `gid`
    fn is_group_member(&self, gid: u32) -> bool;

    /// Whether the principal may keep set-group-ID regardless of membership
    fn has_override_capability(&self) -> bool;
}

/// Acting principal described by its credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Principal {
    pub uid: u32,
    /// Effective (filesystem) group
    pub gid: u32,
    /// Supplementary groups
    pub groups: Vec<u32>,
    pub override_capability: bool,
}

impl Principal {
    pub fn new(uid: u32, gid: u32) -> Self {
        Self {
            uid,
            gid,
            ..Default::default()
        }
    }

    pub fn with_groups(mut self, groups: impl IntoIterator<Item = u32>) -> Self {
        self.groups.extend(groups);
        self
    }

    pub fn with_override(mut self, allowed: bool) -> Self {
        self.override_capability = allowed;
        self
    }
}

impl PrivilegeCheck for Principal {
    fn is_group_member(&self, gid: u32) -> bool {
        self.gid == gid || self.groups.contains(&gid)
    }

    fn has_override_capability(&self) -> bool {
        self.override_capability
    }
}

/// Principal that passes every check
#[derive(Debug, Clone, Copy, Default)]
pub struct Privileged;

impl PrivilegeCheck for Privileged {
    fn is_group_member(&self, _gid: u32) -> bool {
        true
    }

    fn has_override_capability(&self) -> bool {
        true
    }
}

/// Clear [`S_ISGID`] from `mode` unless `who` may set it on an object owned by `target_gid`
pub fn sanitize_mode<P: PrivilegeCheck + ?Sized>(mode: u32, target_gid: u32, who: &P) -> u32 {
    if mode & S_ISGID == 0 {
        return mode;
    }
    if who.is_group_member(target_gid) || who.has_override_capability() {
        return mode;
    }

    debug!(
        mode = %format!("{mode:o}"),
        target_gid,
        "clearing set-group-ID for non-member without override"
    );
    mode & !S_ISGID
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_member_loses_sgid() {
        let who = Principal::new(1000, 1000);
        assert_eq!(sanitize_mode(0o2755, 50, &who), 0o0755);
    }

    #[test]
    fn test_member_keeps_sgid() {
        let primary = Principal::new(1000, 50);
        assert_eq!(sanitize_mode(0o2755, 50, &primary), 0o2755);

        let supplementary = Principal::new(1000, 1000).with_groups([7, 50]);
        assert_eq!(sanitize_mode(0o2755, 50, &supplementary), 0o2755);
    }

    #[test]
    fn test_override_keeps_sgid() {
        let who = Principal::new(1000, 1000).with_override(true);
        assert_eq!(sanitize_mode(0o2755, 50, &who), 0o2755);
    }

    #[test]
    fn test_other_bits_untouched() {
        let who = Principal::new(1000, 1000);
        assert_eq!(sanitize_mode(0o104755, 50, &who), 0o104755);
        assert_eq!(sanitize_mode(0o106755, 50, &who), 0o104755);
    }

    #[test]
    fn test_works_through_trait_object() {
        let who: &dyn PrivilegeCheck = &Principal::new(1, 1);
        assert_eq!(sanitize_mode(0o2700, 2, who), 0o0700);
        assert_eq!(sanitize_mode(0o2700, 2, &Privileged), 0o2700);
    }
}
