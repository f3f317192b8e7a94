//! Attribute identifiers and validity masks
//!
//! Every [`AttributeKind`] owns exactly one bit of a [`ValidMask`]. The bit
//! positions are shared with peers on the other end of the wire and are a
//! versioned ABI: never renumber an existing kind, only append new ones on
//! unused positions.
//!
//! | Kind         | Bit | Mask constant |
//! |--------------|-----|---------------|
//! | `Id`         | 0   | `ID`          |
//! | `AccessTime` | 1   | `ATIME`       |
//! | `ModifyTime` | 2   | `MTIME`       |
//! | `ChangeTime` | 3   | `CTIME`       |
//! | `Size`       | 4   | `SIZE`        |
//! | `Blocks`     | 5   | `BLOCKS`      |
//! | `BlockSize`  | 6   | `BLKSIZE`     |
//! | `Mode`       | 7   | `MODE`        |
//! | `Type`       | 8   | `TYPE`        |
//! | `Uid`        | 9   | `UID`         |
//! | `Gid`        | 10  | `GID`         |
//! | `Flags`      | 11  | `FLAGS`       |
//! | `LinkCount`  | 13  | `NLINK`       |
//! | `Generation` | 14  | `GENERATION`  |
//! | `InlineData` | 15  | `INLINE`      |
//! | `Group`      | 24  | `GROUP`       |

use super::error::{AttrError, Result};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single attribute of an object, identified by its bit position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AttributeKind {
    Id = 0,
    AccessTime = 1,
    ModifyTime = 2,
    ChangeTime = 3,
    Size = 4,
    Blocks = 5,
    BlockSize = 6,
    Mode = 7,
    Type = 8,
    Uid = 9,
    Gid = 10,
    Flags = 11,
    LinkCount = 13,
    Generation = 14,
    InlineData = 15,
    Group = 24,
}

bitflags! {
    /// Which fields of an attribute record hold authoritative data
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ValidMask: u64 {
        const ID = 1 << AttributeKind::Id as u64;
        const ATIME = 1 << AttributeKind::AccessTime as u64;
        const MTIME = 1 << AttributeKind::ModifyTime as u64;
        const CTIME = 1 << AttributeKind::ChangeTime as u64;
        const SIZE = 1 << AttributeKind::Size as u64;
        const BLOCKS = 1 << AttributeKind::Blocks as u64;
        const BLKSIZE = 1 << AttributeKind::BlockSize as u64;
        const MODE = 1 << AttributeKind::Mode as u64;
        const TYPE = 1 << AttributeKind::Type as u64;
        const UID = 1 << AttributeKind::Uid as u64;
        const GID = 1 << AttributeKind::Gid as u64;
        const FLAGS = 1 << AttributeKind::Flags as u64;
        const NLINK = 1 << AttributeKind::LinkCount as u64;
        const GENERATION = 1 << AttributeKind::Generation as u64;
        const INLINE = 1 << AttributeKind::InlineData as u64;
        const GROUP = 1 << AttributeKind::Group as u64;

        const TIMES = Self::ATIME.bits() | Self::MTIME.bits() | Self::CTIME.bits();
        const OWNER = Self::UID.bits() | Self::GID.bits();
    }
}

impl AttributeKind {
    /// Every kind, in bit order
    pub const ALL: [AttributeKind; 16] = [
        AttributeKind::Id,
        AttributeKind::AccessTime,
        AttributeKind::ModifyTime,
        AttributeKind::ChangeTime,
        AttributeKind::Size,
        AttributeKind::Blocks,
        AttributeKind::BlockSize,
        AttributeKind::Mode,
        AttributeKind::Type,
        AttributeKind::Uid,
        AttributeKind::Gid,
        AttributeKind::Flags,
        AttributeKind::LinkCount,
        AttributeKind::Generation,
        AttributeKind::InlineData,
        AttributeKind::Group,
    ];

    /// Bit position of this kind in a [`ValidMask`]
    pub const fn bit(self) -> u8 {
        self as u8
    }

    /// Single-bit mask for this kind
    pub const fn mask(self) -> ValidMask {
        ValidMask::from_bits_retain(1 << self as u64)
    }

    /// Short name used in mask expressions and CLI output
    pub const fn name(self) -> &'static str {
        match self {
            AttributeKind::Id => "id",
            AttributeKind::AccessTime => "atime",
            AttributeKind::ModifyTime => "mtime",
            AttributeKind::ChangeTime => "ctime",
            AttributeKind::Size => "size",
            AttributeKind::Blocks => "blocks",
            AttributeKind::BlockSize => "blksize",
            AttributeKind::Mode => "mode",
            AttributeKind::Type => "type",
            AttributeKind::Uid => "uid",
            AttributeKind::Gid => "gid",
            AttributeKind::Flags => "flags",
            AttributeKind::LinkCount => "nlink",
            AttributeKind::Generation => "generation",
            AttributeKind::InlineData => "inline",
            AttributeKind::Group => "group",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttributeKind {
    type Err = AttrError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        AttributeKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| AttrError::UnknownAttribute(s.trim().to_string()))
    }
}

impl From<AttributeKind> for ValidMask {
    fn from(kind: AttributeKind) -> Self {
        kind.mask()
    }
}

impl ValidMask {
    /// Build a mask from raw wire bits, dropping any bit this build does not know
    pub fn from_raw(bits: u64) -> Self {
        Self::from_bits_truncate(bits)
    }

    /// Whether the bit for `kind` is set
    pub fn has(self, kind: AttributeKind) -> bool {
        self.contains(kind.mask())
    }

    /// Kinds present in this mask, in bit order
    pub fn kinds(self) -> impl Iterator<Item = AttributeKind> {
        AttributeKind::ALL
            .into_iter()
            .filter(move |kind| self.has(*kind))
    }

    /// Parse a mask expression like "atime,mtime,size", "times,owner" or "all"
    pub fn parse_expr(expr: &str) -> Result<Self> {
        let mut mask = ValidMask::empty();
        let mut seen = false;

        for part in expr.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            seen = true;

            mask |= match part.to_ascii_lowercase().as_str() {
                "all" => ValidMask::all(),
                "times" => ValidMask::TIMES,
                "owner" => ValidMask::OWNER,
                "none" => ValidMask::empty(),
                _ => part.parse::<AttributeKind>()?.mask(),
            };
        }

        if !seen {
            return Err(AttrError::EmptyMask);
        }
        Ok(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_positions_are_stable() {
        assert_eq!(ValidMask::ID.bits(), 0x1);
        assert_eq!(ValidMask::ATIME.bits(), 0x2);
        assert_eq!(ValidMask::MTIME.bits(), 0x4);
        assert_eq!(ValidMask::CTIME.bits(), 0x8);
        assert_eq!(ValidMask::SIZE.bits(), 0x10);
        assert_eq!(ValidMask::BLOCKS.bits(), 0x20);
        assert_eq!(ValidMask::BLKSIZE.bits(), 0x40);
        assert_eq!(ValidMask::MODE.bits(), 0x80);
        assert_eq!(ValidMask::TYPE.bits(), 0x100);
        assert_eq!(ValidMask::UID.bits(), 0x200);
        assert_eq!(ValidMask::GID.bits(), 0x400);
        assert_eq!(ValidMask::FLAGS.bits(), 0x800);
        assert_eq!(ValidMask::NLINK.bits(), 0x2000);
        assert_eq!(ValidMask::GENERATION.bits(), 0x4000);
        assert_eq!(ValidMask::INLINE.bits(), 0x8000);
        assert_eq!(ValidMask::GROUP.bits(), 0x100_0000);
    }

    #[test]
    fn test_every_kind_has_a_distinct_bit() {
        let mut seen = ValidMask::empty();
        for kind in AttributeKind::ALL {
            assert!(!seen.intersects(kind.mask()), "{} reuses a bit", kind);
            seen |= kind.mask();
        }
        assert_eq!(seen.kinds().count(), AttributeKind::ALL.len());
    }

    #[test]
    fn test_from_raw_drops_foreign_bits() {
        let mask = ValidMask::from_raw(0x10 | 0x1000 | (1 << 40));
        assert_eq!(mask, ValidMask::SIZE);
    }

    #[test]
    fn test_kind_name_round_trip() {
        for kind in AttributeKind::ALL {
            assert_eq!(kind.name().parse::<AttributeKind>().unwrap(), kind);
        }
        assert_eq!(" MTime ".parse::<AttributeKind>().unwrap(), AttributeKind::ModifyTime);
    }

    #[test]
    fn test_parse_expr_groups() {
        let mask = ValidMask::parse_expr("times, size").unwrap();
        assert_eq!(mask, ValidMask::TIMES | ValidMask::SIZE);

        assert_eq!(ValidMask::parse_expr("all").unwrap(), ValidMask::all());
        assert_eq!(ValidMask::parse_expr("owner").unwrap(), ValidMask::UID | ValidMask::GID);
    }

    #[test]
    fn test_parse_expr_errors() {
        assert_eq!(ValidMask::parse_expr(" , "), Err(AttrError::EmptyMask));
        assert_eq!(
            ValidMask::parse_expr("size,bogus"),
            Err(AttrError::UnknownAttribute("bogus".to_string()))
        );
    }

    #[test]
    fn test_kinds_iterates_in_bit_order() {
        let mask = ValidMask::GROUP | ValidMask::ATIME | ValidMask::MODE;
        let kinds: Vec<_> = mask.kinds().collect();
        assert_eq!(
            kinds,
            vec![AttributeKind::AccessTime, AttributeKind::Mode, AttributeKind::Group]
        );
    }
}
