//! The mode word: object kind in the high bits, permissions in the low bits
//!
//! `Type` and `Mode` attributes are two independently maskable views over the
//! same `u32`. These helpers splice one view from a source word into a
//! destination word without touching the other view.

use super::error::{AttrError, Result};

/// Object kind bits
pub const S_IFMT: u32 = 0o170000;
pub const S_IFSOCK: u32 = 0o140000;
pub const S_IFLNK: u32 = 0o120000;
pub const S_IFREG: u32 = 0o100000;
pub const S_IFBLK: u32 = 0o060000;
pub const S_IFDIR: u32 = 0o040000;
pub const S_IFCHR: u32 = 0o020000;
pub const S_IFIFO: u32 = 0o010000;

/// Set-user-ID on execution
pub const S_ISUID: u32 = 0o4000;
/// Set-group-ID; new files created under a directory with this bit inherit its group
pub const S_ISGID: u32 = 0o2000;
/// Sticky
pub const S_ISVTX: u32 = 0o1000;

/// Object kind bits of `mode`
#[inline]
pub const fn kind_bits(mode: u32) -> u32 {
    mode & S_IFMT
}

/// Permission bits of `mode` (everything outside [`S_IFMT`])
#[inline]
pub const fn perm_bits(mode: u32) -> u32 {
    mode & !S_IFMT
}

/// Take the kind bits from `src`, keep the permission bits of `dst`
#[inline]
pub const fn splice_kind(dst: u32, src: u32) -> u32 {
    perm_bits(dst) | kind_bits(src)
}

/// Take the permission bits from `src`, keep the kind bits of `dst`
#[inline]
pub const fn splice_perm(dst: u32, src: u32) -> u32 {
    kind_bits(dst) | perm_bits(src)
}

/// Parse an octal mode string such as "2755", "0o2755" or "0100644"
pub fn parse_octal(s: &str) -> Result<u32> {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix("0o").unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(AttrError::InvalidMode(s.to_string()));
    }
    u32::from_str_radix(digits, 8).map_err(|_| AttrError::InvalidMode(s.to_string()))
}
