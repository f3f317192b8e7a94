//! Fixed-size inline buffer carried alongside the scalar attributes
//!
//! The buffer is opaque to merge and compare (it moves as a whole), but two
//! sub-structures live at fixed offsets inside it: an open-file handle at
//! offset 0 and a log record cookie right after it. Both are little-endian.

use super::error::{AttrError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Capacity of the inline buffer in bytes
pub const INLINE_SIZE: usize = 80;

/// Handle of an open file on the remote side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LustreHandle {
    pub cookie: u64,
}

impl LustreHandle {
    pub const ENCODED_LEN: usize = 8;
    pub const OFFSET: usize = 0;
}

/// Cookie identifying one record in a recovery log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogCookie {
    pub log_id: u64,
    pub log_group: u64,
    pub log_gen: u32,
    pub subsys: u32,
    pub index: u32,
}

impl LogCookie {
    pub const ENCODED_LEN: usize = 8 + 8 + 4 + 4 + 4;
    pub const OFFSET: usize = LustreHandle::OFFSET + LustreHandle::ENCODED_LEN;
}

const _: () = assert!(
    LustreHandle::ENCODED_LEN + LogCookie::ENCODED_LEN <= INLINE_SIZE,
    "handle and log cookie must fit in the inline buffer"
);

/// Opaque inline payload of an attribute record
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InlineData([u8; INLINE_SIZE]);

impl Default for InlineData {
    fn default() -> Self {
        Self([0; INLINE_SIZE])
    }
}

impl fmt::Debug for InlineData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InlineData")
            .field(&hex::encode(self.0))
            .finish()
    }
}

impl InlineData {
    /// Copy `bytes` into a zeroed buffer
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > INLINE_SIZE {
            return Err(AttrError::InlineOverflow {
                len: bytes.len(),
                capacity: INLINE_SIZE,
            });
        }
        let mut buf = [0; INLINE_SIZE];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Decode a hex string of at most [`INLINE_SIZE`] bytes
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| AttrError::InlineEncoding(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; INLINE_SIZE] {
        &self.0
    }

    pub fn is_zeroed(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn handle(&self) -> LustreHandle {
        LustreHandle {
            cookie: self.read_u64(LustreHandle::OFFSET),
        }
    }

    pub fn set_handle(&mut self, handle: LustreHandle) {
        self.write(LustreHandle::OFFSET, &handle.cookie.to_le_bytes());
    }

    pub fn cookie(&self) -> LogCookie {
        let base = LogCookie::OFFSET;
        LogCookie {
            log_id: self.read_u64(base),
            log_group: self.read_u64(base + 8),
            log_gen: self.read_u32(base + 16),
            subsys: self.read_u32(base + 20),
            index: self.read_u32(base + 24),
        }
    }

    pub fn set_cookie(&mut self, cookie: LogCookie) {
        let base = LogCookie::OFFSET;
        self.write(base, &cookie.log_id.to_le_bytes());
        self.write(base + 8, &cookie.log_group.to_le_bytes());
        self.write(base + 16, &cookie.log_gen.to_le_bytes());
        self.write(base + 20, &cookie.subsys.to_le_bytes());
        self.write(base + 24, &cookie.index.to_le_bytes());
    }

    fn read_u64(&self, offset: usize) -> u64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.0[offset..offset + 8]);
        u64::from_le_bytes(raw)
    }

    fn read_u32(&self, offset: usize) -> u32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.0[offset..offset + 4]);
        u32::from_le_bytes(raw)
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) {
        self.0[offset..offset + bytes.len()].copy_from_slice(bytes);
    }
}

// Serialized as a hex string so JSON stays readable.
impl Serialize for InlineData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for InlineData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        InlineData::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
