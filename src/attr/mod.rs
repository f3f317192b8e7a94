//! In-memory object attribute model
//!
//! - [`kind`]: attribute identifiers and the stable validity bit layout
//! - [`mode`]: kind/permission split of the mode word
//! - [`inline`]: fixed inline buffer carrying a file handle and a log cookie
//! - [`set`]: the sparse [`AttributeSet`] record with masked merge and compare

mod error;
pub mod inline;
pub mod kind;
pub mod mode;
pub mod set;

pub use error::{AttrError, Result};
pub use inline::{InlineData, LogCookie, LustreHandle, INLINE_SIZE};
pub use kind::{AttributeKind, ValidMask};
pub use set::{AttributeSet, CompareInline, IoObject};
