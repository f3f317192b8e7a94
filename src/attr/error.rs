use thiserror::Error;

/// Errors raised while parsing attribute names, masks and encoded values
///
/// The merge, compare and translate operations themselves are total and
/// never produce these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttrError {
    #[error("Unknown attribute '{0}'")]
    UnknownAttribute(String),

    #[error("Empty attribute mask expression")]
    EmptyMask,

    #[error("Invalid mode '{0}': expected an octal permission word")]
    InvalidMode(String),

    #[error("Inline data is {len} bytes, capacity is {capacity}")]
    InlineOverflow { len: usize, capacity: usize },

    #[error("Invalid inline data encoding: {0}")]
    InlineEncoding(String),
}

/// Result type for attribute parsing operations
pub type Result<T> = std::result::Result<T, AttrError>;
