//! Core error types

use thiserror::Error;

use crate::paint::PatternId;

/// Errors raised at the drawing-backend seam.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A color string that is not `#rrggbb` / `#rrggbbaa`
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A primitive referenced a pattern the backend never saw defined
    #[error("pattern {0:?} used before definition")]
    UnknownPattern(PatternId),

    /// A container handle that was already removed
    #[error("unknown container: {0}")]
    UnknownContainer(u64),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
