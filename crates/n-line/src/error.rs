//! Error taxonomy for the editing core.
//!
//! Only genuinely exceptional conditions live here. End-of-input and
//! cancellation are ordinary outcomes and travel through the engines'
//! signal enums instead. A failed terminal size query is not an error
//! either: the viewport falls back to a default size.

use std::io;

use thiserror::Error;

/// Everything that can abort an editing call.
#[derive(Debug, Error)]
pub enum EditError {
    /// Growing a line buffer failed to allocate.
    #[error("out of memory while growing a line buffer")]
    OutOfMemory,

    /// A newline was requested in a block editor already at its line limit.
    #[error("block editor is full ({max} lines)")]
    MaxLinesExceeded {
        /// The configured line limit.
        max: usize,
    },

    /// Reading keys from or writing to the terminal failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EditError>;
