//! Error types for the tree layer.
//!
//! These are structural errors only: missing names, wrong node kinds,
//! permission bits, and handle misuse. What a file's contents mean is the
//! business of its `FileHandler`.

use crate::server::FidId;

/// Errors raised by the tree itself, independent of any file's handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// No child with this name.
    #[error("file not found: {0}")]
    NotFound(String),

    /// Walked through, or listed, something that is not a directory.
    #[error("not a directory")]
    NotADirectory,

    /// Tried to open a directory for writing.
    #[error("is a directory")]
    IsADirectory,

    /// A child with this name already exists.
    #[error("file already exists: {0}")]
    AlreadyExists(String),

    /// The node's mode does not allow the requested access.
    #[error("permission denied")]
    PermissionDenied,

    /// Read or write on a handle that was never opened.
    #[error("fid not open")]
    NotOpen,

    /// The handle does not exist (never attached, or already clunked).
    #[error("unknown fid {0}")]
    UnknownFid(FidId),

    /// The file does not implement this operation.
    #[error("operation not supported")]
    NotSupported,
}
