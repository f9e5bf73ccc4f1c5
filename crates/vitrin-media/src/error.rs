use thiserror::Error;

use crate::asset::MediaKind;

/// Errors produced by the staging layer.
///
/// All variants are local and recoverable: the offending batch is rejected
/// as a whole, prior staged state is untouched, and the user may retry
/// with corrected input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// Accepting the batch would exceed the per-kind count limit.
    #[error("Too many {kind} files: limit is {limit}")]
    TooMany { kind: MediaKind, limit: usize },

    /// A file in the batch exceeds the per-file size limit.
    #[error("File '{file}' is too large: max {max_bytes} bytes")]
    TooLarge { file: String, max_bytes: usize },

    /// A file in the batch has a content type the slot does not accept.
    #[error("File '{file}' has an unsupported content type")]
    InvalidKind { file: String },
}
