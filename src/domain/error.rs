//! Domain-level errors (no external dependencies)

use std::io;

use thiserror::Error;

use super::tree::NodeId;

/// Domain errors represent violations of the tree's structural rules.
/// These are independent of persistence and I/O concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node {0:?} does not belong to this tree")]
    NodeNotFound(NodeId),

    #[error("only an animal leaf can learn a new question, {text:?} is a question")]
    NotALeaf { id: NodeId, text: String },

    #[error("invalid node text {text:?}: {reason}")]
    InvalidText { text: String, reason: &'static str },

    #[error("invalid tree structure: {0}")]
    InvalidStructure(&'static str),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Failures of the flat-file tree format.
///
/// Offsets are byte positions in the stream where the offending record starts.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("corrupt tree data at byte {offset}: {reason}")]
    CorruptStream { offset: u64, reason: String },

    #[error("unknown tag '{}' at byte {offset}, expected 'Q' or 'A'", .tag.escape_ascii())]
    UnknownTag { tag: u8, offset: u64 },

    #[error("line at byte {offset} is longer than {limit} bytes")]
    LineTooLong { limit: usize, offset: u64 },

    #[error("cannot read tree data")]
    Read(#[source] io::Error),

    #[error("cannot write tree data")]
    Write(#[source] io::Error),
}

impl CodecError {
    pub(crate) fn corrupt(offset: u64, reason: impl Into<String>) -> Self {
        Self::CorruptStream {
            offset,
            reason: reason.into(),
        }
    }

    /// True for errors caused by the bytes themselves rather than the I/O channel.
    pub fn is_corruption(&self) -> bool {
        !matches!(self, CodecError::Read(_) | CodecError::Write(_))
    }
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
