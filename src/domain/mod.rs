//! Domain layer: the decision tree and its file format
//!
//! This layer is independent of external concerns (no prompting, no CLI, no config loading).

pub mod codec;
pub mod entities;
pub mod error;
pub mod render;
pub mod tree;

pub use codec::{Codec, DEFAULT_MAX_LINE_LEN};
pub use entities::{Answer, RoundOutcome};
pub use error::{CodecError, CodecResult, DomainError, DomainResult};
pub use render::{TreeDisplay, MAX_DRAWN_DEPTH};
pub use tree::{validate_text, KnowledgeTree, Node, NodeId, NodeKind, TreeBuilder, DEFAULT_SEED};
