pub mod graph;

use arcstd_protocol::TokenId;
use thiserror::Error;

pub use graph::DependencyGraph;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("token {0} has no head")]
    MissingHead(TokenId),

    #[error("token {dependent} has {count} heads")]
    MultipleHeads { dependent: TokenId, count: usize },

    #[error("token {dependent} is attached to unknown token {head}")]
    UnknownHead { dependent: TokenId, head: TokenId },

    #[error("ROOT has a head")]
    RootHasHead,

    #[error("dependency arcs form a cycle")]
    Cycle,

    #[error("token {0} is not reachable from ROOT")]
    Unreachable(TokenId),
}
