//! Graph error types.

use super::NodeId;

/// Errors raised while building a graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Node id was never issued by this graph
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
}
