//! Centralized error types for the Take-Grant workspace.

use thiserror::Error;

/// Top-level error enum. Variants map to input faults and subsystems.
///
/// A structural "no capability" answer is never an error: it is a
/// [`ShareOutcome`](crate::ShareOutcome).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TakeGrantError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Edge not found: {id} between {from} and {to}")]
    EdgeNotFound { id: String, from: String, to: String },

    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("Duplicate edge id: {0}")]
    DuplicateEdge(String),

    #[error("Edge {edge} references unknown node {node}")]
    DanglingEdge { edge: String, node: String },

    #[error("Undirected view was derived from a different graph")]
    ViewMismatch,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Load error: {0}")]
    Load(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type TgResult<T> = Result<T, TakeGrantError>;
