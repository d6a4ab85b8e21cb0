//! Protection graph model, shared types, and error definitions.
//!
//! Foundation crate -- no I/O and no concurrency.

pub mod error;
pub mod graph;
pub mod types;
pub mod view;

pub use error::{TakeGrantError, TgResult};
pub use graph::{GraphBuilder, ProtectionGraph};
pub use types::{Edge, EdgeId, EdgeIdx, Label, Node, NodeId, NodeIdx, NodeKind, ShareOutcome};
pub use view::{Incidence, UndirectedView};
