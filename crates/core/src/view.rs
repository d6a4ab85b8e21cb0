//! Undirected view over a [`ProtectionGraph`].
//!
//! Each directed edge contributes one incidence at each of its endpoints
//! (one in total for a self-loop). The incidence keeps the original
//! [`EdgeIdx`], so direction and label stay available to callers walking
//! the view against an edge's nominal direction.

use crate::graph::ProtectionGraph;
use crate::types::{EdgeIdx, NodeIdx};
use smallvec::SmallVec;

/// One end of an edge as seen from a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Incidence {
    pub edge: EdgeIdx,
    pub neighbor: NodeIdx,
}

#[derive(Debug, Clone)]
pub struct UndirectedView {
    graph_token: u64,
    incidences: Vec<SmallVec<[Incidence; 8]>>,
}

impl UndirectedView {
    pub fn new(graph: &ProtectionGraph) -> Self {
        let mut incidences = vec![SmallVec::new(); graph.node_count()];

        for (i, edge) in graph.edges().iter().enumerate() {
            let idx = EdgeIdx::new(i);
            incidences[edge.from.index()].push(Incidence {
                edge: idx,
                neighbor: edge.to,
            });
            if edge.from != edge.to {
                incidences[edge.to.index()].push(Incidence {
                    edge: idx,
                    neighbor: edge.from,
                });
            }
        }

        Self {
            graph_token: graph.token(),
            incidences,
        }
    }

    /// Incidences of `node`, ordered by edge insertion.
    #[inline]
    pub fn incident(&self, node: NodeIdx) -> &[Incidence] {
        &self.incidences[node.index()]
    }

    pub fn degree(&self, node: NodeIdx) -> usize {
        self.incidences[node.index()].len()
    }

    /// Whether this view was derived from `graph` (or a clone of it).
    pub fn belongs_to(&self, graph: &ProtectionGraph) -> bool {
        self.graph_token == graph.token()
    }
}
