//! Witness search: pruned depth-first search for an island-bridge path.
//!
//! Walks simple paths over the undirected view from `xi`, checking every
//! extension with [`is_bridge_step`] before descending. Invalid prefixes are
//! cut on the spot instead of enumerating all simple paths and filtering
//! them afterwards, which is what keeps dense graphs tractable. The stack is
//! explicit so long chains cannot exhaust the thread stack.

use std::sync::atomic::{AtomicBool, Ordering};
use takegrant_core::error::{TakeGrantError, TgResult};
use takegrant_core::{EdgeIdx, NodeIdx, ProtectionGraph, UndirectedView};

use crate::bridge::is_bridge_step;

/// One edge of a witness path, with the direction it was crossed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WitnessStep {
    pub from: NodeIdx,
    pub to: NodeIdx,
    pub edge: EdgeIdx,
}

impl WitnessStep {
    /// Whether the step crosses its edge along the edge's direction.
    pub fn is_forward(&self, graph: &ProtectionGraph) -> bool {
        graph.edge(self.edge).from == self.from
    }
}

/// A concrete island-bridge path from `start` to the last step's target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witness {
    pub start: NodeIdx,
    pub steps: Vec<WitnessStep>,
}

impl Witness {
    pub fn end(&self) -> NodeIdx {
        self.steps.last().map_or(self.start, |step| step.to)
    }
}

struct Frame {
    node: NodeIdx,
    /// Next incidence of `node` to try.
    cursor: usize,
}

/// Searches for an island-bridge path from `xi` to `si`.
///
/// Returns `Ok(None)` when no path exists, when `xi == si`, or when `cancel`
/// is raised mid-search. Fails with `ViewMismatch` if `view` was derived
/// from another graph, and with `InvalidInput` if either index is out of
/// range for `graph`.
pub fn find_witness(
    graph: &ProtectionGraph,
    view: &UndirectedView,
    xi: NodeIdx,
    si: NodeIdx,
    cancel: &AtomicBool,
) -> TgResult<Option<Witness>> {
    if !view.belongs_to(graph) {
        return Err(TakeGrantError::ViewMismatch);
    }
    let nodes = graph.node_count();
    if let Some(idx) = [xi, si].into_iter().find(|n| n.index() >= nodes) {
        return Err(TakeGrantError::InvalidInput(format!(
            "node index {} out of range for {nodes} nodes",
            idx.index()
        )));
    }
    if xi == si {
        return Ok(None);
    }

    // A simple path has at most |V| - 1 edges.
    let max_len = graph.node_count().saturating_sub(1);
    let mut on_path = vec![false; graph.node_count()];
    let mut stack = vec![Frame { node: xi, cursor: 0 }];
    let mut path: Vec<WitnessStep> = Vec::new();
    let mut expanded = 0usize;
    on_path[xi.index()] = true;

    while let Some(frame) = stack.last_mut() {
        if cancel.load(Ordering::Relaxed) {
            tracing::trace!(xi = %graph.id_of(xi), expanded, "search cancelled");
            return Ok(None);
        }

        let at = frame.node;
        let incident = view.incident(at);
        if frame.cursor == incident.len() || path.len() == max_len {
            stack.pop();
            path.pop();
            on_path[at.index()] = false;
            continue;
        }

        let next = incident[frame.cursor];
        frame.cursor += 1;
        if on_path[next.neighbor.index()] {
            continue;
        }

        let edge = graph.edge(next.edge);
        let prev = path.last().map(|step| graph.edge(step.edge));
        if !is_bridge_step(graph, Some(edge), at, prev) {
            continue;
        }

        path.push(WitnessStep {
            from: at,
            to: next.neighbor,
            edge: next.edge,
        });
        if next.neighbor == si {
            tracing::trace!(
                xi = %graph.id_of(xi),
                si = %graph.id_of(si),
                len = path.len(),
                "witness found"
            );
            return Ok(Some(Witness {
                start: xi,
                steps: path,
            }));
        }

        on_path[next.neighbor.index()] = true;
        stack.push(Frame {
            node: next.neighbor,
            cursor: 0,
        });
        expanded += 1;
    }

    tracing::trace!(xi = %graph.id_of(xi), si = %graph.id_of(si), expanded, "search exhausted");
    Ok(None)
}

/// Whether any island-bridge path joins `xi` and `si`, by node id.
pub fn exists_island_bridge_path(
    graph: &ProtectionGraph,
    view: &UndirectedView,
    xi: &str,
    si: &str,
) -> TgResult<bool> {
    let (xi, si) = (graph.index_of(xi)?, graph.index_of(si)?);
    let never = AtomicBool::new(false);
    Ok(find_witness(graph, view, xi, si, &never)?.is_some())
}
