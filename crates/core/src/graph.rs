//! Protection graph: a typed directed multigraph of subjects and objects.
//!
//! Built once through [`GraphBuilder`], validated at build time, and never
//! mutated afterwards. Nodes and edges live in dense arenas addressed by
//! [`NodeIdx`] / [`EdgeIdx`]; adjacency is kept in both directions so the
//! span closures can walk edges backwards without scanning.

use crate::error::{TakeGrantError, TgResult};
use crate::types::{Edge, EdgeId, EdgeIdx, Label, Node, NodeId, NodeIdx, NodeKind};
use crate::view::UndirectedView;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

type EdgeList = SmallVec<[EdgeIdx; 4]>;

/// Source of per-graph identity tokens, used to tie derived views to the
/// graph they were computed from.
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
pub struct ProtectionGraph {
    token: u64,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: HashMap<NodeId, NodeIdx>,
    outgoing: Vec<EdgeList>,
    incoming: Vec<EdgeList>,
}

impl ProtectionGraph {
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    pub(crate) fn token(&self) -> u64 {
        self.token
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Node at `idx`. Indices are only handed out by this graph, so they are
    /// always in range.
    #[inline]
    pub fn node(&self, idx: NodeIdx) -> &Node {
        &self.nodes[idx.index()]
    }

    #[inline]
    pub fn edge(&self, idx: EdgeIdx) -> &Edge {
        &self.edges[idx.index()]
    }

    #[inline]
    pub fn kind(&self, idx: NodeIdx) -> NodeKind {
        self.nodes[idx.index()].kind
    }

    #[inline]
    pub fn id_of(&self, idx: NodeIdx) -> &NodeId {
        &self.nodes[idx.index()].id
    }

    /// Resolves a node id, failing with `NodeNotFound` when absent.
    pub fn index_of(&self, id: &str) -> TgResult<NodeIdx> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| TakeGrantError::NodeNotFound(id.to_string()))
    }

    pub fn node_kind(&self, id: &str) -> TgResult<NodeKind> {
        self.index_of(id).map(|idx| self.kind(idx))
    }

    /// All edges whose target is `v`, in insertion order.
    pub fn in_edges(&self, v: NodeIdx) -> impl Iterator<Item = &Edge> + '_ {
        self.incoming[v.index()].iter().map(|&e| self.edge(e))
    }

    /// All edges whose source is `u`, in insertion order.
    pub fn out_edges(&self, u: NodeIdx) -> impl Iterator<Item = &Edge> + '_ {
        self.outgoing[u.index()].iter().map(|&e| self.edge(e))
    }

    /// All edges `u -> v`, any label.
    pub fn edges_between(&self, u: NodeIdx, v: NodeIdx) -> impl Iterator<Item = &Edge> + '_ {
        self.out_edges(u).filter(move |e| e.to == v)
    }

    /// The edge `id` running `u -> v`, if there is one.
    pub fn directed_edge(&self, u: &str, v: &str, id: &str) -> TgResult<Option<&Edge>> {
        let (u, v) = (self.index_of(u)?, self.index_of(v)?);
        Ok(self.edges_between(u, v).find(|e| e.id.as_str() == id))
    }

    /// The edge `id` joining `u` and `v` in either direction.
    ///
    /// Paths over the undirected view name an edge by the pair they crossed
    /// it in; this looks it up as `u -> v` first, then as `v -> u`.
    pub fn edge_between(&self, u: &str, v: &str, id: &str) -> TgResult<&Edge> {
        if let Some(edge) = self.directed_edge(u, v, id)? {
            return Ok(edge);
        }
        self.directed_edge(v, u, id)?
            .ok_or_else(|| TakeGrantError::EdgeNotFound {
                id: id.to_string(),
                from: u.to_string(),
                to: v.to_string(),
            })
    }

    pub fn undirected_view(&self) -> UndirectedView {
        UndirectedView::new(self)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct PendingEdge {
    id: EdgeId,
    from: NodeId,
    to: NodeId,
    label: Label,
}

/// Collects nodes and edges, then validates them into a [`ProtectionGraph`].
///
/// ```ignore
/// let graph = ProtectionGraph::builder()
///     .subject("alice")
///     .object("file")
///     .edge("e1", "alice", "file", Label::Take)
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    edges: Vec<PendingEdge>,
}

impl GraphBuilder {
    pub fn node(mut self, id: impl Into<NodeId>, kind: NodeKind, label: Option<String>) -> Self {
        self.nodes.push(Node {
            id: id.into(),
            kind,
            label,
        });
        self
    }

    pub fn subject(self, id: impl Into<NodeId>) -> Self {
        self.node(id, NodeKind::Subject, None)
    }

    pub fn object(self, id: impl Into<NodeId>) -> Self {
        self.node(id, NodeKind::Object, None)
    }

    pub fn edge(
        mut self,
        id: impl Into<EdgeId>,
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        label: Label,
    ) -> Self {
        self.edges.push(PendingEdge {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            label,
        });
        self
    }

    /// Adds an edge with a generated id of the form `from->to#n`.
    pub fn right(self, from: &str, to: &str, label: Label) -> Self {
        let id = format!("{from}->{to}#{}", self.edges.len());
        self.edge(id, from, to, label)
    }

    pub fn take(self, from: &str, to: &str) -> Self {
        self.right(from, to, Label::Take)
    }

    pub fn grant(self, from: &str, to: &str) -> Self {
        self.right(from, to, Label::Grant)
    }

    /// Validates ids and endpoints and freezes the graph.
    pub fn build(self) -> TgResult<ProtectionGraph> {
        let mut index = HashMap::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            if index.insert(node.id.clone(), NodeIdx::new(i)).is_some() {
                return Err(TakeGrantError::DuplicateNode(node.id.to_string()));
            }
        }

        let resolve = |edge: &PendingEdge, node: &NodeId| {
            index
                .get(node)
                .copied()
                .ok_or_else(|| TakeGrantError::DanglingEdge {
                    edge: edge.id.to_string(),
                    node: node.to_string(),
                })
        };

        let mut seen = HashSet::with_capacity(self.edges.len());
        let mut edges = Vec::with_capacity(self.edges.len());
        let mut outgoing = vec![EdgeList::new(); self.nodes.len()];
        let mut incoming = vec![EdgeList::new(); self.nodes.len()];

        for pending in &self.edges {
            if !seen.insert(pending.id.clone()) {
                return Err(TakeGrantError::DuplicateEdge(pending.id.to_string()));
            }
            let from = resolve(pending, &pending.from)?;
            let to = resolve(pending, &pending.to)?;

            let idx = EdgeIdx::new(edges.len());
            outgoing[from.index()].push(idx);
            incoming[to.index()].push(idx);
            edges.push(Edge {
                id: pending.id.clone(),
                from,
                to,
                label: pending.label.clone(),
            });
        }

        Ok(ProtectionGraph {
            token: NEXT_TOKEN.fetch_add(1, Ordering::Relaxed),
            nodes: self.nodes,
            edges,
            index,
            outgoing,
            incoming,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProtectionGraph {
        ProtectionGraph::builder()
            .subject("s")
            .object("o")
            .object("p")
            .edge("t1", "s", "o", Label::Take)
            .edge("t2", "s", "o", Label::Right("READ".into()))
            .edge("g1", "o", "s", Label::Grant)
            .edge("u1", "p", "o", Label::Unlabeled)
            .build()
            .unwrap()
    }

    #[test]
    fn node_kind_resolves_and_rejects_unknown_ids() {
        let g = sample();
        assert_eq!(g.node_kind("s").unwrap(), NodeKind::Subject);
        assert_eq!(g.node_kind("o").unwrap(), NodeKind::Object);
        assert!(matches!(
            g.node_kind("missing"),
            Err(TakeGrantError::NodeNotFound(id)) if id == "missing"
        ));
    }

    #[test]
    fn edges_between_is_directed_and_keeps_parallel_edges() {
        let g = sample();
        let (s, o) = (g.index_of("s").unwrap(), g.index_of("o").unwrap());

        let forward: Vec<_> = g.edges_between(s, o).map(|e| e.id.as_str()).collect();
        assert_eq!(forward, ["t1", "t2"]);

        let backward: Vec<_> = g.edges_between(o, s).map(|e| e.id.as_str()).collect();
        assert_eq!(backward, ["g1"]);
    }

    #[test]
    fn in_edges_lists_every_edge_into_a_node() {
        let g = sample();
        let o = g.index_of("o").unwrap();
        let ids: Vec<_> = g.in_edges(o).map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["t1", "t2", "u1"]);
    }

    #[test]
    fn edge_between_falls_back_to_reverse_pair() {
        let g = sample();
        assert_eq!(g.edge_between("s", "o", "t1").unwrap().label, Label::Take);
        assert_eq!(g.edge_between("o", "s", "t1").unwrap().label, Label::Take);
        assert!(g.directed_edge("o", "s", "t1").unwrap().is_none());
        assert!(matches!(
            g.edge_between("s", "p", "t1"),
            Err(TakeGrantError::EdgeNotFound { .. })
        ));
    }

    #[test]
    fn build_rejects_duplicate_ids_and_dangling_edges() {
        let dup_node = ProtectionGraph::builder().subject("a").object("a").build();
        assert!(matches!(dup_node, Err(TakeGrantError::DuplicateNode(id)) if id == "a"));

        let dup_edge = ProtectionGraph::builder()
            .subject("a")
            .object("b")
            .edge("e", "a", "b", Label::Take)
            .edge("e", "b", "a", Label::Grant)
            .build();
        assert!(matches!(dup_edge, Err(TakeGrantError::DuplicateEdge(id)) if id == "e"));

        let dangling = ProtectionGraph::builder()
            .subject("a")
            .edge("e", "a", "ghost", Label::Take)
            .build();
        assert!(matches!(
            dangling,
            Err(TakeGrantError::DanglingEdge { node, .. }) if node == "ghost"
        ));
    }

    #[test]
    fn generated_edge_ids_are_unique() {
        let g = ProtectionGraph::builder()
            .subject("a")
            .object("b")
            .take("a", "b")
            .take("a", "b")
            .grant("b", "a")
            .build()
            .unwrap();
        assert_eq!(g.edge_count(), 3);
    }
}
