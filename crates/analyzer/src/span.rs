//! Span closures.
//!
//! A subject `x'` *initially spans* to `x` when `x' = x` or `x'` reaches `x`
//! over `t→* g→`; `s'` *terminally spans* to `s` when `s' = s` or `s'`
//! reaches `s` over `t→*`. Both closures walk TAKE edges backwards from a
//! seed set and keep every subject met on the way, so the result is the set
//! of subjects that can stand in for the seed as the real end of a transfer.

use std::collections::BTreeSet;
use takegrant_core::error::TgResult;
use takegrant_core::{Label, NodeId, NodeIdx, ProtectionGraph};

/// Subjects that initially span to `x`: `x` itself if it is a subject, plus
/// every subject reaching a GRANT-predecessor of `x` through TAKE edges.
///
/// `x` must come from `graph`; callers outside the crate go through
/// [`initially_spans`].
pub(crate) fn initial_span(graph: &ProtectionGraph, x: NodeIdx) -> BTreeSet<NodeIdx> {
    let mut span = BTreeSet::new();
    if graph.kind(x).is_subject() {
        span.insert(x);
    }

    let seeds = graph
        .in_edges(x)
        .filter(|e| e.label == Label::Grant)
        .map(|e| (e.from, x))
        .collect();
    collect_take_predecessors(graph, seeds, &mut span);

    tracing::trace!(x = %graph.id_of(x), size = span.len(), "initial span");
    span
}

/// Subjects that terminally span to any node of `sources`.
pub(crate) fn terminal_span(
    graph: &ProtectionGraph,
    sources: impl IntoIterator<Item = NodeIdx>,
) -> BTreeSet<NodeIdx> {
    let mut span = BTreeSet::new();
    let mut seeds = Vec::new();

    for s in sources {
        if graph.kind(s).is_subject() {
            span.insert(s);
        }
        seeds.extend(
            graph
                .in_edges(s)
                .filter(|e| e.label == Label::Take)
                .map(|e| (e.from, s)),
        );
    }
    collect_take_predecessors(graph, seeds, &mut span);

    tracing::trace!(size = span.len(), "terminal span");
    span
}

/// Depth-first walk against TAKE edges.
///
/// `to_visit` holds `(node, parent)` pairs, where `parent` is the node the
/// walk arrived from; stepping straight back to it is skipped. Longer cycles
/// are cut by the visited marks, which are shared by all seeds.
fn collect_take_predecessors(
    graph: &ProtectionGraph,
    mut to_visit: Vec<(NodeIdx, NodeIdx)>,
    span: &mut BTreeSet<NodeIdx>,
) {
    let mut visited = vec![false; graph.node_count()];

    while let Some((v, parent)) = to_visit.pop() {
        if std::mem::replace(&mut visited[v.index()], true) {
            continue;
        }
        if graph.kind(v).is_subject() {
            span.insert(v);
        }
        to_visit.extend(
            graph
                .in_edges(v)
                .filter(|e| e.label == Label::Take && e.from != parent)
                .map(|e| (e.from, v)),
        );
    }
}

// ---------------------------------------------------------------------------
// Id-level entry points
// ---------------------------------------------------------------------------

/// `initially_spans(x)` by node id. Fails with `NodeNotFound` for unknown ids.
pub fn initially_spans(graph: &ProtectionGraph, x: &str) -> TgResult<BTreeSet<NodeId>> {
    let x = graph.index_of(x)?;
    Ok(to_ids(graph, initial_span(graph, x)))
}

/// `terminally_spans(S)` by node ids. Fails with `NodeNotFound` if any id in
/// `sources` is unknown.
pub fn terminally_spans<'a>(
    graph: &ProtectionGraph,
    sources: impl IntoIterator<Item = &'a str>,
) -> TgResult<BTreeSet<NodeId>> {
    let sources = sources
        .into_iter()
        .map(|s| graph.index_of(s))
        .collect::<TgResult<Vec<_>>>()?;
    Ok(to_ids(graph, terminal_span(graph, sources)))
}

pub(crate) fn to_ids(graph: &ProtectionGraph, nodes: BTreeSet<NodeIdx>) -> BTreeSet<NodeId> {
    nodes.into_iter().map(|n| graph.id_of(n).clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use takegrant_core::TakeGrantError;

    fn ids(raw: &[&str]) -> BTreeSet<NodeId> {
        raw.iter().map(|&s| NodeId::from(s)).collect()
    }

    #[test]
    fn subject_spans_to_itself_object_does_not() {
        let g = ProtectionGraph::builder()
            .subject("s")
            .object("o")
            .build()
            .unwrap();
        assert_eq!(initially_spans(&g, "s").unwrap(), ids(&["s"]));
        assert!(initially_spans(&g, "o").unwrap().is_empty());
        assert_eq!(terminally_spans(&g, ["s", "o"]).unwrap(), ids(&["s"]));
    }

    #[test]
    fn initial_span_needs_a_grant_before_the_take_chain() {
        // a -t-> b -g-> x ; c -t-> x (a bare take does not count)
        let g = ProtectionGraph::builder()
            .subject("a")
            .object("b")
            .subject("c")
            .object("x")
            .take("a", "b")
            .grant("b", "x")
            .take("c", "x")
            .build()
            .unwrap();
        assert_eq!(initially_spans(&g, "x").unwrap(), ids(&["a"]));
    }

    #[test]
    fn walk_continues_through_subjects_and_objects() {
        // s1 -t-> o1 -t-> s2 -t-> o2 -g-> x
        let g = ProtectionGraph::builder()
            .subject("s1")
            .object("o1")
            .subject("s2")
            .object("o2")
            .object("x")
            .take("s1", "o1")
            .take("o1", "s2")
            .take("s2", "o2")
            .grant("o2", "x")
            .build()
            .unwrap();
        assert_eq!(initially_spans(&g, "x").unwrap(), ids(&["s1", "s2"]));
    }

    #[test]
    fn take_cycles_terminate() {
        // a -t-> b -t-> c -t-> a, all feeding s
        let g = ProtectionGraph::builder()
            .subject("a")
            .object("b")
            .subject("c")
            .object("s")
            .take("a", "b")
            .take("b", "c")
            .take("c", "a")
            .take("a", "s")
            .build()
            .unwrap();
        assert_eq!(terminally_spans(&g, ["s"]).unwrap(), ids(&["a", "c"]));
    }

    #[test]
    fn grant_edges_do_not_extend_the_terminal_walk() {
        let g = ProtectionGraph::builder()
            .subject("a")
            .subject("b")
            .object("s")
            .grant("a", "s")
            .take("b", "s")
            .build()
            .unwrap();
        assert_eq!(terminally_spans(&g, ["s"]).unwrap(), ids(&["b"]));
    }

    #[test]
    fn unknown_ids_are_errors() {
        let g = ProtectionGraph::builder().subject("a").build().unwrap();
        assert!(matches!(
            initially_spans(&g, "zz"),
            Err(TakeGrantError::NodeNotFound(id)) if id == "zz"
        ));
        assert!(matches!(
            terminally_spans(&g, ["a", "zz"]),
            Err(TakeGrantError::NodeNotFound(_))
        ));
    }
}
