//! Island-bridge path predicate.
//!
//! A path from `x'` to `s'` carries a right when it splits into *islands*
//! (runs of tg-edges between subjects, where anything goes) joined by
//! *bridges*: tg-paths through objects whose words are one of
//!
//! ```text
//! t→*    t←*    t→* g→ t←*    t→* g← t←*
//! ```
//!
//! Here `→` / `←` say whether the edge is crossed along or against its
//! direction. The language is prefix-closed, so a path can be checked one
//! edge at a time and an invalid prefix pruned immediately.

use takegrant_core::error::{TakeGrantError, TgResult};
use takegrant_core::{Edge, Label, NodeIdx, ProtectionGraph};

/// What may follow the edge that brought a path prefix to its current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// At the start of the path or on a subject: any tg-edge.
    Open,
    /// Inside a bridge after `t→`: another `t→`, or a grant either way.
    ForwardTake,
    /// Inside a bridge after `t←`: only `t←`.
    ReverseTake,
    /// Inside a bridge after `g→` or `g←`: only `t←`.
    AfterGrant,
}

impl Continuation {
    /// State of a prefix sitting at `at`, reached over `prev` (`None` when
    /// `at` is where the path starts). `None` means no extension is valid.
    pub fn at(graph: &ProtectionGraph, at: NodeIdx, prev: Option<&Edge>) -> Option<Self> {
        let Some(prev) = prev else {
            return graph.kind(at).is_subject().then_some(Continuation::Open);
        };
        if !prev.label.is_tg() {
            return None;
        }
        if graph.kind(at).is_subject() {
            return Some(Continuation::Open);
        }
        match prev.label {
            Label::Take if prev.to == at => Some(Continuation::ForwardTake),
            Label::Take => Some(Continuation::ReverseTake),
            Label::Grant => Some(Continuation::AfterGrant),
            _ => None,
        }
    }

    /// Whether leaving `at` over `edge` keeps the prefix valid.
    pub fn admits(self, edge: &Edge, at: NodeIdx) -> bool {
        let along = edge.from == at;
        let against = edge.to == at;
        match (self, &edge.label) {
            (_, label) if !label.is_tg() => false,
            (Continuation::Open, _) => true,
            (Continuation::ForwardTake, Label::Grant) => true,
            (Continuation::ForwardTake, Label::Take) => along,
            (Continuation::ReverseTake | Continuation::AfterGrant, Label::Take) => against,
            _ => false,
        }
    }
}

/// Decides whether appending `edge` to a prefix that sits at `at` (having
/// arrived over `prev`) still yields a valid island-bridge prefix.
///
/// Evaluation order: a missing or non-tg `edge` fails; at the path start
/// `at` must be a subject; a non-tg `prev` fails; a subject at `at` accepts
/// anything; otherwise the bridge word decides.
pub fn is_bridge_step(
    graph: &ProtectionGraph,
    edge: Option<&Edge>,
    at: NodeIdx,
    prev: Option<&Edge>,
) -> bool {
    let Some(edge) = edge else {
        return false;
    };
    if !edge.label.is_tg() {
        return false;
    }
    Continuation::at(graph, at, prev).is_some_and(|state| state.admits(edge, at))
}

/// Checks a complete path given as `(from, to, edge id)` triples, in the
/// order the path crosses them.
///
/// Each edge is looked up as `from -> to`, falling back to `to -> from`.
/// Unknown nodes or edges are errors; an empty path is not a valid path.
pub fn check_path(graph: &ProtectionGraph, steps: &[(&str, &str, &str)]) -> TgResult<bool> {
    if steps.is_empty() {
        return Ok(false);
    }

    let mut prev: Option<&Edge> = None;
    let mut expected_at: Option<&str> = None;
    for &(from, to, id) in steps {
        if let Some(expected) = expected_at {
            if expected != from {
                return Err(TakeGrantError::InvalidInput(format!(
                    "path step {from} -> {to} does not continue from {expected}"
                )));
            }
        }
        let edge = graph.edge_between(from, to, id)?;
        let at = graph.index_of(from)?;
        if !is_bridge_step(graph, Some(edge), at, prev) {
            tracing::debug!(from, to, edge = id, "path rejected");
            return Ok(false);
        }
        prev = Some(edge);
        expected_at = Some(to);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Subjects are upper case, objects lower case.
    fn graph(edges: &[(&str, &str, &str, Label)]) -> ProtectionGraph {
        let mut names: Vec<&str> = edges.iter().flat_map(|(_, a, b, _)| [*a, *b]).collect();
        names.sort_unstable();
        names.dedup();

        let mut builder = ProtectionGraph::builder();
        for name in names {
            builder = if name.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
                builder.subject(name)
            } else {
                builder.object(name)
            };
        }
        for (id, from, to, label) in edges {
            builder = builder.edge(*id, *from, *to, label.clone());
        }
        builder.build().unwrap()
    }

    #[test]
    fn first_step_requires_a_subject_start() {
        let g = graph(&[("e", "S", "o", Label::Take), ("f", "o", "p", Label::Take)]);
        assert!(check_path(&g, &[("S", "o", "e")]).unwrap());
        assert!(!check_path(&g, &[("o", "p", "f")]).unwrap());
    }

    #[test]
    fn missing_or_non_tg_edges_fail() {
        let g = graph(&[
            ("r", "S", "T", Label::Right("READ".into())),
            ("u", "S", "T", Label::Unlabeled),
        ]);
        let s = g.index_of("S").unwrap();
        assert!(!is_bridge_step(&g, None, s, None));
        assert!(!check_path(&g, &[("S", "T", "r")]).unwrap());
        assert!(!check_path(&g, &[("S", "T", "u")]).unwrap());
        assert!(!check_path(&g, &[]).unwrap());
    }

    #[test]
    fn canonical_bridge_words_are_accepted() {
        // t→ t→
        let g = graph(&[("a", "S", "o", Label::Take), ("b", "o", "T", Label::Take)]);
        assert!(check_path(&g, &[("S", "o", "a"), ("o", "T", "b")]).unwrap());

        // t← t←
        let g = graph(&[("a", "o", "S", Label::Take), ("b", "T", "o", Label::Take)]);
        assert!(check_path(&g, &[("S", "o", "a"), ("o", "T", "b")]).unwrap());

        // t→ g→ t←
        let g = graph(&[
            ("a", "S", "o", Label::Take),
            ("b", "o", "p", Label::Grant),
            ("c", "T", "p", Label::Take),
        ]);
        assert!(check_path(&g, &[("S", "o", "a"), ("o", "p", "b"), ("p", "T", "c")]).unwrap());

        // t→ g← t←
        let g = graph(&[
            ("a", "S", "o", Label::Take),
            ("b", "p", "o", Label::Grant),
            ("c", "T", "p", Label::Take),
        ]);
        assert!(check_path(&g, &[("S", "o", "a"), ("o", "p", "b"), ("p", "T", "c")]).unwrap());
    }

    #[test]
    fn non_bridge_words_are_rejected() {
        // t← t→
        let g = graph(&[("a", "o", "S", Label::Take), ("b", "o", "T", Label::Take)]);
        assert!(!check_path(&g, &[("S", "o", "a"), ("o", "T", "b")]).unwrap());

        // g→ t→
        let g = graph(&[("a", "S", "o", Label::Grant), ("b", "o", "T", Label::Take)]);
        assert!(!check_path(&g, &[("S", "o", "a"), ("o", "T", "b")]).unwrap());

        // g g
        let g = graph(&[("a", "S", "o", Label::Grant), ("b", "o", "T", Label::Grant)]);
        assert!(!check_path(&g, &[("S", "o", "a"), ("o", "T", "b")]).unwrap());

        // t← g→
        let g = graph(&[("a", "o", "S", Label::Take), ("b", "o", "T", Label::Grant)]);
        assert!(!check_path(&g, &[("S", "o", "a"), ("o", "T", "b")]).unwrap());
    }

    #[test]
    fn a_subject_resets_the_bridge_word() {
        // t← t← reaching subject M, then t→ g→ : fine across the island.
        let g = graph(&[
            ("a", "o", "S", Label::Take),
            ("b", "M", "o", Label::Take),
            ("c", "M", "p", Label::Take),
            ("d", "p", "T", Label::Grant),
        ]);
        let path = [("S", "o", "a"), ("o", "M", "b"), ("M", "p", "c"), ("p", "T", "d")];
        assert!(check_path(&g, &path).unwrap());

        // Same shape through an object m: t← t← t→ is not a bridge.
        let g = graph(&[
            ("a", "o", "S", Label::Take),
            ("b", "m", "o", Label::Take),
            ("c", "m", "p", Label::Take),
            ("d", "p", "T", Label::Grant),
        ]);
        let path = [("S", "o", "a"), ("o", "m", "b"), ("m", "p", "c"), ("p", "T", "d")];
        assert!(!check_path(&g, &path).unwrap());
    }

    #[test]
    fn continuation_tracks_direction_of_previous_edge() {
        let g = graph(&[("a", "S", "o", Label::Take), ("b", "o", "p", Label::Take)]);
        let o = g.index_of("o").unwrap();
        let p = g.index_of("p").unwrap();
        let a = &g.edges()[0];
        let b = &g.edges()[1];
        assert_eq!(Continuation::at(&g, o, Some(a)), Some(Continuation::ForwardTake));
        assert_eq!(Continuation::at(&g, o, Some(b)), Some(Continuation::ReverseTake));
        assert_eq!(Continuation::at(&g, p, None), None);
        assert_eq!(
            Continuation::at(&g, g.index_of("S").unwrap(), Some(a)),
            Some(Continuation::Open)
        );
    }

    #[test]
    fn malformed_paths_are_errors() {
        let g = graph(&[("a", "S", "o", Label::Take), ("b", "o", "T", Label::Take)]);
        assert!(matches!(
            check_path(&g, &[("S", "o", "zz")]),
            Err(TakeGrantError::EdgeNotFound { .. })
        ));
        assert!(matches!(
            check_path(&g, &[("S", "o", "a"), ("S", "o", "a")]),
            Err(TakeGrantError::InvalidInput(_))
        ));
    }
}
