//! Chained test graphs.
//!
//! Repeats a document end-to-end: copy `i` gets every node and edge id
//! prefixed with `"{i}_"`, and a single TAKE edge joins `link.from` in copy
//! `i - 1` to `link.to` in copy `i`. A query that holds between two nodes of
//! the base document should still hold between the first and last copies, so
//! the chain length scales the search without changing the answer.

use crate::json::{EdgeRecord, GraphBody, GraphDocument, NodeRecord};
use takegrant_core::{Label, TakeGrantError, TgResult};

/// Which base-document nodes the inter-copy TAKE edge connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
    pub from: String,
    pub to: String,
}

impl Default for ChainLink {
    fn default() -> Self {
        Self {
            from: "7".to_string(),
            to: "1".to_string(),
        }
    }
}

/// Id of `id` in copy `copy` of a chain.
pub fn chained_id(copy: usize, id: &str) -> String {
    format!("{copy}_{id}")
}

/// Builds a `length`-copy chain of `base`.
pub fn chain(base: &GraphDocument, length: usize, link: &ChainLink) -> TgResult<GraphDocument> {
    if length == 0 {
        return Err(TakeGrantError::InvalidInput(
            "chain length must be at least 1".into(),
        ));
    }
    for end in [&link.from, &link.to] {
        if !base.graph.nodes.iter().any(|n| &n.id == end) {
            return Err(TakeGrantError::NodeNotFound(end.clone()));
        }
    }

    let body = &base.graph;
    let mut nodes = Vec::with_capacity(body.nodes.len() * length);
    let mut edges = Vec::with_capacity((body.edges.len() + 1) * length);

    for i in 0..length {
        nodes.extend(body.nodes.iter().map(|node| {
            let id = chained_id(i, &node.id);
            NodeRecord {
                label: Some(id.clone()),
                id,
                active: node.active,
            }
        }));

        edges.extend(body.edges.iter().map(|edge| EdgeRecord {
            id: chained_id(i, &edge.id),
            source: chained_id(i, &edge.source),
            target: chained_id(i, &edge.target),
            cclabel: edge.cclabel.clone(),
        }));

        if i > 0 {
            let source = chained_id(i - 1, &link.from);
            let target = chained_id(i, &link.to);
            edges.push(EdgeRecord {
                id: format!("link:{source}->{target}"),
                source,
                target,
                cclabel: Some(Label::TAKE.to_string()),
            });
        }
    }

    let base_label = body.label.as_deref().or(body.id.as_deref()).unwrap_or("graph");
    tracing::debug!(length, nodes = nodes.len(), edges = edges.len(), "built chain");

    Ok(GraphDocument {
        graph: GraphBody {
            id: None,
            label: Some(format!("chain_{length}_{base_label}")),
            nodes,
            edges,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use takegrant_core::NodeKind;

    fn base() -> GraphDocument {
        r#"{"graph": {
            "label": "pair",
            "nodes": [
                {"id": "1", "active": "SUBJECT"},
                {"id": "7", "active": "OBJECT"}
            ],
            "edges": [
                {"id": "a", "source": "1", "target": "7", "cclabel": "GRANT"},
                {"id": "b", "source": "1", "target": "7", "cclabel": "GRANT"}
            ]
        }}"#
        .parse()
        .unwrap()
    }

    #[test]
    fn copies_and_links_each_segment() {
        let doc = chain(&base(), 3, &ChainLink::default()).unwrap();
        assert_eq!(doc.graph.label.as_deref(), Some("chain_3_pair"));
        assert_eq!(doc.graph.nodes.len(), 6);
        // 2 edges per copy + 2 links
        assert_eq!(doc.graph.edges.len(), 8);

        let links: Vec<_> = doc
            .graph
            .edges
            .iter()
            .filter(|e| e.id.starts_with("link:"))
            .map(|e| (e.source.as_str(), e.target.as_str(), e.cclabel.as_deref()))
            .collect();
        assert_eq!(
            links,
            [("0_7", "1_1", Some("TAKE")), ("1_7", "2_1", Some("TAKE"))]
        );

        let graph = doc.into_graph().unwrap();
        assert_eq!(graph.node_kind("2_1").unwrap(), NodeKind::Subject);
    }

    #[test]
    fn parallel_edges_keep_unique_ids() {
        let doc = chain(&base(), 2, &ChainLink::default()).unwrap();
        assert!(doc.into_graph().is_ok());
    }

    #[test]
    fn rejects_empty_chain_and_unknown_link_nodes() {
        assert!(matches!(
            chain(&base(), 0, &ChainLink::default()),
            Err(TakeGrantError::InvalidInput(_))
        ));

        let link = ChainLink {
            from: "9".into(),
            to: "1".into(),
        };
        assert!(matches!(
            chain(&base(), 2, &link),
            Err(TakeGrantError::NodeNotFound(id)) if id == "9"
        ));
    }
}
