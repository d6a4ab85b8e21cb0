//! JSON protection-graph documents.
//!
//! Shape: `{"graph": {"nodes": [...], "edges": [...]}}`. Nodes carry `id`,
//! `label` and `active` (`SUBJECT` / `OBJECT`); edges carry `id`, `source`,
//! `target` and `cclabel` (the right, including the literals `TAKE` and
//! `GRANT`).
//!
//! ```ignore
//! let graph = GraphDocument::from_path("graphs/example.json")?.into_graph()?;
//! ```

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use takegrant_core::{Label, NodeKind, ProtectionGraph, TakeGrantError, TgResult};

use crate::GraphSource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub graph: GraphBody,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub active: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Missing type tags are kept as unlabeled edges, not rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cclabel: Option<String>,
}

impl FromStr for GraphDocument {
    type Err = TakeGrantError;

    fn from_str(json: &str) -> TgResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| TakeGrantError::Load(format!("invalid graph document: {e}")))
    }
}

impl GraphDocument {
    pub fn from_reader<R: Read>(reader: R) -> TgResult<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| TakeGrantError::Load(format!("invalid graph document: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> TgResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| TakeGrantError::Load(format!("Failed to open {}: {e}", path.display())))?;
        let doc = Self::from_reader(BufReader::new(file))?;
        tracing::debug!(
            path = %path.display(),
            nodes = doc.graph.nodes.len(),
            edges = doc.graph.edges.len(),
            "read graph document"
        );
        Ok(doc)
    }

    pub fn to_writer_pretty<W: Write>(&self, writer: W) -> TgResult<()> {
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| TakeGrantError::Load(format!("Failed to write graph document: {e}")))
    }

    /// Validates the records into an immutable [`ProtectionGraph`].
    pub fn into_graph(self) -> TgResult<ProtectionGraph> {
        let mut builder = ProtectionGraph::builder();
        for node in self.graph.nodes {
            builder = builder.node(node.id, node.active, node.label);
        }
        for edge in self.graph.edges {
            let label = Label::from(edge.cclabel.as_deref());
            builder = builder.edge(edge.id, edge.source, edge.target, label);
        }
        builder.build()
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Loads a graph from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GraphSource for JsonFileSource {
    fn load(&self) -> TgResult<ProtectionGraph> {
        let graph = GraphDocument::from_path(&self.path)?.into_graph()?;
        tracing::info!(
            path = %self.path.display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "loaded graph"
        );
        Ok(graph)
    }
}

/// Loads a graph from an in-memory JSON string.
#[derive(Debug, Clone)]
pub struct JsonStrSource<'a> {
    json: &'a str,
}

impl<'a> JsonStrSource<'a> {
    pub fn new(json: &'a str) -> Self {
        Self { json }
    }
}

impl GraphSource for JsonStrSource<'_> {
    fn load(&self) -> TgResult<ProtectionGraph> {
        self.json.parse::<GraphDocument>()?.into_graph()
    }
}
