//! Decision report.
//!
//! Turns a [`ShareDecision`] into ids and labels a reader can follow, either
//! as a boxed text block or as JSON.

use serde::Serialize;
use std::time::Duration;
use takegrant_core::{NodeId, ProtectionGraph, ShareOutcome};

use crate::decider::{ShareDecision, Verdict};
use crate::span::to_ids;

/// One witness edge, with ids resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRow {
    pub from: NodeId,
    pub to: NodeId,
    pub edge: String,
    pub label: String,
    /// `"->"` when crossed along the edge, `"<-"` when against it.
    pub direction: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareReport {
    pub right: String,
    pub from: String,
    pub to: String,
    pub outcome: ShareOutcome,
    pub verdict: Verdict,
    pub graph_nodes: usize,
    pub graph_edges: usize,
    pub grantors: Vec<NodeId>,
    pub initial_span: Vec<NodeId>,
    pub terminal_span: Vec<NodeId>,
    pub witness: Vec<StepRow>,
    pub elapsed_us: u128,
}

impl ShareReport {
    pub fn build(
        graph: &ProtectionGraph,
        right: &str,
        x: &str,
        y: &str,
        decision: &ShareDecision,
        elapsed: Duration,
    ) -> Self {
        let ids = |set: &std::collections::BTreeSet<_>| -> Vec<NodeId> {
            to_ids(graph, set.clone()).into_iter().collect()
        };

        let witness = decision
            .witness
            .iter()
            .flat_map(|w| w.steps.iter())
            .map(|step| {
                let edge = graph.edge(step.edge);
                StepRow {
                    from: graph.id_of(step.from).clone(),
                    to: graph.id_of(step.to).clone(),
                    edge: edge.id.to_string(),
                    label: edge.label.to_string(),
                    direction: if step.is_forward(graph) { "->" } else { "<-" },
                }
            })
            .collect();

        Self {
            right: right.to_string(),
            from: x.to_string(),
            to: y.to_string(),
            outcome: decision.outcome,
            verdict: decision.verdict,
            graph_nodes: graph.node_count(),
            graph_edges: graph.edge_count(),
            grantors: ids(&decision.grantors),
            initial_span: ids(&decision.initial_span),
            terminal_span: ids(&decision.terminal_span),
            witness,
            elapsed_us: elapsed.as_micros(),
        }
    }

    /// Render the report as a boxed text block.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push('\n');
        out.push_str("╔══════════════════════════════════════════════════════════════╗\n");
        out.push_str("║                    TAKE-GRANT SHARE REPORT                   ║\n");
        out.push_str("╠══════════════════════════════════════════════════════════════╣\n");
        out.push_str(&format!("║  Query:      can_share({}, {}, {})\n", self.right, self.from, self.to));
        out.push_str(&format!("║  Graph:      {} nodes, {} edges\n", self.graph_nodes, self.graph_edges));
        out.push_str(&format!("║  Outcome:    {}\n", self.outcome));
        out.push_str(&format!("║  Reason:     {}\n", self.verdict));
        out.push_str(&format!("║  Elapsed:    {} us\n", self.elapsed_us));
        out.push_str("╠══════════════════════════════════════════════════════════════╣\n");
        out.push_str(&format!("║  Holders:        {}\n", join(&self.grantors)));
        out.push_str(&format!("║  Initial span:   {}\n", join(&self.initial_span)));
        out.push_str(&format!("║  Terminal span:  {}\n", join(&self.terminal_span)));

        if !self.witness.is_empty() {
            out.push_str("╠══════════════════════════════════════════════════════════════╣\n");
            out.push_str("║  WITNESS                                                     ║\n");
            for (i, step) in self.witness.iter().enumerate() {
                out.push_str(&format!(
                    "║  {:>3}. {} {} {}  [{} {}]\n",
                    i + 1,
                    step.from,
                    step.direction,
                    step.to,
                    step.label,
                    step.edge
                ));
            }
        }

        out.push_str("╚══════════════════════════════════════════════════════════════╝\n");
        out
    }
}

fn join(ids: &[NodeId]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter().map(NodeId::as_str).collect::<Vec<_>>().join(", ")
}
