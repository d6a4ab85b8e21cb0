//! The `can_share` decision procedure.
//!
//! `can_share(a, x, y)` holds when `x` can come to own right `a` over `y`.
//! The checks run in a fixed order and stop at the first one that settles
//! the answer:
//!
//! 0. `x` already has an `a`-edge to `y`: granted.
//! 1. Nobody holds `a` over `y`: denied.
//! 2. No subject initially spans to `x`: denied.
//! 3. No subject terminally spans to a holder: denied.
//! 4. Some island-bridge path joins the two spans: granted, else denied.
//!
//! Condition 4 is the expensive one. Every span pair is an independent
//! search, fanned out over a rayon pool; the first witness raises a shared
//! cancellation flag so the remaining searches return early.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use takegrant_core::error::{TakeGrantError, TgResult};
use takegrant_core::{NodeId, NodeIdx, ProtectionGraph, ShareOutcome, UndirectedView};

use crate::observer::{Condition, ShareObserver, TracingObserver};
use crate::search::{find_witness, Witness};
use crate::span::{initial_span, terminal_span, to_ids};

// ---------------------------------------------------------------------------
// Configuration and results
// ---------------------------------------------------------------------------

/// Worker configuration for the bridge search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeciderConfig {
    /// Threads for the bridge search. `None` runs on rayon's global pool.
    pub workers: Option<usize>,
}

impl DeciderConfig {
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: Some(workers),
        }
    }
}

/// Which check settled a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    SameNode,
    DirectEdge,
    NoGrantor,
    EmptyInitialSpan,
    EmptyTerminalSpan,
    Witness,
    NoWitness,
}

impl Verdict {
    pub fn outcome(self) -> ShareOutcome {
        match self {
            Verdict::SameNode => ShareOutcome::Undefined,
            Verdict::DirectEdge | Verdict::Witness => ShareOutcome::Granted,
            Verdict::NoGrantor
            | Verdict::EmptyInitialSpan
            | Verdict::EmptyTerminalSpan
            | Verdict::NoWitness => ShareOutcome::Denied,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Verdict::SameNode => "source and target are the same node",
            Verdict::DirectEdge => "source already holds the right",
            Verdict::NoGrantor => "no node holds the right over the target",
            Verdict::EmptyInitialSpan => "no subject initially spans to the source",
            Verdict::EmptyTerminalSpan => "no subject terminally spans to a holder",
            Verdict::Witness => "island-bridge path found",
            Verdict::NoWitness => "no island-bridge path between the spans",
        };
        f.write_str(text)
    }
}

/// Outcome of a decision plus the intermediate sets that produced it.
///
/// Sets for conditions that were never reached stay empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareDecision {
    pub outcome: ShareOutcome,
    pub verdict: Verdict,
    pub grantors: BTreeSet<NodeIdx>,
    pub initial_span: BTreeSet<NodeIdx>,
    pub terminal_span: BTreeSet<NodeIdx>,
    pub witness: Option<Witness>,
}

impl ShareDecision {
    fn settled(verdict: Verdict) -> Self {
        Self {
            outcome: verdict.outcome(),
            verdict,
            grantors: BTreeSet::new(),
            initial_span: BTreeSet::new(),
            terminal_span: BTreeSet::new(),
            witness: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Decider
// ---------------------------------------------------------------------------

/// Runs `can_share` queries, owning the search pool and the observer.
pub struct ShareDecider {
    pool: Option<rayon::ThreadPool>,
    observer: Arc<dyn ShareObserver>,
}

impl Default for ShareDecider {
    fn default() -> Self {
        Self {
            pool: None,
            observer: Arc::new(TracingObserver),
        }
    }
}

impl fmt::Debug for ShareDecider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShareDecider")
            .field("workers", &self.workers())
            .finish_non_exhaustive()
    }
}

impl ShareDecider {
    pub fn new(config: DeciderConfig) -> TgResult<Self> {
        let pool = match config.workers {
            None => None,
            Some(0) => {
                return Err(TakeGrantError::Config(
                    "workers must be at least 1".into(),
                ))
            }
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("takegrant-search-{i}"))
                    .build()
                    .map_err(|e| TakeGrantError::Config(e.to_string()))?,
            ),
        };
        Ok(Self {
            pool,
            observer: Arc::new(TracingObserver),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn ShareObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Threads available to the bridge search.
    pub fn workers(&self) -> usize {
        self.pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, |pool| pool.current_num_threads())
    }

    pub fn can_share(
        &self,
        graph: &ProtectionGraph,
        right: &str,
        x: &str,
        y: &str,
    ) -> TgResult<ShareOutcome> {
        Ok(self.decide(graph, right, x, y)?.outcome)
    }

    /// Decides whether `x` can acquire `right` over `y`.
    ///
    /// Unknown `x` or `y` fail with `NodeNotFound` before anything else is
    /// looked at, including the `x == y` case.
    pub fn decide(
        &self,
        graph: &ProtectionGraph,
        right: &str,
        x: &str,
        y: &str,
    ) -> TgResult<ShareDecision> {
        self.decide_with(graph, right, x, y, |view, xi, si, cancel| {
            find_witness(graph, view, xi, si, cancel)
        })
    }

    /// [`decide`](Self::decide) with the per-pair bridge search supplied by
    /// the caller.
    fn decide_with<S>(
        &self,
        graph: &ProtectionGraph,
        right: &str,
        x: &str,
        y: &str,
        search_pair: S,
    ) -> TgResult<ShareDecision>
    where
        S: Fn(&UndirectedView, NodeIdx, NodeIdx, &AtomicBool) -> TgResult<Option<Witness>> + Sync,
    {
        let xi = graph.index_of(x)?;
        let yi = graph.index_of(y)?;

        if xi == yi {
            tracing::debug!(right, x, "same source and target");
            return Ok(ShareDecision::settled(Verdict::SameNode));
        }

        let direct = graph
            .edges_between(xi, yi)
            .any(|e| e.label.is_right(right));
        self.observer
            .condition_evaluated(Condition::DirectEdge, direct);
        if direct {
            return Ok(ShareDecision::settled(Verdict::DirectEdge));
        }

        let holders: BTreeSet<NodeIdx> = graph
            .in_edges(yi)
            .filter(|e| e.label.is_right(right))
            .map(|e| e.from)
            .collect();
        self.observer
            .condition_evaluated(Condition::Grantors, !holders.is_empty());
        let mut decision = ShareDecision::settled(Verdict::NoGrantor);
        if holders.is_empty() {
            return Ok(decision);
        }

        let initial = initial_span(graph, xi);
        self.observer
            .condition_evaluated(Condition::InitialSpan, !initial.is_empty());
        decision.grantors = holders;
        if initial.is_empty() {
            decision.verdict = Verdict::EmptyInitialSpan;
            return Ok(decision);
        }

        let terminal = terminal_span(graph, decision.grantors.iter().copied());
        self.observer
            .condition_evaluated(Condition::TerminalSpan, !terminal.is_empty());
        decision.initial_span = initial;
        if terminal.is_empty() {
            decision.verdict = Verdict::EmptyTerminalSpan;
            return Ok(decision);
        }
        decision.terminal_span = terminal;

        let witness = self.search(
            graph,
            &decision.initial_span,
            &decision.terminal_span,
            search_pair,
        )?;
        self.observer
            .condition_evaluated(Condition::BridgeWitness, witness.is_some());
        decision.verdict = if witness.is_some() {
            Verdict::Witness
        } else {
            Verdict::NoWitness
        };
        decision.outcome = decision.verdict.outcome();
        decision.witness = witness;

        tracing::debug!(right, x, y, verdict = ?decision.verdict, "decided");
        Ok(decision)
    }

    /// Condition 4: searches every `initial × terminal` pair, stopping at
    /// the first witness. Any search error fails the whole call.
    fn search<S>(
        &self,
        graph: &ProtectionGraph,
        initial: &BTreeSet<NodeIdx>,
        terminal: &BTreeSet<NodeIdx>,
        search_pair: S,
    ) -> TgResult<Option<Witness>>
    where
        S: Fn(&UndirectedView, NodeIdx, NodeIdx, &AtomicBool) -> TgResult<Option<Witness>> + Sync,
    {
        let view = graph.undirected_view();
        let pairs: Vec<(NodeIdx, NodeIdx)> = initial
            .iter()
            .flat_map(|&xi| terminal.iter().map(move |&si| (xi, si)))
            .collect();
        let cancel = AtomicBool::new(false);

        self.observer.search_dispatched(pairs.len());
        tracing::debug!(pairs = pairs.len(), workers = self.workers(), "bridge search");

        let run = || {
            pairs
                .par_iter()
                .map(|&(xi, si)| {
                    let result = search_pair(&view, xi, si, &cancel);
                    // A miss after cancellation may be a search cut short.
                    let cancelled = cancel.load(Ordering::Relaxed);
                    match &result {
                        Ok(found) if found.is_some() || !cancelled => {
                            if found.is_some() {
                                cancel.store(true, Ordering::Relaxed);
                            }
                            self.observer.pair_searched(
                                graph.id_of(xi),
                                graph.id_of(si),
                                found.is_some(),
                            );
                        }
                        Ok(_) => {}
                        Err(_) => cancel.store(true, Ordering::Relaxed),
                    }
                    result
                })
                .find_map_any(Result::transpose)
        };

        let found = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        };
        found.transpose()
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// `can_share` with the default decider (global pool, tracing observer).
pub fn can_share(graph: &ProtectionGraph, right: &str, x: &str, y: &str) -> TgResult<ShareOutcome> {
    ShareDecider::default().can_share(graph, right, x, y)
}

/// Whether some edge `x -> y` carries `right`.
pub fn has_direct_right(graph: &ProtectionGraph, right: &str, x: &str, y: &str) -> TgResult<bool> {
    let (x, y) = (graph.index_of(x)?, graph.index_of(y)?);
    Ok(graph.edges_between(x, y).any(|e| e.label.is_right(right)))
}

/// Sources of every edge into `y` that carries `right`.
pub fn grantors(graph: &ProtectionGraph, right: &str, y: &str) -> TgResult<BTreeSet<NodeId>> {
    let y = graph.index_of(y)?;
    let holders = graph
        .in_edges(y)
        .filter(|e| e.label.is_right(right))
        .map(|e| e.from)
        .collect();
    Ok(to_ids(graph, holders))
}
