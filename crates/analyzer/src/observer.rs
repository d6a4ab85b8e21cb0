//! Decision observers.
//!
//! The decider reports what it evaluates through an injected
//! [`ShareObserver`]. Observers only watch: whatever they do, the decision
//! takes the same path and returns the same result.

use serde::Serialize;
use std::fmt;
use std::sync::Mutex;
use takegrant_core::NodeId;

/// The checks of the decision procedure, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// `x` already holds the right over `y`.
    DirectEdge,
    /// Some subject holds the right over `y`.
    Grantors,
    InitialSpan,
    TerminalSpan,
    /// An island-bridge path joins the two spans.
    BridgeWitness,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Condition::DirectEdge => "direct_edge",
            Condition::Grantors => "grantors",
            Condition::InitialSpan => "initial_span",
            Condition::TerminalSpan => "terminal_span",
            Condition::BridgeWitness => "bridge_witness",
        };
        f.write_str(name)
    }
}

/// Hooks called by the decider. Every method defaults to a no-op.
///
/// `pair_searched` is called from rayon workers, so implementations must be
/// thread-safe.
pub trait ShareObserver: Send + Sync {
    /// A condition was evaluated; `holds` is its raw truth value.
    fn condition_evaluated(&self, _condition: Condition, _holds: bool) {}

    /// The bridge search is about to run over `pairs` span pairs.
    fn search_dispatched(&self, _pairs: usize) {}

    /// One `(xi, si)` search finished. Not called for searches that were
    /// cancelled or never started.
    fn pair_searched(&self, _xi: &NodeId, _si: &NodeId, _found: bool) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ShareObserver for NoopObserver {}

/// Forwards observations to `tracing` at debug/trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ShareObserver for TracingObserver {
    fn condition_evaluated(&self, condition: Condition, holds: bool) {
        tracing::debug!(%condition, holds, "condition evaluated");
    }

    fn search_dispatched(&self, pairs: usize) {
        tracing::debug!(pairs, "dispatching bridge search");
    }

    fn pair_searched(&self, xi: &NodeId, si: &NodeId, found: bool) {
        tracing::trace!(%xi, %si, found, "pair searched");
    }
}

/// One observation captured by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedEvent {
    Condition(Condition, bool),
    Dispatched(usize),
    Pair { xi: NodeId, si: NodeId, found: bool },
}

/// Keeps every observation in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObservedEvent> {
        self.lock().clone()
    }

    /// The conditions seen so far, in the order they were evaluated.
    pub fn conditions(&self) -> Vec<(Condition, bool)> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                ObservedEvent::Condition(c, holds) => Some((*c, *holds)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ObservedEvent) {
        self.lock().push(event);
    }

    // A panicking observer on another thread must not hide the rest.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ObservedEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ShareObserver for RecordingObserver {
    fn condition_evaluated(&self, condition: Condition, holds: bool) {
        self.push(ObservedEvent::Condition(condition, holds));
    }

    fn search_dispatched(&self, pairs: usize) {
        self.push(ObservedEvent::Dispatched(pairs));
    }

    fn pair_searched(&self, xi: &NodeId, si: &NodeId, found: bool) {
        self.push(ObservedEvent::Pair {
            xi: xi.clone(),
            si: si.clone(),
            found,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_keeps_order() {
        let obs = RecordingObserver::new();
        obs.condition_evaluated(Condition::DirectEdge, false);
        obs.search_dispatched(3);
        obs.condition_evaluated(Condition::Grantors, true);

        assert_eq!(
            obs.conditions(),
            [(Condition::DirectEdge, false), (Condition::Grantors, true)]
        );
        assert_eq!(obs.events()[1], ObservedEvent::Dispatched(3));
    }

    #[test]
    fn condition_names() {
        assert_eq!(Condition::BridgeWitness.to_string(), "bridge_witness");
        assert_eq!(
            serde_json::to_string(&Condition::InitialSpan).unwrap(),
            "\"initial_span\""
        );
    }
}
