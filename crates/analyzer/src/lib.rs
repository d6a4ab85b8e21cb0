//! Span closures, island-bridge search, and the `can_share` decision.

pub mod bridge;
pub mod decider;
pub mod observer;
pub mod report;
pub mod search;
pub mod span;

pub use bridge::{check_path, is_bridge_step, Continuation};
pub use decider::{
    can_share, grantors, has_direct_right, DeciderConfig, ShareDecider, ShareDecision, Verdict,
};
pub use observer::{
    Condition, NoopObserver, ObservedEvent, RecordingObserver, ShareObserver, TracingObserver,
};
pub use report::{ShareReport, StepRow};
pub use search::{exists_island_bridge_path, find_witness, Witness, WitnessStep};
pub use span::{initially_spans, terminally_spans};
