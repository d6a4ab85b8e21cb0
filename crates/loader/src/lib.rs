//! Graph ingestion for the Take-Grant analyzer.
//!
//! The analyzer only ever sees an in-memory [`ProtectionGraph`]; this crate
//! turns persisted documents into one.

pub mod chain;
pub mod json;

use takegrant_core::error::TgResult;
use takegrant_core::ProtectionGraph;

pub use chain::{chain, chained_id, ChainLink};
pub use json::{EdgeRecord, GraphBody, GraphDocument, JsonFileSource, JsonStrSource, NodeRecord};

/// Abstraction for producing a protection graph from any source.
pub trait GraphSource {
    fn load(&self) -> TgResult<ProtectionGraph>;
}
