//! Domain types for the Take-Grant protection model.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Opaque node identifier, unique within a graph.
    NodeId
);

string_id!(
    /// Opaque edge identifier, unique within a graph.
    EdgeId
);

/// Dense position of a node in its graph's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIdx(usize);

/// Dense position of an edge in its graph's edge arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeIdx(usize);

impl NodeIdx {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl EdgeIdx {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Nodes and edges
// ---------------------------------------------------------------------------

/// Active principal or passive target. A node is exactly one of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Subject,
    Object,
}

impl NodeKind {
    #[inline]
    pub fn is_subject(self) -> bool {
        self == NodeKind::Subject
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Subject => f.write_str("SUBJECT"),
            NodeKind::Object => f.write_str("OBJECT"),
        }
    }
}

/// Right carried by an edge.
///
/// `Take` and `Grant` drive the de jure rules; every other right, including
/// the one being queried, is an opaque `Right`. `Unlabeled` stands for an
/// edge that arrived without a type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    Take,
    Grant,
    Right(String),
    Unlabeled,
}

impl Label {
    pub const TAKE: &'static str = "TAKE";
    pub const GRANT: &'static str = "GRANT";

    pub fn parse(raw: &str) -> Self {
        match raw {
            Self::TAKE => Label::Take,
            Self::GRANT => Label::Grant,
            other => Label::Right(other.to_string()),
        }
    }

    /// TAKE or GRANT: the only labels a tg-path may use.
    #[inline]
    pub fn is_tg(&self) -> bool {
        matches!(self, Label::Take | Label::Grant)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Label::Take => Some(Self::TAKE),
            Label::Grant => Some(Self::GRANT),
            Label::Right(right) => Some(right.as_str()),
            Label::Unlabeled => None,
        }
    }

    /// Whether this label names `right`.
    #[inline]
    pub fn is_right(&self, right: &str) -> bool {
        self.as_str() == Some(right)
    }
}

impl From<Option<&str>> for Label {
    fn from(raw: Option<&str>) -> Self {
        raw.map_or(Label::Unlabeled, Label::parse)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("<unlabeled>"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Display label; not used by the analysis.
    pub label: Option<String>,
}

/// Directed edge `from -> to` carrying one right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeIdx,
    pub to: NodeIdx,
    pub label: Label,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Three-valued answer of `can_share`.
///
/// `Undefined` is reserved for `x == y` and must not be folded into either
/// boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareOutcome {
    Granted,
    Denied,
    Undefined,
}

impl ShareOutcome {
    pub fn from_bool(granted: bool) -> Self {
        if granted {
            ShareOutcome::Granted
        } else {
            ShareOutcome::Denied
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            ShareOutcome::Granted => Some(true),
            ShareOutcome::Denied => Some(false),
            ShareOutcome::Undefined => None,
        }
    }
}

impl fmt::Display for ShareOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareOutcome::Granted => f.write_str("true"),
            ShareOutcome::Denied => f.write_str("false"),
            ShareOutcome::Undefined => f.write_str("undefined"),
        }
    }
}
