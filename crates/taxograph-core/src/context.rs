/// View/manifold context consumed opaquely by diagnostic formatting.
///
/// The surrounding platform decides which premise of the relationship data a
/// graph was built from and how to render a node for humans. The engine
/// passes both through to alert-message formatting and touches neither.
use std::fmt;

use serde::Serialize;

use crate::newtypes::NodeId;

// ---------------------------------------------------------------------------
// PremiseType
// ---------------------------------------------------------------------------

/// Which premise of the relationship data the in-scope edges come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PremiseType {
    /// Relationships as directly authored.
    Stated,
    /// Relationships as produced by the classifier.
    Inferred,
}

impl fmt::Display for PremiseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PremiseType::Stated => write!(f, "stated"),
            PremiseType::Inferred => write!(f, "inferred"),
        }
    }
}

// ---------------------------------------------------------------------------
// NodeDescriber / ViewContext
// ---------------------------------------------------------------------------

/// Renders a node as human-readable text for diagnostic messages.
///
/// Implemented by the surrounding platform over its concept descriptions.
/// Only alert formatting calls this; query results never do.
pub trait NodeDescriber: Send + Sync {
    /// Returns a short human-readable rendering of `nid`.
    fn describe(&self, nid: NodeId) -> String;
}

/// Fallback describer that renders the raw nid.
#[derive(Debug, Default, Clone, Copy)]
pub struct NidDescriber;

impl NodeDescriber for NidDescriber {
    fn describe(&self, nid: NodeId) -> String {
        nid.to_string()
    }
}

/// Premise plus describer, handed through to alert text formatting.
pub struct ViewContext<'a> {
    premise: PremiseType,
    describer: &'a dyn NodeDescriber,
}

impl<'a> ViewContext<'a> {
    /// Bundles a premise and a describer.
    pub fn new(premise: PremiseType, describer: &'a dyn NodeDescriber) -> Self {
        Self { premise, describer }
    }

    /// The premise the in-scope edges were taken from.
    pub fn premise(&self) -> PremiseType {
        self.premise
    }

    /// Renders `nid` through the injected describer.
    pub fn describe(&self, nid: NodeId) -> String {
        self.describer.describe(nid)
    }

    /// Renders a nid list as a comma-separated member string.
    pub fn describe_all(&self, nids: &[NodeId]) -> String {
        nids.iter()
            .map(|&nid| self.describe(nid))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Debug for ViewContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewContext")
            .field("premise", &self.premise)
            .finish_non_exhaustive()
    }
}
