//! Deferred enrichment of newly created animals.
//!
//! Nodes are created immediately; descriptive text and images are filled in
//! later by an external collaborator. The node carries an explicit status so
//! readers can tell "not generated yet" from "generation failed".

use serde::{Deserialize, Serialize};

use super::animal::{AnimalId, Attributes};

/// Where a node stands in the enrichment pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EnrichmentStatus {
    /// Nothing left to do (taxon nodes start here).
    #[default]
    Complete,
    /// Waiting for the enrichment collaborator.
    Pending,
    /// The collaborator gave up; the node stays usable without the fields.
    Failed { reason: String },
}

impl EnrichmentStatus {
    /// Initial status for a freshly created node: leaves without a fun fact
    /// are queued, everything else is complete.
    #[must_use]
    pub fn initial_for(attributes: &Attributes) -> Self {
        if attributes.has_scientific_name() && attributes.fun_fact.is_none() {
            Self::Pending
        } else {
            Self::Complete
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Pending => "pending",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Work item handed to an [`Enricher`](crate::enrichment::Enricher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentRequest {
    pub id: AnimalId,
    pub name: String,
    pub taxonomy_class: Option<String>,
}

/// Result delivered by the enrichment collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    /// Descriptive fields; `Some` values overwrite what the node has.
    #[serde(flatten)]
    pub attributes: Attributes,
    /// Ancestor suggested by a classification step. Only applied when the
    /// node has no ancestor yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_ancestor: Option<AnimalId>,
}
