//! Deferred enrichment runner.
//!
//! An [`Enricher`] is the external collaborator that writes descriptive text
//! (fun facts, images, a suggested ancestor) for newly created species. The
//! runner drains the pending queue one node at a time and never holds the
//! store lock while the collaborator is working, so slow enrichers do not
//! block queries or other writers.
//!
//! A node deleted while its enrichment was in flight is skipped, not an
//! error.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::AncestryError;
use crate::model::{AnimalId, Enrichment, EnrichmentRequest};
use crate::store::AncestryStore;

/// Why the collaborator could not produce an enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("enrichment failed: {reason}")]
pub struct EnrichmentFailure {
    pub reason: String,
}

impl EnrichmentFailure {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Produces descriptive attributes for one pending animal.
pub trait Enricher {
    /// # Errors
    ///
    /// Returns [`EnrichmentFailure`] when nothing could be generated; the
    /// node is then marked failed.
    fn enrich(&self, request: &EnrichmentRequest) -> Result<Enrichment, EnrichmentFailure>;
}

impl<F> Enricher for F
where
    F: Fn(&EnrichmentRequest) -> Result<Enrichment, EnrichmentFailure>,
{
    fn enrich(&self, request: &EnrichmentRequest) -> Result<Enrichment, EnrichmentFailure> {
        self(request)
    }
}

/// Summary of one enrichment pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct EnrichmentReport {
    pub applied: Vec<AnimalId>,
    pub failed: Vec<AnimalId>,
    /// Deleted before the result could be stored.
    pub skipped: Vec<AnimalId>,
}

impl EnrichmentReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.applied.len() + self.failed.len() + self.skipped.len()
    }
}

/// Run `enricher` over every pending node in id order.
///
/// An enrichment that the store rejects (e.g. a suggested ancestor that
/// would close a cycle or does not exist) marks the node failed with the
/// rejection message. Only a `NotFound` for the node itself counts as a
/// concurrent delete.
pub fn run_enrichment(store: &AncestryStore, enricher: &dyn Enricher) -> EnrichmentReport {
    let pending = store.pending_enrichment();
    debug!(count = pending.len(), "running enrichment");

    let mut report = EnrichmentReport::default();
    for request in pending {
        let id = request.id;
        let reason = match enricher.enrich(&request) {
            Ok(enrichment) => match store.apply_enrichment(id, enrichment) {
                Ok(_) => {
                    report.applied.push(id);
                    continue;
                }
                Err(AncestryError::NotFound(missing)) if missing == id => {
                    skip(&mut report, &request);
                    continue;
                }
                Err(err) => err.to_string(),
            },
            Err(failure) => failure.reason,
        };

        match store.mark_enrichment_failed(id, &reason) {
            Ok(_) => report.failed.push(id),
            Err(_) => skip(&mut report, &request),
        }
    }

    info!(
        applied = report.applied.len(),
        failed = report.failed.len(),
        skipped = report.skipped.len(),
        "enrichment pass complete"
    );
    report
}

fn skip(report: &mut EnrichmentReport, request: &EnrichmentRequest) {
    warn!(id = %request.id, name = %request.name, "animal deleted before enrichment finished; skipping");
    report.skipped.push(request.id);
}
