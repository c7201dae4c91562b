use std::collections::BTreeMap;

use crate::engine::{Ingested, Reconciliation};
use crate::model::{MatchStatus, ReconSummary, Source};

/// Compute summary statistics from ingestion and matching results.
pub fn compute_summary(total_rows: usize, ingested: &Ingested, recon: &Reconciliation) -> ReconSummary {
    let mut status_counts: BTreeMap<MatchStatus, usize> =
        MatchStatus::ALL.iter().map(|s| (*s, 0)).collect();
    for verdict in &recon.verdicts {
        *status_counts.entry(verdict.outcome.status()).or_insert(0) += 1;
    }

    let primary_rows = ingested.records.iter().filter(|r| r.source == Source::Primary).count();

    ReconSummary {
        total_rows,
        primary_rows,
        secondary_rows: ingested.records.len() - primary_rows,
        unclassified_rows: ingested.unclassified,
        shadowed_secondary: recon.shadowed.len(),
        status_counts,
    }
}
