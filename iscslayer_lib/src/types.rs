//! Output types for assembled policy data.

use serde::Serialize;

use crate::error::SlayerError;

/// One enriched policy, merged from the search-results row and the detail
/// page. Field order is the exported CSV column order.
///
/// Summary columns are empty strings when the portal leaves them blank;
/// `cancellation_date` is present only for cancelled policies. Records are
/// never mutated after assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyRecord {
    pub policy_number: String,
    pub app_id: String,
    pub status: String,
    pub applicant_company: String,
    pub state: String,
    pub program: String,
    pub total_cost: String,
    pub effective_date: String,
    pub expiration_date: String,
    pub cancellation_date: Option<String>,
}

/// A policy the batch could not assemble, with the error that sank it.
#[derive(Debug)]
pub struct PolicyFailure {
    pub policy_number: String,
    pub error: SlayerError,
}

/// Aggregate of one batch run.
///
/// `records` is in completion order; `failed` preserves the input order of
/// the identifiers that failed.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub records: Vec<PolicyRecord>,
    pub failed: Vec<PolicyFailure>,
    pub attempted: usize,
}

impl BatchResult {
    pub fn succeeded(&self) -> usize {
        self.records.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// Snapshot handed to the progress sink after every per-policy completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}
