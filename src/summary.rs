use serde::Serialize;

use crate::info_table::InformationTable;

// @module: Snapshot summary assembly

/// Identifying metadata for the filing a snapshot was built from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotMeta {
    /// Manager CIK, zero-padded to 10 digits
    pub cik: String,
    /// Registrant name from the submissions feed
    pub manager_name: String,
    /// Period end the filing reports on (empty when unavailable)
    pub period_end: String,
    /// Accession number of the filing
    pub accession: String,
    /// Date the filing was submitted
    pub filing_date: String,
}

/// JSON summary of one snapshot run
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SnapshotSummary {
    /// Manager CIK, zero-padded
    pub cik: String,
    /// Registrant name
    pub manager_name: String,
    /// Period end date
    pub period_end: String,
    /// Filing accession number
    pub accession: String,
    /// Filing submission date
    pub filing_date: String,
    /// Number of holdings written
    pub holding_count: usize,
    /// Number of entries excluded by validation
    pub skipped_count: usize,
    /// Sum of reported values across holdings, thousands of USD
    pub total_value_thousands_usd: u64,
}

impl SnapshotSummary {
    /// Build a summary from a parsed table and its filing metadata
    pub fn build(table: &InformationTable, meta: &SnapshotMeta) -> Self {
        SnapshotSummary {
            cik: meta.cik.clone(),
            manager_name: meta.manager_name.clone(),
            period_end: meta.period_end.clone(),
            accession: meta.accession.clone(),
            filing_date: meta.filing_date.clone(),
            holding_count: table.holdings.len(),
            skipped_count: table.skipped,
            total_value_thousands_usd: table.total_value_thousands_usd(),
        }
    }
}
