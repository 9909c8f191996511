/*!
 * Tests for snapshot summary assembly
 */

use edgar13f::info_table::InformationTable;
use edgar13f::summary::{SnapshotMeta, SnapshotSummary};

use crate::common::sample_info_table_xml;

fn meta_fixture() -> SnapshotMeta {
    SnapshotMeta {
        cik: "0001067983".to_string(),
        manager_name: "EXAMPLE CAPITAL MANAGEMENT".to_string(),
        period_end: "2024-03-31".to_string(),
        accession: "0000000000-24-000002".to_string(),
        filing_date: "2024-05-15".to_string(),
    }
}

/// Counts and totals come from the parsed table
#[test]
fn test_build_withSampleTable_shouldSummarize() {
    let table = InformationTable::parse_str(&sample_info_table_xml()).unwrap();
    let summary = SnapshotSummary::build(&table, &meta_fixture());

    assert_eq!(summary.holding_count, 2);
    assert_eq!(summary.skipped_count, 0);
    assert_eq!(summary.total_value_thousands_usd, 17500);
}

/// Filing metadata is propagated untouched
#[test]
fn test_build_withMeta_shouldCarryIdentifyingFields() {
    let table = InformationTable {
        holdings: Vec::new(),
        skipped: 3,
    };
    let summary = SnapshotSummary::build(&table, &meta_fixture());

    assert_eq!(summary.cik, "0001067983");
    assert_eq!(summary.manager_name, "EXAMPLE CAPITAL MANAGEMENT");
    assert_eq!(summary.period_end, "2024-03-31");
    assert_eq!(summary.accession, "0000000000-24-000002");
    assert_eq!(summary.filing_date, "2024-05-15");
    assert_eq!(summary.holding_count, 0);
    assert_eq!(summary.skipped_count, 3);
    assert_eq!(summary.total_value_thousands_usd, 0);
}

/// The summary serializes with the expected JSON keys
#[test]
fn test_summary_serialize_shouldExposeExpectedKeys() {
    let table = InformationTable::parse_str(&sample_info_table_xml()).unwrap();
    let summary = SnapshotSummary::build(&table, &meta_fixture());

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["holding_count"], 2);
    assert_eq!(json["skipped_count"], 0);
    assert_eq!(json["total_value_thousands_usd"], 17500);
    assert_eq!(json["manager_name"], "EXAMPLE CAPITAL MANAGEMENT");
    assert_eq!(json["cik"], "0001067983");
}
