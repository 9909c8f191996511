/*!
 * Offline end-to-end tests for the snapshot pipeline: parse a fixture
 * information table, summarize it, write both outputs and read them back.
 */

use edgar13f::info_table::InformationTable;
use edgar13f::snapshot_writer::{write_csv, write_summary};
use edgar13f::summary::{SnapshotMeta, SnapshotSummary};

use crate::common::{create_temp_dir, entry_xml, sample_info_table_xml, wrap_table};

/// Full fixture-to-files run with clean input
#[test]
fn test_snapshot_workflow_withCleanTable_shouldProduceBothOutputs() {
    let temp_dir = create_temp_dir().unwrap();
    let csv_path = temp_dir.path().join("holdings.csv");
    let summary_path = temp_dir.path().join("summary.json");

    let table = InformationTable::parse_str(&sample_info_table_xml()).unwrap();
    let rows = write_csv(&csv_path, &table.holdings).unwrap();

    let meta = SnapshotMeta {
        cik: "0001067983".to_string(),
        manager_name: "EXAMPLE CAPITAL MANAGEMENT".to_string(),
        period_end: "2024-03-31".to_string(),
        accession: "0000000000-24-000002".to_string(),
        filing_date: "2024-05-15".to_string(),
    };
    let summary = SnapshotSummary::build(&table, &meta);
    write_summary(&summary_path, &summary).unwrap();

    // CSV: header plus one line per holding
    let csv_content = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv_content.lines().count(), rows + 1);
    assert!(csv_content.contains("Example Corp A"));
    assert!(csv_content.contains("987654321"));

    // Summary agrees with what the CSV holds
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(json["holding_count"], rows);
    assert_eq!(json["skipped_count"], 0);
    assert_eq!(json["total_value_thousands_usd"], 17500);
    assert_eq!(json["accession"], "0000000000-24-000002");
}

/// Bad rows are dropped from the CSV but stay visible in the summary
#[test]
fn test_snapshot_workflow_withBadRows_shouldReportSkips() {
    let temp_dir = create_temp_dir().unwrap();
    let csv_path = temp_dir.path().join("holdings.csv");
    let summary_path = temp_dir.path().join("summary.json");

    let xml = wrap_table(
        &[
            entry_xml("GOOD CO", "123456789", "100", "10", "SH", Some(("10", "0", "0"))),
            entry_xml("SHORT ID", "1234", "100", "10", "SH", None),
            entry_xml("NO VALUE", "555555555", "n/a", "10", "SH", None),
        ],
        true,
    );
    let table = InformationTable::parse_str(&xml).unwrap();
    assert_eq!(table.holdings.len() + table.skipped, 3);

    let rows = write_csv(&csv_path, &table.holdings).unwrap();
    assert_eq!(rows, 1);

    let summary = SnapshotSummary::build(&table, &SnapshotMeta::default());
    write_summary(&summary_path, &summary).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(json["holding_count"], 1);
    assert_eq!(json["skipped_count"], 2);
    assert_eq!(json["total_value_thousands_usd"], 100);
}

/// An empty filing still yields a valid, observable snapshot
#[test]
fn test_snapshot_workflow_withEmptyTable_shouldWriteHeaderOnlyCsv() {
    let temp_dir = create_temp_dir().unwrap();
    let csv_path = temp_dir.path().join("holdings.csv");

    let table = InformationTable::parse_str(&wrap_table(&[], true)).unwrap();
    let rows = write_csv(&csv_path, &table.holdings).unwrap();

    assert_eq!(rows, 0);
    let csv_content = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv_content.lines().count(), 1);

    let summary = SnapshotSummary::build(&table, &SnapshotMeta::default());
    assert_eq!(summary.holding_count, 0);
    assert_eq!(summary.total_value_thousands_usd, 0);
}
