use std::path::Path;

use anyhow::{Context, Result};

use crate::file_utils::FileManager;
use crate::info_table::Holding;
use crate::summary::SnapshotSummary;

// @module: CSV and JSON snapshot output

// @const: CSV column order, matching the Holding field order
const CSV_HEADERS: [&str; 10] = [
    "issuer_name",
    "security_class",
    "cusip",
    "value_thousands_usd",
    "shares_or_principal",
    "share_type",
    "investment_discretion",
    "voting_sole",
    "voting_shared",
    "voting_none",
];

/// Write holdings to a CSV file, one row per holding with a header row.
///
/// Columns follow the `Holding` field order; integers are written plainly
/// (values stay in thousands of USD) and the share type uses the `SH`/`PRN`
/// wire codes. Returns the number of data rows written.
pub fn write_csv<P: AsRef<Path>>(path: P, holdings: &[Holding]) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        FileManager::ensure_dir(parent)?;
    }

    // Header is written explicitly so an empty table still produces one
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    writer
        .write_record(CSV_HEADERS)
        .context("Failed to write CSV header")?;

    let mut count = 0usize;
    for holding in holdings {
        writer
            .serialize(holding)
            .with_context(|| format!("Failed to write CSV row {}", count + 1))?;
        count += 1;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush CSV file: {}", path.display()))?;

    Ok(count)
}

/// Write the snapshot summary as pretty-printed JSON
pub fn write_summary<P: AsRef<Path>>(path: P, summary: &SnapshotSummary) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize summary")?;
    FileManager::write_to_file(path, &json)
}
