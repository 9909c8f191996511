use anyhow::{Context, Result, anyhow};
use log::{info, warn};
use std::path::PathBuf;

use crate::app_config::Config;
use crate::edgar_client::{EdgarClient, latest_13f_accession};
use crate::info_table::InformationTable;
use crate::snapshot_writer;
use crate::summary::{SnapshotMeta, SnapshotSummary};

// @module: Application controller for snapshot building

/// One snapshot request: who, which period, where to write
#[derive(Debug, Clone)]
pub struct SnapshotRequest {
    /// Manager name to resolve (mutually exclusive with `cik`)
    pub manager: Option<String>,
    /// Manager CIK, digits only (mutually exclusive with `manager`)
    pub cik: Option<String>,
    /// Optional `YYYY-MM` filing-month filter; latest filing otherwise
    pub filing_month: Option<String>,
    /// Output CSV path
    pub out_csv: PathBuf,
    /// Optional summary JSON path
    pub summary_json: Option<PathBuf>,
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct SnapshotReport {
    /// Data rows written to the CSV
    pub rows_written: usize,
    /// Entries excluded by validation
    pub skipped: usize,
    /// Accession number of the filing used
    pub accession: String,
    /// CSV output path
    pub out_csv: PathBuf,
    /// Summary output path, when requested
    pub summary_json: Option<PathBuf>,
}

/// Main application controller for snapshot building
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Run the snapshot pipeline: resolve, fetch, parse, write
    pub async fn run(&self, request: SnapshotRequest) -> Result<SnapshotReport> {
        let client = EdgarClient::new(&self.config).context("Failed to build EDGAR client")?;

        let raw_cik = match (&request.manager, &request.cik) {
            (Some(_), Some(_)) => {
                return Err(anyhow!("Provide only one of --manager or --cik, not both"));
            }
            (None, None) => {
                return Err(anyhow!("Provide either --manager or --cik"));
            }
            (None, Some(cik)) => cik.clone(),
            (Some(manager), None) => {
                info!("Resolving manager name to CIK: {}", manager);
                let resolved = client
                    .resolve_cik_from_manager_name(manager)
                    .await
                    .context("CIK resolution failed")?
                    .ok_or_else(|| anyhow!("Could not resolve CIK for manager: {}", manager))?;
                info!("Resolved CIK: {}", resolved);
                resolved
            }
        };

        let submissions = client
            .load_submissions(&raw_cik)
            .await
            .with_context(|| format!("Failed to load submissions for CIK {}", raw_cik))?;

        let filing = latest_13f_accession(&submissions, request.filing_month.as_deref())
            .ok_or_else(|| anyhow!("No 13F-HR filings found for this manager/period"))?;
        info!(
            "Latest 13F accession: {} on {}",
            filing.accession, filing.filing_date
        );

        let xml = client
            .fetch_information_table_xml(&raw_cik, &filing.accession)
            .await
            .with_context(|| {
                format!(
                    "Failed to fetch information table for accession {}",
                    filing.accession
                )
            })?;

        let table = InformationTable::parse_str(&xml)
            .with_context(|| format!("Information table for accession {}", filing.accession))?;
        info!("Parsed {} holdings", table.holdings.len());
        if table.skipped > 0 {
            warn!("Skipped {} entries that failed validation", table.skipped);
        }

        let rows_written = snapshot_writer::write_csv(&request.out_csv, &table.holdings)?;
        info!(
            "Wrote CSV: {} ({} rows)",
            request.out_csv.display(),
            rows_written
        );

        if let Some(summary_path) = &request.summary_json {
            let meta = SnapshotMeta {
                cik: EdgarClient::pad_cik(&raw_cik),
                manager_name: submissions.name.clone(),
                period_end: filing.period_end.clone(),
                accession: filing.accession.clone(),
                filing_date: filing.filing_date.clone(),
            };
            let summary = SnapshotSummary::build(&table, &meta);
            snapshot_writer::write_summary(summary_path, &summary)?;
            info!("Wrote summary: {}", summary_path.display());
        }

        Ok(SnapshotReport {
            rows_written,
            skipped: table.skipped,
            accession: filing.accession,
            out_csv: request.out_csv,
            summary_json: request.summary_json,
        })
    }
}
