/*!
 * # edgar13f - EDGAR 13F Snapshot Builder
 *
 * A Rust library and CLI for building holdings snapshots from SEC EDGAR
 * 13F-HR filings.
 *
 * ## Features
 *
 * - Resolve a manager name to a CIK via the EDGAR company browse feed
 * - Locate the latest 13F-HR filing (optionally by filing month)
 * - Fetch the filing's information-table XML, with polite retry/backoff
 * - Parse and validate the information table into typed holding records
 * - Write a CSV snapshot plus an optional JSON summary
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `edgar_client`: SEC EDGAR network access (CIK resolution, submissions,
 *   archive listings, document download)
 * - `info_table`: Information-table parsing and normalization
 * - `summary`: Snapshot summary assembly
 * - `snapshot_writer`: CSV/JSON output
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod edgar_client;
pub mod errors;
pub mod file_utils;
pub mod info_table;
pub mod snapshot_writer;
pub mod summary;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, SnapshotReport, SnapshotRequest};
pub use edgar_client::{EdgarClient, FilingRef, IndexListing, Submissions, latest_13f_accession};
pub use errors::{AppError, FetchError, TableError};
pub use info_table::{Holding, InformationTable, RawEntry, ShareType};
pub use summary::{SnapshotMeta, SnapshotSummary};
