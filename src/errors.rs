/*!
 * Error types for the edgar13f application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when talking to the SEC EDGAR endpoints
#[derive(Error, Debug)]
pub enum FetchError {
    /// Error when a request could not be completed after retries
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Error status returned by the server
    #[error("Server responded with HTTP {status} for {url}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// URL that produced the status
        url: String,
    },

    /// Error when the server keeps throttling through every retry
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Error when a filing directory holds no information-table document
    #[error("No information table document found for accession {0}")]
    DocumentNotFound(String),
}

/// Errors that can occur while parsing an information table
#[derive(Error, Debug)]
pub enum TableError {
    /// The input is not shaped as a table of entries at all
    #[error("Malformed information table document: {0}")]
    MalformedDocument(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the EDGAR client
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Error from information-table parsing
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
