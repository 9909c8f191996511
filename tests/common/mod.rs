/*!
 * Common test utilities for the edgar13f test suite
 */

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use tempfile::TempDir;

/// Namespace used by the EDGAR information-table schema
pub const INFO_TABLE_NS: &str = "http://www.sec.gov/edgar/document/thirteenf/informationtable";

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &PathBuf, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Builds one infoTable entry element with the standard field layout
pub fn entry_xml(
    issuer: &str,
    cusip: &str,
    value: &str,
    amount: &str,
    share_type: &str,
    voting: Option<(&str, &str, &str)>,
) -> String {
    let voting_block = match voting {
        Some((sole, shared, none)) => format!(
            "<votingAuthority><Sole>{}</Sole><Shared>{}</Shared><None>{}</None></votingAuthority>",
            sole, shared, none
        ),
        None => String::new(),
    };
    format!(
        "<infoTable>\
         <nameOfIssuer>{}</nameOfIssuer>\
         <titleOfClass>COM</titleOfClass>\
         <cusip>{}</cusip>\
         <value>{}</value>\
         <shrsOrPrnAmt><sshPrnamt>{}</sshPrnamt><sshPrnamtType>{}</sshPrnamtType></shrsOrPrnAmt>\
         <investmentDiscretion>SOLE</investmentDiscretion>\
         {}\
         </infoTable>",
        issuer, cusip, value, amount, share_type, voting_block
    )
}

/// Wraps entries in an informationTable root, namespaced or plain
pub fn wrap_table(entries: &[String], namespaced: bool) -> String {
    let body = entries.concat();
    if namespaced {
        format!(
            "<informationTable xmlns=\"{}\">{}</informationTable>",
            INFO_TABLE_NS, body
        )
    } else {
        format!("<informationTable>{}</informationTable>", body)
    }
}

/// Sample two-entry information table, namespaced
pub fn sample_info_table_xml() -> String {
    wrap_table(
        &[
            entry_xml(
                "Example Corp A",
                "123456789",
                "15000",
                "1000000",
                "SH",
                Some(("800000", "200000", "0")),
            ),
            entry_xml(
                "Example Corp B",
                "987654321",
                "2500",
                "10000",
                "SH",
                Some(("10000", "0", "0")),
            ),
        ],
        true,
    )
}
