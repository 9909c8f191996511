use std::fmt;
use log::{debug, warn};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};

use crate::errors::TableError;

// @module: 13F-HR information-table parsing and normalization

/// Share/principal amount type reported for a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShareType {
    /// Share count ("SH")
    #[serde(rename = "SH")]
    Shares,
    /// Principal amount ("PRN")
    #[serde(rename = "PRN")]
    Principal,
}

impl ShareType {
    // @maps: Wire code to enum, unrecognized codes fall back to shares
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "PRN" => ShareType::Principal,
            _ => ShareType::Shares,
        }
    }

    // @returns: Wire code used in filings and CSV output
    pub fn as_code(&self) -> &'static str {
        match self {
            ShareType::Shares => "SH",
            ShareType::Principal => "PRN",
        }
    }
}

impl fmt::Display for ShareType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

/// One validated, normalized position from an information table.
///
/// Immutable once constructed; field order matches the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    /// Name of the issuing company
    pub issuer_name: String,
    /// Class/title of the security (may be empty when the filer omits it)
    pub security_class: String,
    /// 9-character instrument identifier, uppercased
    pub cusip: String,
    /// Reported value, in thousands of USD per the source convention
    pub value_thousands_usd: u64,
    /// Share count or principal amount, per `share_type`
    pub shares_or_principal: u64,
    /// Whether the amount is shares or principal
    pub share_type: ShareType,
    /// Investment discretion code, passed through trimmed
    pub investment_discretion: String,
    /// Shares with sole voting authority
    pub voting_sole: u64,
    /// Shares with shared voting authority
    pub voting_shared: u64,
    /// Shares with no voting authority
    pub voting_none: u64,
}

/// One unparsed entry as it appears in the source document.
///
/// Everything is textual; absence and emptiness are distinct for the
/// numeric fields (an absent voting element defaults to zero, a present
/// but non-numeric one invalidates the entry).
#[derive(Debug, Default, Clone)]
pub struct RawEntry {
    pub issuer_name: String,
    pub security_class: String,
    pub cusip: String,
    pub value: Option<String>,
    pub shares_or_principal: Option<String>,
    pub share_type_code: String,
    pub investment_discretion: String,
    pub voting_sole: Option<String>,
    pub voting_shared: Option<String>,
    pub voting_none: Option<String>,
}

impl RawEntry {
    // @maps: (parent, leaf) local names to the backing field
    // Single table so the field mapping stays testable apart from the
    // XML traversal. Path segments arrive lowercased.
    fn slot(&mut self, path: &[String]) -> Option<&mut String> {
        let leaf = path.last()?.as_str();
        let parent = if path.len() >= 2 {
            path[path.len() - 2].as_str()
        } else {
            ""
        };
        match (parent, leaf) {
            (_, "nameofissuer") => Some(&mut self.issuer_name),
            (_, "titleofclass") => Some(&mut self.security_class),
            (_, "cusip") => Some(&mut self.cusip),
            (_, "value") => Some(self.value.get_or_insert_with(String::new)),
            ("shrsorprnamt", "sshprnamt") => {
                Some(self.shares_or_principal.get_or_insert_with(String::new))
            }
            ("shrsorprnamt", "sshprnamttype") => Some(&mut self.share_type_code),
            (_, "investmentdiscretion") => Some(&mut self.investment_discretion),
            ("votingauthority", "sole") => Some(self.voting_sole.get_or_insert_with(String::new)),
            ("votingauthority", "shared") => {
                Some(self.voting_shared.get_or_insert_with(String::new))
            }
            ("votingauthority", "none") => Some(self.voting_none.get_or_insert_with(String::new)),
            _ => None,
        }
    }

    fn record(&mut self, path: &[String], text: &str) {
        if let Some(slot) = self.slot(path) {
            slot.push_str(text);
        }
    }
}

/// Why an entry was excluded from the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SkipReason {
    /// Identifier absent or not exactly 9 characters
    InvalidCusip,
    /// Issuer name empty after trimming
    MissingIssuer,
    /// Value missing, negative or non-numeric
    BadValue,
    /// Share/principal amount missing, negative or non-numeric
    BadAmount,
    /// A voting field is present but not a non-negative integer
    BadVoting,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            SkipReason::InvalidCusip => "invalid cusip",
            SkipReason::MissingIssuer => "missing issuer name",
            SkipReason::BadValue => "bad value",
            SkipReason::BadAmount => "bad share/principal amount",
            SkipReason::BadVoting => "bad voting authority field",
        };
        write!(f, "{}", text)
    }
}

// Tagged per-entry outcome. Only the aggregate skip count is public today;
// keeping the reason here lets a later release surface it without an API break.
pub(crate) enum EntryOutcome {
    Parsed(Box<Holding>),
    Skipped(SkipReason),
}

/// Parsed information table: the surviving holdings in document order plus
/// the count of entries that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InformationTable {
    /// Validated holdings, in document order
    pub holdings: Vec<Holding>,
    /// Number of entries excluded by validation
    pub skipped: usize,
}

impl InformationTable {
    /// Parse an information-table XML document.
    ///
    /// Accepts both namespaced and plain-element documents; element names
    /// are matched by local name. Individual bad entries are counted in
    /// `skipped` and never abort the parse. The call fails only when the
    /// input is not an information table at all.
    pub fn parse_str(xml: &str) -> Result<Self, TableError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut holdings = Vec::new();
        let mut skipped = 0usize;
        let mut saw_table = false;
        let mut index = 0usize;

        loop {
            match reader.read_event() {
                Err(e) => return Err(TableError::MalformedDocument(e.to_string())),
                Ok(Event::Eof) => break,
                Ok(Event::Start(start)) => {
                    let name = local_name(start.local_name().as_ref());
                    if name == "informationtable" {
                        saw_table = true;
                    } else if name == "infotable" {
                        saw_table = true;
                        let raw = read_entry(&mut reader)?;
                        match validate_entry(raw) {
                            EntryOutcome::Parsed(holding) => holdings.push(*holding),
                            EntryOutcome::Skipped(reason) => {
                                debug!("Skipping entry {}: {}", index, reason);
                                skipped += 1;
                            }
                        }
                        index += 1;
                    }
                }
                Ok(Event::Empty(start)) => {
                    let name = local_name(start.local_name().as_ref());
                    if name == "informationtable" {
                        saw_table = true;
                    } else if name == "infotable" {
                        // Self-closing entry carries no fields at all
                        saw_table = true;
                        debug!("Skipping entry {}: empty element", index);
                        skipped += 1;
                        index += 1;
                    }
                }
                Ok(_) => {}
            }
        }

        if !saw_table {
            return Err(TableError::MalformedDocument(
                "no information table element found".to_string(),
            ));
        }

        Ok(InformationTable { holdings, skipped })
    }

    /// Sum of reported values across all holdings, in thousands of USD
    pub fn total_value_thousands_usd(&self) -> u64 {
        self.holdings
            .iter()
            .fold(0u64, |acc, h| acc.saturating_add(h.value_thousands_usd))
    }
}

// @reads: One infoTable subtree into a RawEntry
// The caller has consumed the opening tag; this consumes up to and
// including the matching close tag.
fn read_entry(reader: &mut Reader<&[u8]>) -> Result<RawEntry, TableError> {
    let mut raw = RawEntry::default();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Err(e) => return Err(TableError::MalformedDocument(e.to_string())),
            Ok(Event::Eof) => {
                return Err(TableError::MalformedDocument(
                    "document ended inside an entry".to_string(),
                ));
            }
            Ok(Event::Start(start)) => {
                path.push(local_name(start.local_name().as_ref()));
            }
            Ok(Event::Empty(_)) => {
                // Self-closing leaf carries no text; same as an absent field
            }
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|e| TableError::MalformedDocument(e.to_string()))?;
                raw.record(&path, text.as_ref());
            }
            Ok(Event::CData(data)) => {
                let bytes = data.into_inner();
                let text = String::from_utf8_lossy(&bytes).to_string();
                raw.record(&path, &text);
            }
            Ok(Event::End(_)) => {
                if path.is_empty() {
                    // Matching close of the entry element itself
                    return Ok(raw);
                }
                path.pop();
            }
            Ok(_) => {}
        }
    }
}

// @validates: RawEntry into a Holding, or a skip reason
pub(crate) fn validate_entry(raw: RawEntry) -> EntryOutcome {
    let cusip = raw.cusip.trim();
    if cusip.chars().count() != 9 {
        return EntryOutcome::Skipped(SkipReason::InvalidCusip);
    }

    let issuer_name = raw.issuer_name.trim();
    if issuer_name.is_empty() {
        return EntryOutcome::Skipped(SkipReason::MissingIssuer);
    }

    let Some(value) = parse_amount(raw.value.as_deref()) else {
        return EntryOutcome::Skipped(SkipReason::BadValue);
    };
    let Some(shares_or_principal) = parse_amount(raw.shares_or_principal.as_deref()) else {
        return EntryOutcome::Skipped(SkipReason::BadAmount);
    };

    let share_type = ShareType::from_code(&raw.share_type_code);

    // Absent voting fields default to zero; present garbage does not
    let Some(voting_sole) = parse_voting(raw.voting_sole.as_deref()) else {
        return EntryOutcome::Skipped(SkipReason::BadVoting);
    };
    let Some(voting_shared) = parse_voting(raw.voting_shared.as_deref()) else {
        return EntryOutcome::Skipped(SkipReason::BadVoting);
    };
    let Some(voting_none) = parse_voting(raw.voting_none.as_deref()) else {
        return EntryOutcome::Skipped(SkipReason::BadVoting);
    };

    let voting_total = voting_sole
        .saturating_add(voting_shared)
        .saturating_add(voting_none);
    if voting_total != shares_or_principal {
        warn!(
            "Voting authority sum {} does not match amount {} for {}",
            voting_total, shares_or_principal, cusip
        );
    }

    EntryOutcome::Parsed(Box::new(Holding {
        issuer_name: issuer_name.to_string(),
        security_class: raw.security_class.trim().to_string(),
        cusip: cusip.to_ascii_uppercase(),
        value_thousands_usd: value,
        shares_or_principal,
        share_type,
        investment_discretion: raw.investment_discretion.trim().to_string(),
        voting_sole,
        voting_shared,
        voting_none,
    }))
}

/// Coerce numeric text to a non-negative integer, tolerating thousands
/// separators and surrounding whitespace. `None` means missing or invalid.
pub fn parse_amount(text: Option<&str>) -> Option<u64> {
    let cleaned = text?.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<u64>().ok()
}

// Voting fields: absence (or an empty element) defaults to zero, present
// text must coerce
fn parse_voting(text: Option<&str>) -> Option<u64> {
    match text {
        None => Some(0),
        Some(s) if s.trim().is_empty() => Some(0),
        Some(s) => parse_amount(Some(s)),
    }
}

fn local_name(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).to_ascii_lowercase()
}
