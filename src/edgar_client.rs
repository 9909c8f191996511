use std::time::Duration;

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tokio::time::sleep;
use url::Url;

use crate::app_config::Config;
use crate::errors::FetchError;

// @module: SEC EDGAR network access (CIK resolution, submissions, archives)

// @const: CIK capture from the company-browse Atom feed
static ATOM_CIK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"CIK=(\d{1,10})").unwrap());

// @const: href capture from an archive directory HTML listing
static HREF_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r#"href="([^"?]+)""#).unwrap());

const WWW_BASE: &str = "https://www.sec.gov";
const DATA_BASE: &str = "https://data.sec.gov";

/// Client for the SEC EDGAR endpoints.
///
/// Every request carries the configured User-Agent (SEC fair-access
/// requirement), retries transient failures with linear backoff, backs off
/// on 429/503, and pauses briefly after each success.
pub struct EdgarClient {
    /// HTTP client for API requests
    client: Client,
    /// User-Agent sent with every request
    user_agent: String,
    /// Retry attempts per request
    retries: u32,
    /// Pause after each successful request
    polite_delay: Duration,
    /// Base URL for www.sec.gov (overridable for tests)
    www_base: String,
    /// Base URL for data.sec.gov (overridable for tests)
    data_base: String,
}

/// Company submissions feed from `data.sec.gov`
#[derive(Debug, Clone, Deserialize)]
pub struct Submissions {
    /// Registrant name
    #[serde(default)]
    pub name: String,

    /// Filing history
    pub filings: FilingHistory,
}

/// Container for filing history data
#[derive(Debug, Clone, Deserialize)]
pub struct FilingHistory {
    /// Recent filings
    pub recent: RecentFilings,
}

/// Recent filings, returned by the SEC API as parallel arrays where each
/// index corresponds to a single filing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFilings {
    /// Accession numbers (unique filing identifiers)
    #[serde(default)]
    pub accession_number: Vec<String>,

    /// Form types (e.g., "13F-HR", "10-K")
    #[serde(default)]
    pub form: Vec<String>,

    /// Filing dates in YYYY-MM-DD format
    #[serde(default)]
    pub filing_date: Vec<String>,

    /// Report period-end dates in YYYY-MM-DD format
    #[serde(default)]
    pub report_date: Vec<String>,
}

/// Reference to one selected filing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingRef {
    /// Accession number, with dashes
    pub accession: String,
    /// Date the filing was submitted
    pub filing_date: String,
    /// Period end the filing reports on (empty when unavailable)
    pub period_end: String,
}

/// Normalized archive directory listing
#[derive(Debug, Clone, Default)]
pub struct IndexListing {
    /// File names present in the filing directory
    pub files: Vec<String>,
}

// JSON sidecar shape of an archive directory (index.json)
#[derive(Debug, Deserialize)]
struct IndexJson {
    directory: IndexDirectory,
}

#[derive(Debug, Deserialize)]
struct IndexDirectory {
    #[serde(default)]
    item: Vec<IndexItem>,
}

#[derive(Debug, Deserialize)]
struct IndexItem {
    #[serde(default)]
    name: String,
}

impl EdgarClient {
    /// Create a new client from the application configuration
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
            retries: config.http.retries,
            polite_delay: Duration::from_millis(config.http.polite_delay_ms),
            www_base: WWW_BASE.to_string(),
            data_base: DATA_BASE.to_string(),
        })
    }

    /// Override the endpoint base URLs - used by tests
    pub fn with_bases(mut self, www_base: impl Into<String>, data_base: impl Into<String>) -> Self {
        self.www_base = www_base.into();
        self.data_base = data_base.into();
        self
    }

    /// Zero-pad a CIK to the 10 digits EDGAR URLs expect
    pub fn pad_cik(cik: &str) -> String {
        format!("{:0>10}", cik)
    }

    /// Resolve a manager name to a raw CIK via the company-browse Atom feed.
    ///
    /// Returns `None` when the name matches nothing.
    pub async fn resolve_cik_from_manager_name(
        &self,
        name: &str,
    ) -> Result<Option<String>, FetchError> {
        let mut url = Url::parse(&format!("{}/cgi-bin/browse-edgar", self.www_base))
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("company", name)
            .append_pair("owner", "exclude")
            .append_pair("action", "getcompany")
            .append_pair("output", "atom");

        let text = self.get_text(url.as_str()).await?;
        Ok(extract_cik_from_atom(&text))
    }

    /// Load the submissions feed for a CIK
    pub async fn load_submissions(&self, cik: &str) -> Result<Submissions, FetchError> {
        let url = format!("{}/submissions/CIK{}.json", self.data_base, Self::pad_cik(cik));
        let response = self.get_with_retry(&url).await?;
        response
            .json::<Submissions>()
            .await
            .map_err(|e| FetchError::RequestFailed(format!("Failed to parse submissions: {}", e)))
    }

    /// Fetch the information-table XML for a filing.
    ///
    /// Tries the manager's CIK directory first, then the accession-prefix
    /// CIK (some filings are archived under the filer agent's CIK).
    pub async fn fetch_information_table_xml(
        &self,
        cik: &str,
        accession: &str,
    ) -> Result<String, FetchError> {
        let nodash = accession.replace('-', "");

        let mut candidates: Vec<String> = Vec::new();
        if let Ok(n) = cik.trim().parse::<u64>() {
            candidates.push(n.to_string());
        }
        if let Some(prefix) = accession.split('-').next() {
            if let Ok(n) = prefix.parse::<u64>() {
                let prefix_cik = n.to_string();
                if !candidates.contains(&prefix_cik) {
                    candidates.push(prefix_cik);
                }
            }
        }

        let mut last_err: Option<FetchError> = None;
        for cik_dir in &candidates {
            let listing = match self.index_listing(cik_dir, &nodash).await {
                Ok(listing) => listing,
                Err(e) => {
                    debug!("Listing failed under CIK {}: {}", cik_dir, e);
                    last_err = Some(e);
                    continue;
                }
            };
            let Some(filename) = find_information_table_filename(&listing) else {
                continue;
            };
            info!("Information table document: {}", filename);
            let url = format!(
                "{}/Archives/edgar/data/{}/{}/{}",
                self.www_base, cik_dir, nodash, filename
            );
            match self.get_text(&url).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    last_err = Some(e);
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| FetchError::DocumentNotFound(accession.to_string())))
    }

    /// List the files of a filing directory: JSON sidecar first, HTML fallback
    async fn index_listing(
        &self,
        cik_dir: &str,
        accession_nodash: &str,
    ) -> Result<IndexListing, FetchError> {
        let json_url = format!(
            "{}/Archives/edgar/data/{}/{}/index.json",
            self.www_base, cik_dir, accession_nodash
        );
        match self.get_json_index(&json_url).await {
            Ok(listing) => return Ok(listing),
            Err(e) => debug!("JSON index unavailable, falling back to HTML: {}", e),
        }

        let html_url = format!(
            "{}/Archives/edgar/data/{}/{}/",
            self.www_base, cik_dir, accession_nodash
        );
        let html = self.get_text(&html_url).await?;
        let files = extract_names_from_index_html(&html);
        if files.is_empty() {
            return Err(FetchError::DocumentNotFound(accession_nodash.to_string()));
        }
        Ok(IndexListing { files })
    }

    async fn get_json_index(&self, url: &str) -> Result<IndexListing, FetchError> {
        let response = self.get_with_retry(url).await?;
        let parsed = response
            .json::<IndexJson>()
            .await
            .map_err(|e| FetchError::RequestFailed(format!("Failed to parse index: {}", e)))?;
        Ok(IndexListing {
            files: parsed
                .directory
                .item
                .into_iter()
                .map(|item| item.name)
                .filter(|name| !name.is_empty())
                .collect(),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.get_with_retry(url).await?;
        response
            .text()
            .await
            .map_err(|e| FetchError::RequestFailed(format!("Failed to read body: {}", e)))
    }

    // @retries: Transport errors and transient statuses with linear backoff
    async fn get_with_retry(&self, url: &str) -> Result<Response, FetchError> {
        let mut last_failure = String::new();
        let mut rate_limited = false;
        for attempt in 1..=self.retries {
            let result = self
                .client
                .get(url)
                .header(reqwest::header::USER_AGENT, &self.user_agent)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::TOO_MANY_REQUESTS
                        || status == StatusCode::SERVICE_UNAVAILABLE
                    {
                        let wait = Duration::from_millis((attempt as u64 * 1500).min(10_000));
                        warn!(
                            "Rate-limited or unavailable ({}). Sleeping {:.1}s",
                            status.as_u16(),
                            wait.as_secs_f64()
                        );
                        last_failure = format!("HTTP {}", status.as_u16());
                        rate_limited = true;
                        sleep(wait).await;
                        continue;
                    }
                    if status.is_server_error() {
                        last_failure = format!("HTTP {}", status.as_u16());
                        rate_limited = false;
                        if attempt < self.retries {
                            let wait = Duration::from_millis(attempt as u64 * 1000);
                            warn!(
                                "GET failed (attempt {}/{}): {}; retrying in {:.1}s",
                                attempt,
                                self.retries,
                                last_failure,
                                wait.as_secs_f64()
                            );
                            sleep(wait).await;
                        }
                        continue;
                    }
                    if !status.is_success() {
                        return Err(FetchError::HttpStatus {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                    }
                    if !self.polite_delay.is_zero() {
                        sleep(self.polite_delay).await;
                    }
                    return Ok(response);
                }
                Err(e) => {
                    last_failure = e.to_string();
                    rate_limited = false;
                    if attempt < self.retries {
                        let wait = Duration::from_millis(attempt as u64 * 1000);
                        warn!(
                            "GET failed (attempt {}/{}): {}; retrying in {:.1}s",
                            attempt,
                            self.retries,
                            last_failure,
                            wait.as_secs_f64()
                        );
                        sleep(wait).await;
                    }
                }
            }
        }
        if rate_limited {
            return Err(FetchError::RateLimited(format!(
                "GET {} still throttled after {} attempts",
                url, self.retries
            )));
        }
        Err(FetchError::RequestFailed(format!(
            "GET {} failed after {} attempts: {}",
            url, self.retries, last_failure
        )))
    }
}

/// Pick the latest 13F-HR filing, optionally restricted to a `YYYY-MM`
/// filing month. The submissions arrays are ordered newest first, so the
/// first match wins. Period end comes from the index-aligned reportDate.
pub fn latest_13f_accession(
    submissions: &Submissions,
    filing_month: Option<&str>,
) -> Option<FilingRef> {
    let recent = &submissions.filings.recent;
    for (i, form) in recent.form.iter().enumerate() {
        if form != "13F-HR" {
            continue;
        }
        let filing_date = recent.filing_date.get(i)?.as_str();
        if let Some(month) = filing_month {
            if !filing_date.starts_with(month) {
                continue;
            }
        }
        return Some(FilingRef {
            accession: recent.accession_number.get(i)?.clone(),
            filing_date: filing_date.to_string(),
            period_end: recent.report_date.get(i).cloned().unwrap_or_default(),
        });
    }
    None
}

/// Pick the information-table document out of a filing directory listing.
///
/// Preference order: a canonically named XML, then any XML other than the
/// primary document, then the primary document itself (some filers embed
/// the table there).
pub fn find_information_table_filename(listing: &IndexListing) -> Option<String> {
    let files: Vec<String> = listing.files.iter().map(|f| f.to_lowercase()).collect();

    for name in &files {
        if name.ends_with(".xml")
            && (name.contains("informationtable")
                || name.contains("infotable")
                || name.contains("form13finfo"))
        {
            return Some(name.clone());
        }
    }

    for name in &files {
        if name.ends_with(".xml") && name != "primary_doc.xml" {
            return Some(name.clone());
        }
    }

    files.iter().find(|name| *name == "primary_doc.xml").cloned()
}

/// Extract the first CIK from a company-browse Atom feed
pub fn extract_cik_from_atom(text: &str) -> Option<String> {
    ATOM_CIK_REGEX
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// Extract file names from an archive directory HTML listing, deduplicated
/// in document order
pub fn extract_names_from_index_html(html: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut names = Vec::new();
    for caps in HREF_REGEX.captures_iter(html) {
        let name = caps[1].rsplit('/').next().unwrap_or("").to_string();
        if name.is_empty() || name == "." || name == ".." {
            continue;
        }
        if seen.insert(name.clone()) {
            names.push(name);
        }
    }
    names
}
