#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/facts/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR fact source.
//!
//! This crate fetches a company's XBRL facts from SEC EDGAR and parses them
//! into a [`FactRepository`]:
//!
//! - CIK (Central Index Key) lookup from ticker symbols
//! - Company facts from the EDGAR API
//! - Parsing of facts into [`Observation`]s keyed by concept
//!
//! # Example
//!
//! ```no_run
//! use facts_core::{FactSource, Symbol};
//! use facts_edgar::{EdgarConfig, EdgarFactSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = EdgarFactSource::from_config(EdgarConfig::from_env())?;
//!
//!     let facts = source.company_facts(&Symbol::new("AAPL")).await?;
//!     println!("{:?}: {} concepts", facts.entity_name, facts.facts.len());
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;
use facts_core::{
    CompanyFacts, DataError, FactRepository, FactSource, FilingForm, FiscalPeriod, MetricFactSet,
    Observation, Result, Symbol,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::{Instant, sleep};
use tracing::{debug, instrument};

/// SEC EDGAR API base URL
const EDGAR_BASE_URL: &str = "https://data.sec.gov";

/// SEC company tickers URL
const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// Environment variable holding the SEC user agent
pub const USER_AGENT_ENV: &str = "SEC_USER_AGENT";

/// User agent used when [`USER_AGENT_ENV`] is unset
const DEFAULT_USER_AGENT: &str = "facts-edgar/0.1.0 (contact@example.com)";

/// Taxonomy holding the derived concepts
const TAXONOMY: &str = "us-gaap";

/// Units read per concept, in preference order
const UNIT_PREFERENCE: [&str; 2] = ["USD", "USD/shares"];

/// Default rate limit: 10 requests per second (SEC requirement)
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// Settings for [`EdgarFactSource`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgarConfig {
    /// Identifying user agent, "AppName/Version (contact@email.com)".
    pub user_agent: String,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Minimum spacing between requests.
    pub min_request_interval: Duration,
}

impl Default for EdgarConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            min_request_interval: DEFAULT_RATE_LIMIT,
        }
    }
}

impl EdgarConfig {
    /// Default settings with the user agent taken from `SEC_USER_AGENT`
    /// when set and non-empty.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_user_agent_var(std::env::var(USER_AGENT_ENV).ok())
    }

    /// Default settings with `agent` as the user agent unless it is absent
    /// or blank.
    fn from_user_agent_var(agent: Option<String>) -> Self {
        match agent {
            Some(agent) if !agent.trim().is_empty() => Self::default().with_user_agent(agent),
            _ => Self::default(),
        }
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the minimum spacing between requests.
    #[must_use]
    pub const fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }
}

/// Rate limiter to ensure we don't exceed SEC's rate limits
#[derive(Debug)]
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// SEC EDGAR fact source.
///
/// Resolves tickers to CIKs and downloads company facts. The ticker table is
/// fetched once per source and reused. Implements rate limiting per SEC
/// requirements (max 10 requests/second).
#[derive(Debug)]
pub struct EdgarFactSource {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    tickers: RwLock<Option<Arc<HashMap<String, u64>>>>,
}

impl EdgarFactSource {
    /// Create a new EDGAR source with the specified user agent and default
    /// timeout and rate limit.
    ///
    /// The SEC requires identifying user agent headers. Format should be:
    /// "AppName/Version (contact@email.com)"
    ///
    /// # Example
    /// ```
    /// use facts_edgar::EdgarFactSource;
    ///
    /// let source = EdgarFactSource::new("MyApp/1.0 (contact@example.com)").unwrap();
    /// ```
    pub fn new(user_agent: &str) -> Result<Self> {
        Self::from_config(EdgarConfig::default().with_user_agent(user_agent))
    }

    /// Create a new EDGAR source from settings.
    pub fn from_config(config: EdgarConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| DataError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, config.min_request_interval))
    }

    /// Create a new EDGAR source with a custom HTTP client.
    ///
    /// The client must already carry an identifying user agent.
    pub fn with_client(client: reqwest::Client, min_request_interval: Duration) -> Self {
        Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(min_request_interval))),
            tickers: RwLock::new(None),
        }
    }

    /// Look up a company's CIK number from its ticker symbol.
    ///
    /// # Returns
    /// The company's CIK number as a zero-padded 10-digit string
    #[instrument(skip(self))]
    pub async fn get_cik(&self, ticker: &str) -> Result<String> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(DataError::InvalidParameter("Empty ticker".to_string()));
        }

        let tickers = self.ticker_table().await?;
        let cik = tickers
            .get(&ticker.to_uppercase())
            .ok_or_else(|| DataError::SymbolNotFound(ticker.to_string()))?;

        let cik = pad_cik(&cik.to_string())?;
        debug!("Found CIK {} for ticker {}", cik, ticker);
        Ok(cik)
    }

    /// Returns the cached ticker table, fetching it on first use.
    async fn ticker_table(&self) -> Result<Arc<HashMap<String, u64>>> {
        if let Some(table) = self.tickers.read().await.as_ref() {
            return Ok(Arc::clone(table));
        }

        let mut slot = self.tickers.write().await;
        if let Some(table) = slot.as_ref() {
            return Ok(Arc::clone(table));
        }

        // Rate limit
        self.rate_limiter.lock().await.wait().await;

        debug!("Fetching company tickers from SEC");
        let response = self
            .client
            .get(COMPANY_TICKERS_URL)
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DataError::Network(format!(
                "Failed to fetch company tickers: HTTP {}",
                response.status()
            )));
        }

        let data: HashMap<String, CompanyTickerInfo> = response
            .json()
            .await
            .map_err(|e| DataError::Parse(format!("Failed to parse company tickers: {}", e)))?;

        let table = Arc::new(index_tickers(data));
        debug!(tickers = table.len(), "Cached company tickers");
        *slot = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Fetch company facts from SEC EDGAR.
    ///
    /// # Arguments
    /// * `cik` - Company's CIK number (will be zero-padded)
    async fn fetch_company_facts(&self, cik: &str) -> Result<CompanyFactsResponse> {
        let cik_padded = pad_cik(cik)?;

        // Rate limit
        self.rate_limiter.lock().await.wait().await;

        let url = format!(
            "{}/api/xbrl/companyfacts/CIK{}.json",
            EDGAR_BASE_URL, cik_padded
        );

        debug!("Fetching company facts from {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DataError::Network(format!(
                "Failed to fetch company facts for CIK {}: HTTP {}",
                cik_padded,
                response.status()
            )));
        }

        let facts: CompanyFactsResponse = response
            .json()
            .await
            .map_err(|e| DataError::Parse(format!("Failed to parse company facts: {}", e)))?;

        Ok(facts)
    }
}

#[async_trait]
impl FactSource for EdgarFactSource {
    fn name(&self) -> &str {
        "SEC EDGAR"
    }

    fn description(&self) -> &str {
        "SEC EDGAR company facts from 10-K and 10-Q XBRL filings"
    }

    #[instrument(skip(self, symbol), fields(symbol = %symbol))]
    async fn company_facts(&self, symbol: &Symbol) -> Result<CompanyFacts> {
        let cik = self.get_cik(symbol.as_str()).await?;
        let response = self.fetch_company_facts(&cik).await?;
        let facts = parse_company_facts(symbol, response).with_cik(cik);
        debug!(concepts = facts.facts.len(), "Parsed company facts");
        Ok(facts)
    }
}

/// Zero-pads a CIK to the 10 digits the SEC expects.
///
/// Rejects CIKs that are empty, contain non-digits, or are longer than 10
/// digits.
pub fn pad_cik(cik: &str) -> Result<String> {
    let cik = cik.trim();
    if cik.is_empty() || !cik.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DataError::InvalidParameter(format!(
            "Expected only digits in CIK, got {:?}",
            cik
        )));
    }
    if cik.len() > 10 {
        return Err(DataError::InvalidParameter(format!(
            "CIK longer than 10 digits: {:?}",
            cik
        )));
    }
    Ok(format!("{:0>10}", cik))
}

/// Maps uppercased tickers to CIK numbers.
fn index_tickers(data: HashMap<String, CompanyTickerInfo>) -> HashMap<String, u64> {
    data.into_values()
        .map(|company| (company.ticker.to_uppercase(), company.cik_str))
        .collect()
}

// =============================================================================
// Company Facts Parsing
// =============================================================================

/// Parses a company facts response into a [`CompanyFacts`] repository.
///
/// Reads the `us-gaap` taxonomy. Each concept contributes the observations of
/// the first unit present among `USD` and `USD/shares`. Facts without a start
/// date are instants and get a zero-length window. Facts with unparseable
/// dates or inverted windows are skipped.
#[must_use]
pub fn parse_company_facts(symbol: &Symbol, response: CompanyFactsResponse) -> CompanyFacts {
    let mut repository = FactRepository::new();
    let mut skipped = 0usize;

    let taxonomy = response
        .facts
        .into_iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(TAXONOMY))
        .map(|(_, concepts)| concepts)
        .unwrap_or_default();

    for (concept, tag_facts) in taxonomy {
        let Some(mut units) = tag_facts.units else {
            continue;
        };
        let Some(values) = UNIT_PREFERENCE.iter().find_map(|unit| take_unit(&mut units, unit))
        else {
            continue;
        };

        let mut set = MetricFactSet::new();
        for value in &values {
            match value.to_observation() {
                Some(obs) => set.push(obs),
                None => skipped += 1,
            }
        }
        repository.insert(concept, set);
    }

    if skipped > 0 {
        debug!(symbol = %symbol, skipped, "Skipped malformed facts");
    }

    let mut facts = CompanyFacts::new(symbol.clone(), repository);
    if let Some(name) = response.entity_name {
        facts = facts.with_entity_name(name);
    }
    facts
}

/// Removes a unit's values, matching the unit name ignoring case.
fn take_unit(units: &mut HashMap<String, Vec<FactValue>>, unit: &str) -> Option<Vec<FactValue>> {
    let key = units.keys().find(|k| k.eq_ignore_ascii_case(unit))?.clone();
    units.remove(&key)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

// =============================================================================
// SEC API Response Types
// =============================================================================

/// Company ticker information from SEC JSON.
#[derive(Debug, Deserialize)]
struct CompanyTickerInfo {
    /// CIK as a number (SEC returns this as an integer)
    cik_str: u64,
    /// Ticker symbol
    ticker: String,
}

/// Response from the SEC EDGAR Company Facts API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFactsResponse {
    /// Entity name
    #[serde(default)]
    entity_name: Option<String>,
    /// Facts organized by taxonomy and tag
    #[serde(default)]
    facts: HashMap<String, HashMap<String, TagFacts>>,
}

/// Facts for a specific XBRL tag.
#[derive(Debug, Deserialize)]
struct TagFacts {
    /// Units (USD, shares, etc.) containing the actual fact values
    #[serde(default)]
    units: Option<HashMap<String, Vec<FactValue>>>,
}

/// A single fact value with metadata.
#[derive(Debug, Clone, Deserialize)]
struct FactValue {
    /// Start date of the period; absent for instants
    #[serde(default)]
    start: Option<String>,
    /// End date of the period
    end: String,
    /// Value
    val: f64,
    /// Fiscal period
    #[serde(default)]
    fp: Option<String>,
    /// Form type
    #[serde(default)]
    form: Option<String>,
    /// Frame (instant or duration)
    #[serde(default)]
    frame: Option<String>,
}

impl FactValue {
    fn to_observation(&self) -> Option<Observation> {
        let end = parse_date(&self.end)?;
        let start = match &self.start {
            Some(start) => parse_date(start)?,
            None => end,
        };

        let form = self
            .form
            .as_deref()
            .map_or(FilingForm::Other, FilingForm::parse);
        let fiscal_period = self
            .fp
            .as_deref()
            .map_or(FiscalPeriod::Unspecified, FiscalPeriod::parse);

        let obs = Observation::new(self.val, form, start, end, fiscal_period).ok()?;
        Some(match &self.frame {
            Some(frame) => obs.with_frame_label(frame.as_str()),
            None => obs,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
