//! Publisher page fetching and abstract extraction.
//!
//! Pages are fetched one at a time, either directly with a desktop browser
//! User-Agent or through ScraperAPI for publishers that serve CAPTCHAs.
//! Extraction follows the [`SelectorRule`] for the row's `source_name`.

use crate::config::Config;
use crate::error::{OptionExt, Result, ScholarError};
use crate::normalize::{LINK_COLUMN, SOURCE_NAME_COLUMN};
use crate::selectors::{rule_for, SelectorRule, Target};
use crate::table::Table;
use indicatif::{ProgressBar, ProgressStyle};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

pub const ABSTRACT_COLUMN: &str = "abstract";
pub const SCRAPE_ERROR_COLUMN: &str = "scrape_error";

/// User agent sent on direct publisher requests
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/50.0.2661.75 Safari/537.36";

/// Zero-based position of the meta tag holding the abstract on meta-flagged
/// publishers
const META_ABSTRACT_INDEX: usize = 5;

/// Result of scraping one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbstractOutcome {
    Found(String),
    Missing,
    Failed(String),
}

impl AbstractOutcome {
    fn from_result(result: Result<Option<String>>) -> Self {
        match result {
            Ok(Some(text)) => Self::Found(text),
            Ok(None) => Self::Missing,
            Err(e) => Self::Failed(e.to_string()),
        }
    }

    pub fn abstract_text(&self) -> Option<String> {
        match self {
            Self::Found(text) => Some(text.clone()),
            Self::Missing | Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<String> {
        match self {
            Self::Failed(reason) => Some(reason.clone()),
            Self::Found(_) | Self::Missing => None,
        }
    }
}

/// Fetches publisher pages and extracts abstracts
pub struct AbstractScraper {
    client: reqwest::Client,
    proxy_url: String,
    proxy_key: String,
}

impl AbstractScraper {
    /// Create a scraper using the ScraperAPI endpoint and key in `config`.
    ///
    /// No request timeout is set.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ScholarError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            proxy_url: config.scraperapi_url.clone(),
            proxy_key: config.scraperapi_api_key.clone(),
        })
    }

    /// Scrape the abstract for `link`, published by `source`.
    ///
    /// An empty link is returned unchanged. A source without a selector rule
    /// yields `None` without any request.
    ///
    /// # Errors
    ///
    /// Transport failures, and meta-flagged pages with between one and five
    /// `<meta>` tags or without a `content` attribute on the sixth.
    pub async fn scrape(&self, link: &str, source: &str) -> Result<Option<String>> {
        if link.is_empty() {
            return Ok(Some(link.to_string()));
        }

        let Some(rule) = rule_for(source) else {
            debug!(source = source, "No selector rule for source");
            return Ok(None);
        };

        let html = if rule.use_proxy {
            self.fetch_via_proxy(link).await?
        } else {
            self.fetch_direct(link).await?
        };

        extract_abstract(&html, rule)
    }

    /// Scrape every row of a normalized table, in order.
    ///
    /// Returns a new table with `abstract` and `scrape_error` columns. A row
    /// that fails is recorded and logged; the remaining rows still run.
    pub async fn scrape_all(&self, table: &Table) -> Result<Table> {
        let progress = ProgressBar::new(table.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let mut outcomes = Vec::with_capacity(table.len());
        for row in table.rows() {
            let link = table.cell(row, LINK_COLUMN).unwrap_or_default();
            let source = table.cell(row, SOURCE_NAME_COLUMN).unwrap_or_default();
            progress.set_message(source.to_string());

            let outcome = AbstractOutcome::from_result(self.scrape(link, source).await);
            if let AbstractOutcome::Failed(reason) = &outcome {
                warn!(link = link, source = source, error = %reason, "Abstract scrape failed");
            }
            outcomes.push(outcome);
            progress.inc(1);
        }
        progress.finish_and_clear();

        let abstracts = outcomes.iter().map(AbstractOutcome::abstract_text).collect();
        let errors = outcomes.iter().map(AbstractOutcome::error).collect();
        table
            .with_column(ABSTRACT_COLUMN, abstracts)?
            .with_column(SCRAPE_ERROR_COLUMN, errors)
    }

    async fn fetch_direct(&self, link: &str) -> Result<String> {
        debug!(link = link, "Fetching publisher page");
        let response = self
            .client
            .get(link)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;
        log_status(link, response.status());
        Ok(response.text().await?)
    }

    async fn fetch_via_proxy(&self, link: &str) -> Result<String> {
        let url = build_proxy_url(&self.proxy_url, &self.proxy_key, link)?;
        debug!(link = link, "Fetching publisher page through proxy");
        let response = self.client.get(url).send().await?;
        log_status(link, response.status());
        Ok(response.text().await?)
    }
}

// The body is parsed whatever the status.
fn log_status(link: &str, status: reqwest::StatusCode) {
    if !status.is_success() {
        debug!(link = link, status = %status, "Publisher returned non-success status");
    }
}

/// Build the ScraperAPI request URL for `link`
fn build_proxy_url(base_url: &str, api_key: &str, link: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ScholarError::Config(format!("Invalid proxy URL '{}': {}", base_url, e)))?;
    url.query_pairs_mut()
        .append_pair("api_key", api_key)
        .append_pair("url", link);
    Ok(url)
}

/// Extract the abstract from a publisher page according to `rule`.
pub fn extract_abstract(html: &str, rule: &SelectorRule) -> Result<Option<String>> {
    let document = Html::parse_document(html);

    if rule.abstract_in_meta {
        return meta_abstract(&document);
    }

    for target in rule.targets {
        if let Some(element) = find_first(&document, target)? {
            let text = element.text().collect::<String>();
            return Ok(Some(text.trim().to_string()));
        }
    }

    Ok(None)
}

/// `content` of the sixth `<meta>` tag. A page with no meta tags at all has
/// no abstract; one with fewer than six is an error.
fn meta_abstract(document: &Html) -> Result<Option<String>> {
    let selector = Selector::parse("meta").map_err(|e| ScholarError::Parse(e.to_string()))?;
    let metas: Vec<ElementRef> = document.select(&selector).collect();
    if metas.is_empty() {
        return Ok(None);
    }

    let content = metas
        .get(META_ABSTRACT_INDEX)
        .ok_or_else(|| {
            ScholarError::Parse(format!(
                "expected at least {} meta tags, found {}",
                META_ABSTRACT_INDEX + 1,
                metas.len()
            ))
        })?
        .value()
        .attr("content")
        .ok_or_parse("abstract meta tag has no content attribute")?;

    Ok(Some(content.to_string()))
}

/// First element in document order with the target's tag and attribute value
fn find_first<'a>(document: &'a Html, target: &Target) -> Result<Option<ElementRef<'a>>> {
    let selector = Selector::parse(target.tag).map_err(|e| ScholarError::Parse(e.to_string()))?;
    Ok(document
        .select(&selector)
        .find(|el| el.value().attr(target.attr).is_some_and(|v| attr_matches(target, v))))
}

/// Whole-value equality, or for `class` any single class token
fn attr_matches(target: &Target, value: &str) -> bool {
    value == target.value
        || (target.attr == "class" && value.split_whitespace().any(|c| c == target.value))
}
