//! Google Scholar queries through the SerpApi search API.
//!
//! [`SerpApiClient::query`] returns the raw JSON response; [`organic_results`]
//! flattens its `organic_results` array into a [`Table`].

use crate::config::Config;
use crate::error::{Result, ScholarError};
use crate::table::Table;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

/// SerpApi engine name for Google Scholar
const ENGINE: &str = "google_scholar";

/// Error envelope SerpApi returns in place of results
#[derive(Debug, Deserialize)]
struct SerpApiErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// SerpApi Google Scholar client
pub struct SerpApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    num_results: u32,
}

impl SerpApiClient {
    /// Create a client from the endpoint, key and result count in `config`
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ScholarError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.serpapi_url.clone(),
            api_key: config.serp_api_key.clone(),
            num_results: config.num_results,
        })
    }

    /// Run one Google Scholar search and return the raw JSON response.
    ///
    /// # Errors
    ///
    /// Transport failures, a non-success status, or an `error` field in the
    /// response body. Nothing is retried.
    ///
    /// SerpApi reports a search with no hits as an `error` field with status
    /// 200 ("Google hasn't returned any results for this query."), so such a
    /// query fails here rather than yielding an empty table.
    pub async fn query(&self, term: &str) -> Result<Value> {
        let url = build_search_url(&self.base_url, term, self.num_results, &self.api_key)?;
        info!(query = term, num = self.num_results, "Querying Google Scholar");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;
        let api_message = serde_json::from_str::<SerpApiErrorBody>(&text)
            .ok()
            .and_then(|b| b.error);

        if let Some(message) = api_message {
            return Err(ScholarError::Api {
                code: status.as_u16() as i32,
                message,
            });
        }

        if !status.is_success() {
            return Err(ScholarError::Api {
                code: status.as_u16() as i32,
                message: format!("SerpApi error: {}", status),
            });
        }

        let body: Value = serde_json::from_str(&text)?;
        debug!(query = term, "Received SerpApi response");
        Ok(body)
    }
}

/// Build the SerpApi search URL
fn build_search_url(base_url: &str, term: &str, num: u32, api_key: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ScholarError::Config(format!("Invalid SerpApi URL '{}': {}", base_url, e)))?;

    url.query_pairs_mut()
        .append_pair("engine", ENGINE)
        .append_pair("q", term)
        .append_pair("num", &num.to_string())
        .append_pair("api_key", api_key);

    Ok(url)
}

/// Flatten `organic_results` into a table.
///
/// Columns follow the order in which keys first appear. Scalars are stored as
/// text, nested objects and arrays as compact JSON, and `null` or empty
/// strings as missing cells.
pub fn organic_results(response: &Value) -> Table {
    let items: &[Value] = response
        .get("organic_results")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut columns: Vec<String> = Vec::new();
    for item in items.iter().filter_map(Value::as_object) {
        for key in item.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = Table::new(columns.iter().map(String::as_str));
    for item in items.iter().filter_map(Value::as_object) {
        let row = columns
            .iter()
            .map(|col| item.get(col).and_then(cell_text))
            .collect();
        table.push_row(row);
    }

    info!(count = table.len(), "Parsed organic results");
    table
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
