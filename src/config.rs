//! Runtime configuration.
//!
//! Credentials are read once at startup (after loading an optional `.env`
//! file) and handed to the query client and abstract scraper explicitly.

use crate::error::{Result, ScholarError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable holding the SerpApi key
pub const SERP_API_KEY_VAR: &str = "SERP_API_KEY";

/// Environment variable holding the ScraperAPI key
pub const SCRAPERAPI_API_KEY_VAR: &str = "SCRAPERAPI_API_KEY";

/// Default SerpApi search endpoint
pub const DEFAULT_SERPAPI_URL: &str = "https://serpapi.com/search.json";

/// Default ScraperAPI endpoint used for CAPTCHA-protected publishers
pub const DEFAULT_SCRAPERAPI_URL: &str = "http://api.scraperapi.com";

/// Default working directory for query and output CSV files
pub const DEFAULT_DATA_DIR: &str = "data";

/// Base name shared by per-query files and the final output file
pub const DEFAULT_OUTPUT_STEM: &str = "query_results";

/// Organic results requested per query
pub const DEFAULT_NUM_RESULTS: u32 = 4;

#[derive(Debug, Clone)]
pub struct Config {
    /// SerpApi credential
    pub serp_api_key: String,
    /// ScraperAPI credential
    pub scraperapi_api_key: String,
    /// Directory holding per-query CSVs and the output CSV
    pub data_dir: PathBuf,
    /// File name stem (`query_results`)
    pub output_stem: String,
    /// Number of organic results requested per query
    pub num_results: u32,
    /// SerpApi search endpoint
    pub serpapi_url: String,
    /// ScraperAPI endpoint
    pub scraperapi_url: String,
}

impl Config {
    /// Build a config with default paths and endpoints
    pub fn new(serp_api_key: impl Into<String>, scraperapi_api_key: impl Into<String>) -> Self {
        Self {
            serp_api_key: serp_api_key.into(),
            scraperapi_api_key: scraperapi_api_key.into(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            output_stem: DEFAULT_OUTPUT_STEM.to_string(),
            num_results: DEFAULT_NUM_RESULTS,
            serpapi_url: DEFAULT_SERPAPI_URL.to_string(),
            scraperapi_url: DEFAULT_SCRAPERAPI_URL.to_string(),
        }
    }

    /// Read credentials from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ScholarError::Config`] naming the first variable that is
    /// unset or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through `lookup`, failing fast when one is absent
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    ScholarError::Config(format!(
                        "{} is not set; export it or add it to a .env file",
                        key
                    ))
                })
        };

        Ok(Self::new(
            require(SERP_API_KEY_VAR)?,
            require(SCRAPERAPI_API_KEY_VAR)?,
        ))
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }
}

/// Load variables from an env file into the process environment.
///
/// A missing file is not an error. Variables already set in the environment
/// take precedence.
pub fn load_env_file(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => {
            info!(path = %path.display(), "Loaded environment file");
            Ok(())
        }
        Err(e) if e.not_found() => {
            debug!(path = %path.display(), "No environment file found");
            Ok(())
        }
        Err(e) => Err(ScholarError::Config(format!(
            "Failed to load {}: {}",
            path.display(),
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() -> Result<()> {
        let config = Config::from_lookup(lookup_from(&[
            (SERP_API_KEY_VAR, "serp"),
            (SCRAPERAPI_API_KEY_VAR, " scraper "),
        ]))?;
        assert_eq!(config.serp_api_key, "serp");
        assert_eq!(config.scraperapi_api_key, "scraper");
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.output_stem, "query_results");
        assert_eq!(config.num_results, 4);
        Ok(())
    }

    #[test]
    fn test_missing_key_names_variable() {
        let err = Config::from_lookup(lookup_from(&[(SERP_API_KEY_VAR, "serp")]))
            .expect_err("missing scraper key must fail");
        assert!(err.to_string().contains(SCRAPERAPI_API_KEY_VAR));

        let err = Config::from_lookup(lookup_from(&[
            (SERP_API_KEY_VAR, "  "),
            (SCRAPERAPI_API_KEY_VAR, "scraper"),
        ]))
        .expect_err("blank serp key must fail");
        assert!(err.to_string().contains(SERP_API_KEY_VAR));
    }

    #[test]
    fn test_load_env_file_missing_is_ok() {
        assert!(load_env_file(Path::new("/nonexistent/.env")).is_ok());
    }

    #[test]
    fn test_load_env_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "SCHOLAR_ABSTRACTS_TEST_VAR=from_file")?;
        load_env_file(file.path())?;
        assert_eq!(
            std::env::var("SCHOLAR_ABSTRACTS_TEST_VAR").ok().as_deref(),
            Some("from_file")
        );
        Ok(())
    }
}
