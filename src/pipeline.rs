//! The end-to-end run: query, save, combine, normalize, scrape, save.

use crate::abstracts::AbstractScraper;
use crate::config::Config;
use crate::error::Result;
use crate::normalize::normalize;
use crate::report::{report, Report};
use crate::serpapi::{organic_results, SerpApiClient};
use crate::store::ResultStore;
use tracing::info;

/// Run every stage for `queries` and return the summary.
///
/// Query, combine, normalize and output failures abort the run. Per-query
/// files already written stay on disk.
pub async fn run(config: &Config, queries: &[String]) -> Result<Report> {
    let client = SerpApiClient::new(config)?;
    let scraper = AbstractScraper::new(config)?;
    let store = ResultStore::new(&config.data_dir, &config.output_stem);

    println!("Querying results");
    for query in queries {
        let response = client.query(query).await?;
        store.save(&organic_results(&response), query)?;
    }

    println!("Results gathered, combining query results.");
    let combined = normalize(&store.combine()?)?;

    println!("Extracting abstracts");
    let scraped = scraper.scrape_all(&combined).await?;

    println!("Saving final result");
    let path = store.save_output(&scraped)?;
    info!(path = %path.display(), rows = scraped.len(), "Pipeline complete");

    Ok(report(&scraped, &config.output_stem))
}
