//! # scholar_abstracts
//!
//! Google Scholar query + publisher abstract scraper.
//!
//! ## Modules
//!
//! - [`serpapi`] - Google Scholar queries through SerpApi
//! - [`store`] - Per-query CSV files and combination
//! - [`normalize`] - Source names, bookshop filtering, deduplication
//! - [`selectors`] - Per-publisher abstract selector table
//! - [`abstracts`] - Publisher page fetching and abstract extraction
//! - [`report`] - End-of-run counts
//! - [`pipeline`] - The full run
//! - [`config`] - Credentials and paths
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scholar_abstracts::{config::Config, pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let summary = pipeline::run(&config, &["eeg decoding".to_string()]).await?;
//!     println!("{}", summary);
//!     Ok(())
//! }
//! ```

pub mod abstracts;
pub mod config;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod selectors;
pub mod serpapi;
pub mod store;
pub mod table;

pub use error::{Result, ScholarError};
