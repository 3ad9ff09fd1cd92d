//! Per-query CSV persistence and combination.

use crate::error::Result;
use crate::table::Table;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Column added to every combined row with its originating query
pub const QUERY_COLUMN: &str = "query";

/// Search-result columns dropped when combining
pub const COMBINE_DROPPED_COLUMNS: &[&str] = &["result_id", "position", "inline_links", "type"];

/// CSV store rooted at a working directory.
///
/// Per-query files are `<stem>_<query>.csv`; the final output is
/// `<stem>.csv` in the same directory.
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
    stem: String,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the per-query file for `query`
    pub fn query_path(&self, query: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{}.csv", self.stem, query.replace(' ', "_")))
    }

    /// Path of the combined output file
    pub fn output_path(&self) -> PathBuf {
        self.dir.join(format!("{}.csv", self.stem))
    }

    /// Save one query's results, creating the directory and overwriting any
    /// earlier file for the same query.
    pub fn save(&self, rows: &Table, query: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.query_path(query);
        rows.write_csv(&path)?;
        info!(query = query, rows = rows.len(), path = %path.display(), "Saved query results");
        Ok(path)
    }

    /// Save the final combined table
    pub fn save_output(&self, table: &Table) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.output_path();
        table.write_csv(&path)?;
        info!(rows = table.len(), path = %path.display(), "Saved final results");
        Ok(path)
    }

    /// Read every CSV in the directory except the output file, tag rows with
    /// their query, concatenate, and drop identifier columns.
    ///
    /// Files are read in file-name order. The query tag is recovered from the
    /// file name with underscores read back as spaces, so a query that itself
    /// contained underscores is tagged with spaces in their place.
    pub fn combine(&self) -> Result<Table> {
        let output = self.output_path();
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
            .filter(|p| *p != output)
            .collect();
        paths.sort();

        let mut tables = Vec::with_capacity(paths.len());
        for path in &paths {
            let table = Table::read_csv(path)?;
            let query = self.query_from_path(path);
            debug!(path = %path.display(), query = %query, rows = table.len(), "Read query file");
            let tags = vec![Some(query); table.len()];
            tables.push(table.with_column(QUERY_COLUMN, tags)?);
        }

        let combined = Table::concat(&tables).drop_columns(COMBINE_DROPPED_COLUMNS);
        info!(files = paths.len(), rows = combined.len(), "Combined query results");
        Ok(combined)
    }

    /// Recover the query from a per-query file name: the text before the first
    /// period, without the `<stem>_` prefix, underscores read back as spaces.
    fn query_from_path(&self, path: &Path) -> String {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let before_dot = name.split('.').next().unwrap_or_default();
        let prefix = format!("{}_", self.stem);
        before_dot
            .strip_prefix(&prefix)
            .unwrap_or(before_dot)
            .replace('_', " ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn search_rows(links: &[&str]) -> Table {
        let mut table = Table::new(["position", "title", "result_id", "link", "type", "inline_links"]);
        for (i, link) in links.iter().enumerate() {
            table.push_row(vec![
                Some(i.to_string()),
                Some(format!("Title {}", i)),
                Some(format!("id{}", i)),
                Some(link.to_string()),
                None,
                Some(r#"{"cited_by":{"total":3}}"#.to_string()),
            ]);
        }
        table
    }

    #[test]
    fn test_query_path() {
        let store = ResultStore::new("data", "query_results");
        assert_eq!(
            store.query_path("deep brain stimulation"),
            PathBuf::from("data/query_results_deep_brain_stimulation.csv")
        );
        assert_eq!(store.output_path(), PathBuf::from("data/query_results.csv"));
    }

    #[test]
    fn test_save_creates_dir_and_overwrites() -> Result<()> {
        let temp = TempDir::new()?;
        let store = ResultStore::new(temp.path().join("nested"), "query_results");

        store.save(&search_rows(&["http://a", "http://b"]), "x")?;
        let path = store.save(&search_rows(&["http://c"]), "x")?;

        let reloaded = Table::read_csv(&path)?;
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.column("link"), vec![Some("http://c")]);
        Ok(())
    }

    #[test]
    fn test_save_then_combine_round_trip() -> Result<()> {
        let temp = TempDir::new()?;
        let store = ResultStore::new(temp.path(), "query_results");
        let rows = search_rows(&["http://a", "http://b"]);
        store.save(&rows, "motor cortex")?;

        let combined = store.combine()?;
        let expected = rows
            .drop_columns(COMBINE_DROPPED_COLUMNS)
            .with_column(QUERY_COLUMN, vec![Some("motor cortex".to_string()); 2])?;
        assert_eq!(combined, expected);
        Ok(())
    }

    #[test]
    fn test_combine_skips_output_and_other_files() -> Result<()> {
        let temp = TempDir::new()?;
        let store = ResultStore::new(temp.path(), "query_results");
        store.save(&search_rows(&["http://a"]), "x")?;
        store.save(&search_rows(&["http://b", "http://c"]), "y")?;
        store.save_output(&search_rows(&["http://stale"]))?;
        std::fs::write(temp.path().join("notes.txt"), "ignored")?;

        let combined = store.combine()?;
        assert_eq!(combined.columns(), &["title", "link", "query"]);
        assert_eq!(
            combined.column("link"),
            vec![Some("http://a"), Some("http://b"), Some("http://c")]
        );
        assert_eq!(combined.column("query"), vec![Some("x"), Some("y"), Some("y")]);
        Ok(())
    }

    #[test]
    fn test_query_from_path() {
        let store = ResultStore::new("data", "query_results");
        assert_eq!(
            store.query_from_path(Path::new("data/query_results_eeg_signal.csv")),
            "eeg signal"
        );
        assert_eq!(store.query_from_path(Path::new("data/other.csv")), "other");
    }

    #[test]
    fn test_combine_tags_underscored_query_with_spaces() -> Result<()> {
        let temp = TempDir::new()?;
        let store = ResultStore::new(temp.path(), "query_results");
        store.save(&search_rows(&["http://a"]), "eeg_signal")?;

        let combined = store.combine()?;
        assert_eq!(combined.column("query"), vec![Some("eeg signal")]);
        Ok(())
    }
}
