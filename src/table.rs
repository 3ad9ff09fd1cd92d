//! In-memory result table with CSV persistence.
//!
//! A [`Table`] is an ordered list of column names plus rows of optional string
//! cells. `None` is a missing value. Empty CSV cells read back as `None`, so
//! callers should never store `Some("")` for data that must survive a save
//! and reload unchanged.

use crate::error::{Result, ScholarError};
use std::collections::HashSet;
use std::path::Path;

/// A single table row. Cells line up with [`Table::columns`].
pub type Row = Vec<Option<String>>;

/// Column-named rows of optional text cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Append a row, padding or truncating it to the column count
    pub fn push_row(&mut self, mut row: Row) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    /// Cell value of `row` in column `name`, `None` when missing or unknown
    pub fn cell<'a>(&self, row: &'a Row, name: &str) -> Option<&'a str> {
        self.column_index(name)
            .and_then(|idx| row.get(idx))
            .and_then(|v| v.as_deref())
    }

    /// All values of one column, in row order
    pub fn column(&self, name: &str) -> Vec<Option<&str>> {
        match self.column_index(name) {
            Some(idx) => self.rows.iter().map(|r| r[idx].as_deref()).collect(),
            None => vec![None; self.rows.len()],
        }
    }

    /// Return a copy with `name` set to `values`, replacing the column if it
    /// already exists, appending it otherwise.
    pub fn with_column(&self, name: &str, values: Vec<Option<String>>) -> Result<Table> {
        if values.len() != self.rows.len() {
            return Err(ScholarError::Parse(format!(
                "column '{}' has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        let mut table = self.clone();
        match table.column_index(name) {
            Some(idx) => {
                for (row, value) in table.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                table.columns.push(name.to_string());
                for (row, value) in table.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(table)
    }

    /// Return a copy without the named columns. Unknown names are ignored.
    pub fn drop_columns(&self, names: &[&str]) -> Table {
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !names.contains(&c.as_str()))
            .map(|(i, _)| i)
            .collect();

        Table {
            columns: keep.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| keep.iter().map(|&i| r[i].clone()).collect())
                .collect(),
        }
    }

    /// Return a copy holding only the rows for which `keep` is true
    pub fn filter_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&Table, &Row) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| keep(self, *r))
                .cloned()
                .collect(),
        }
    }

    /// Remove rows equal across every column, keeping first occurrences
    pub fn dedup(&self) -> Table {
        let mut seen: HashSet<&Row> = HashSet::new();
        let rows = self
            .rows
            .iter()
            .filter(|r| seen.insert(*r))
            .cloned()
            .collect();
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Concatenate tables. Columns are the union in first-seen order; cells a
    /// table does not have are missing.
    pub fn concat(tables: &[Table]) -> Table {
        let mut columns: Vec<String> = Vec::new();
        for table in tables {
            for col in &table.columns {
                if !columns.contains(col) {
                    columns.push(col.clone());
                }
            }
        }

        let mut combined = Table::new(columns);
        for table in tables {
            let mapping: Vec<Option<usize>> = combined
                .columns
                .iter()
                .map(|c| table.column_index(c))
                .collect();
            for row in &table.rows {
                let new_row = mapping
                    .iter()
                    .map(|idx| idx.and_then(|i| row[i].clone()))
                    .collect();
                combined.rows.push(new_row);
            }
        }
        combined
    }

    /// Read a table from a CSV file with a header row
    pub fn read_csv(path: &Path) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let mut table = Table::new(reader.headers()?.iter());
        for record in reader.records() {
            let record = record?;
            let row = record
                .iter()
                .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
                .collect();
            table.push_row(row);
        }
        Ok(table)
    }

    /// Write the table to a CSV file, overwriting it. Missing cells are empty.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if self.columns.is_empty() {
            std::fs::write(path, "")?;
            return Ok(());
        }

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|v| v.as_deref().unwrap_or("")))?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cells(values: &[&str]) -> Row {
        values
            .iter()
            .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
            .collect()
    }

    #[test]
    fn test_concat_unions_columns() {
        let mut a = Table::new(["link", "title"]);
        a.push_row(cells(&["http://a", "A"]));
        let mut b = Table::new(["title", "snippet"]);
        b.push_row(cells(&["B", "text"]));

        let combined = Table::concat(&[a, b]);
        assert_eq!(combined.columns(), &["link", "title", "snippet"]);
        assert_eq!(combined.rows()[0], cells(&["http://a", "A", ""]));
        assert_eq!(combined.rows()[1], cells(&["", "B", "text"]));
    }

    #[test]
    fn test_dedup_keeps_first() {
        let mut table = Table::new(["link", "query"]);
        table.push_row(cells(&["http://a", "x"]));
        table.push_row(cells(&["http://b", "x"]));
        table.push_row(cells(&["http://a", "x"]));
        table.push_row(cells(&["http://a", "y"]));

        let deduped = table.dedup();
        assert_eq!(deduped.len(), 3);
        assert_eq!(deduped.column("query"), vec![Some("x"), Some("x"), Some("y")]);
    }

    #[test]
    fn test_with_column_replaces_and_appends() -> Result<()> {
        let mut table = Table::new(["link"]);
        table.push_row(cells(&["http://a"]));

        let added = table.with_column("abstract", vec![Some("text".into())])?;
        assert_eq!(added.columns(), &["link", "abstract"]);

        let replaced = added.with_column("abstract", vec![None])?;
        assert_eq!(replaced.column("abstract"), vec![None]);
        // original untouched
        assert_eq!(table.columns(), &["link"]);

        assert!(table.with_column("x", vec![]).is_err());
        Ok(())
    }

    #[test]
    fn test_drop_columns_ignores_unknown() {
        let mut table = Table::new(["position", "link", "type"]);
        table.push_row(cells(&["1", "http://a", "Html"]));

        let dropped = table.drop_columns(&["position", "type", "result_id"]);
        assert_eq!(dropped.columns(), &["link"]);
        assert_eq!(dropped.rows()[0], cells(&["http://a"]));
    }

    #[test]
    fn test_csv_round_trip() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("t.csv");

        let mut table = Table::new(["title", "resources"]);
        table.push_row(cells(&["Comma, \"quoted\"", r#"[{"title":"nature.com"}]"#]));
        table.push_row(cells(&["Multi\nline", ""]));
        table.write_csv(&path)?;

        assert_eq!(Table::read_csv(&path)?, table);
        Ok(())
    }

    #[test]
    fn test_write_empty_table() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("empty.csv");
        Table::default().write_csv(&path)?;

        let read = Table::read_csv(&path)?;
        assert!(read.is_empty());
        assert!(read.columns().is_empty());
        Ok(())
    }
}
