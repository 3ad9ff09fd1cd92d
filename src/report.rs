//! End-of-run summary.

use crate::abstracts::{ABSTRACT_COLUMN, SCRAPE_ERROR_COLUMN};
use crate::table::Table;
use std::fmt;

/// Counts over the final scraped table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub rows: usize,
    pub missing_abstracts: usize,
    pub failed: usize,
    pub output_stem: String,
}

/// Summarize a scraped table. A row without an `abstract` column value is
/// missing; failed rows are also counted separately.
pub fn report(table: &Table, output_stem: &str) -> Report {
    Report {
        rows: table.len(),
        missing_abstracts: table
            .column(ABSTRACT_COLUMN)
            .iter()
            .filter(|v| v.is_none())
            .count(),
        failed: table
            .column(SCRAPE_ERROR_COLUMN)
            .iter()
            .filter(|v| v.is_some())
            .count(),
        output_stem: output_stem.to_string(),
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Results found: {}", self.rows)?;
        writeln!(f, "Abstracts not found: {}", self.missing_abstracts)?;
        writeln!(f, "Scrape failures: {}", self.failed)?;
        write!(f, "Resultant file name: {}", self.output_stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut table = Table::new(["link", "abstract", "scrape_error"]);
        table.push_row(vec![Some("a".into()), Some("text".into()), None]);
        table.push_row(vec![Some("b".into()), None, None]);
        table.push_row(vec![Some("c".into()), None, Some("Network error".into())]);
        table.push_row(vec![None, Some(String::new()), None]);

        let summary = report(&table, "query_results");
        assert_eq!(
            summary,
            Report {
                rows: 4,
                missing_abstracts: 2,
                failed: 1,
                output_stem: "query_results".to_string(),
            }
        );
        assert_eq!(
            summary.to_string(),
            "Results found: 4\nAbstracts not found: 2\nScrape failures: 1\nResultant file name: query_results"
        );
    }

    #[test]
    fn test_report_without_abstract_column() {
        let mut table = Table::new(["link"]);
        table.push_row(vec![Some("a".into())]);
        let summary = report(&table, "out");
        assert_eq!(summary.missing_abstracts, 1);
        assert_eq!(summary.failed, 0);
    }
}
