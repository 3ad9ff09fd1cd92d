//! Combined-result cleanup: source names, bookshop links, duplicates.

use crate::error::{OptionExt, Result, ScholarError};
use crate::table::Table;
use serde_json::Value;
use tracing::info;

pub const SOURCE_NAME_COLUMN: &str = "source_name";
pub const RESOURCES_COLUMN: &str = "resources";
pub const PUBLICATION_INFO_COLUMN: &str = "publication_info";
pub const LINK_COLUMN: &str = "link";

/// Links containing this are treated as bookshop mirrors and removed
const BOOK_MARKER: &str = "book";

/// Normalize a combined table.
///
/// Adds `source_name` from the first `resources` entry, drops
/// `publication_info` and `resources`, removes rows whose link contains
/// `book`, and removes duplicate rows. Normalizing twice is a no-op.
///
/// # Errors
///
/// Fails the whole table when a `resources` cell is not a JSON list whose
/// first entry has a string `title`.
pub fn normalize(table: &Table) -> Result<Table> {
    let with_source = if table.has_column(RESOURCES_COLUMN) {
        let names = table
            .column(RESOURCES_COLUMN)
            .into_iter()
            .map(|cell| match cell {
                Some(resources) => first_resource_title(resources).map(Some),
                None => Ok(Some(String::new())),
            })
            .collect::<Result<Vec<_>>>()?;
        table.with_column(SOURCE_NAME_COLUMN, names)?
    } else if table.has_column(SOURCE_NAME_COLUMN) {
        table.clone()
    } else {
        table.with_column(SOURCE_NAME_COLUMN, vec![Some(String::new()); table.len()])?
    };

    let normalized = with_source
        .drop_columns(&[PUBLICATION_INFO_COLUMN, RESOURCES_COLUMN])
        .filter_rows(|t, row| {
            !t.cell(row, LINK_COLUMN)
                .is_some_and(|link| link.contains(BOOK_MARKER))
        })
        .dedup();

    info!(
        before = table.len(),
        after = normalized.len(),
        "Normalized combined results"
    );
    Ok(normalized)
}

/// `title` of the first entry of a serialized `resources` list
fn first_resource_title(resources: &str) -> Result<String> {
    let parsed: Value = serde_json::from_str(resources).map_err(|e| {
        ScholarError::Parse(format!("resources is not valid JSON ({}): {}", e, resources))
    })?;

    let title = parsed
        .as_array()
        .ok_or_parse("resources is not a list")?
        .first()
        .ok_or_parse("resources list is empty")?
        .get("title")
        .and_then(Value::as_str)
        .ok_or_parse("first resource has no title")?;

    Ok(title.to_string())
}
