//! Plain-text tables for terminal output.

use super::NULL_MARKER;
use crate::adapter::{to_row_objects, ExecutorResponse};
use crate::error::Result;
use crate::query::{QueryResult, QuerySuccess, Value};

const COLUMN_SEPARATOR: &str = " │ ";
const RULE_JOINT: &str = "─┼─";

/// Renders an executor response as a box-drawn table followed by status lines.
///
/// A row whose length differs from the column count replaces the table with
/// the `MalformedRow` message.
pub fn render_table(response: &ExecutorResponse) -> String {
    let timing = format!("Execution time: {:.3}s", response.execution_time_secs);

    let (body, status) = match &response.result {
        QueryResult::Success(success) => match TextTable::from_success(success) {
            Ok(None) => (
                Some("Query executed successfully, but returned no results.".to_string()),
                format!("Fetched {} rows.", success.row_count()),
            ),
            Ok(Some(table)) => (
                Some(table.to_string()),
                format!("Fetched {} rows.", success.row_count()),
            ),
            Err(e) => (None, e.to_string()),
        },
        QueryResult::Failure(failure) => (None, failure.message.clone()),
    };

    let mut output = String::new();
    if let Some(body) = body {
        output.push_str(&body);
        output.push_str("\n\n");
    }
    output.push_str(&timing);
    output.push('\n');
    output.push_str(&status);
    output.push('\n');
    output
}

/// Column-aligned cell text for a successful result.
struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    widths: Vec<usize>,
}

impl TextTable {
    /// Builds the table, or `None` when there is nothing to show.
    fn from_success(success: &QuerySuccess) -> Result<Option<Self>> {
        to_row_objects(success)?;
        if success.is_empty() {
            return Ok(None);
        }

        let rows: Vec<Vec<String>> = success
            .rows
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        let widths = success
            .columns
            .iter()
            .enumerate()
            .map(|(col, header)| {
                rows.iter()
                    .map(|row| row[col].chars().count())
                    .fold(header.chars().count(), usize::max)
            })
            .collect();

        Ok(Some(Self {
            headers: success.columns.clone(),
            rows,
            widths,
        }))
    }

    fn line(&self, cells: &[String]) -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&self.widths)
            .map(|(cell, &width)| format!("{cell:width$}"))
            .collect();
        padded.join(COLUMN_SEPARATOR).trim_end().to_string()
    }
}

impl std::fmt::Display for TextTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.line(&self.headers))?;
        let rule: Vec<String> = self.widths.iter().map(|w| "─".repeat(*w)).collect();
        write!(f, "{}", rule.join(RULE_JOINT))?;
        for row in &self.rows {
            write!(f, "\n{}", self.line(row))?;
        }
        Ok(())
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => NULL_MARKER.to_string(),
        Value::String(s) => s.replace('\n', " "),
        other => other.to_string(),
    }
}
