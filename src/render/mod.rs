//! Result presentation.
//!
//! Renders query results as standalone HTML documents for display panels
//! and as plain-text tables for the terminal.

mod html;
mod table;

pub use html::{escape_html, render_html};
pub use table::render_table;

use chrono::{DateTime, Local};

/// Marker shown for null cells.
pub const NULL_MARKER: &str = "NULL";

/// Values that vary per render but are not part of the result.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    /// When the query was executed.
    pub executed_at: DateTime<Local>,
}

impl RenderContext {
    /// Creates a context stamped with the current local time.
    pub fn now() -> Self {
        Self {
            executed_at: Local::now(),
        }
    }

    /// Execution time formatted as `YYYY-MM-DD HH:MM:SS`.
    pub fn timestamp(&self) -> String {
        self.executed_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_format() {
        let ctx = RenderContext {
            executed_at: Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap(),
        };
        assert_eq!(ctx.timestamp(), "2024-03-07 09:05:01");
    }
}
