//! HTML documents for query results.
//!
//! Every piece of user or API controlled text is escaped. Rendering never
//! fails: problems while rendering a successful result produce a diagnostic
//! document that embeds the raw result.

use std::fmt::Write as _;

use tracing::warn;

use super::{RenderContext, NULL_MARKER};
use crate::error::{HogqlError, Result};
use crate::query::{QueryFailure, QueryResult, QuerySuccess, Value};

const BODY_FONT: &str = "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, \
                         Cantarell, 'Open Sans', 'Helvetica Neue', sans-serif";

const MONO_FONT: &str = "'Courier New', Courier, monospace";

/// Escapes `&`, `<`, `>`, `"` and `'`, in that order.
pub fn escape_html(unsafe_text: &str) -> String {
    unsafe_text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// Renders a query result as a complete HTML document.
pub fn render_html(result: &QueryResult, ctx: &RenderContext) -> String {
    match result {
        QueryResult::Success(success) => render_success(success, ctx).unwrap_or_else(|e| {
            warn!("Failed to format results: {}", e);
            render_formatting_failure(&e, result)
        }),
        QueryResult::Failure(failure) => render_failure(failure, ctx),
    }
}

fn render_success(success: &QuerySuccess, ctx: &RenderContext) -> Result<String> {
    let mut html = String::new();
    write_success_head(&mut html).map_err(fmt_error)?;

    writeln!(
        html,
        r#"<body>
    <div class="query-info">
        <div class="timestamp">Executed at: {}</div>
        <h3>Query:</h3>
        <div class="query-text">{}</div>
    </div>"#,
        ctx.timestamp(),
        escape_html(&success.query_text)
    )
    .map_err(fmt_error)?;

    if success.is_empty() {
        html.push_str(
            r#"    <div class="no-results">
        <p>Query executed successfully, but returned no results or column information.</p>
    </div>
"#,
        );
    } else {
        write_table(&mut html, success)?;
    }

    html.push_str("</body>\n</html>\n");
    Ok(html)
}

fn write_table(html: &mut String, success: &QuerySuccess) -> Result<()> {
    let expected = success.columns.len();

    writeln!(
        html,
        r#"    <h3>Results:</h3>
    <div class="stats">Showing {} rows</div>
    <table>
        <thead>
            <tr>"#,
        success.row_count()
    )
    .map_err(fmt_error)?;

    for column in &success.columns {
        writeln!(html, "                <th>{}</th>", escape_html(column)).map_err(fmt_error)?;
    }
    html.push_str("            </tr>\n        </thead>\n        <tbody>\n");

    for (index, row) in success.rows.iter().enumerate() {
        if row.len() != expected {
            return Err(HogqlError::MalformedRow {
                row: index,
                expected,
                actual: row.len(),
            });
        }

        html.push_str("            <tr>");
        for value in row {
            write!(html, "<td>{}</td>", format_cell(value)?).map_err(fmt_error)?;
        }
        html.push_str("</tr>\n");
    }

    html.push_str("        </tbody>\n    </table>\n");
    Ok(())
}

/// Formats one cell: null marker, escaped JSON block, or escaped scalar.
fn format_cell(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok(format!("<em>{NULL_MARKER}</em>")),
        Value::Object(_) | Value::Array(_) => {
            let json = serde_json::to_string_pretty(value)
                .map_err(|e| HogqlError::formatting(format!("cannot serialize cell: {e}")))?;
            Ok(format!(
                r#"<div class="json-value">{}</div>"#,
                escape_html(&json)
            ))
        }
        Value::String(s) => Ok(escape_html(s)),
        other => Ok(escape_html(&other.to_string())),
    }
}

fn write_success_head(html: &mut String) -> std::fmt::Result {
    write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>PostHog Query Results</title>
    <style>
        body {{
            font-family: {BODY_FONT};
            line-height: 1.6;
            color: var(--vscode-editor-foreground);
            background-color: var(--vscode-editor-background);
            padding: 20px;
            margin: 0;
        }}
        .query-info {{
            margin-bottom: 20px;
            padding: 10px;
            background-color: var(--vscode-editor-lineHighlightBackground);
            border-radius: 4px;
        }}
        .query-text {{
            font-family: {MONO_FONT};
            white-space: pre-wrap;
            padding: 10px;
            background-color: var(--vscode-editor-inactiveSelectionBackground);
            border-radius: 4px;
            overflow-x: auto;
        }}
        .timestamp {{
            font-size: 0.8em;
            color: var(--vscode-descriptionForeground);
        }}
        table {{
            border-collapse: collapse;
            width: 100%;
            margin-top: 20px;
            overflow-x: auto;
            display: block;
        }}
        th, td {{
            text-align: left;
            padding: 8px;
            border: 1px solid var(--vscode-panel-border);
        }}
        th {{
            background-color: var(--vscode-editor-lineHighlightBackground);
            position: sticky;
            top: 0;
        }}
        tr:nth-child(even) {{
            background-color: var(--vscode-editor-inactiveSelectionBackground);
        }}
        .json-value {{
            font-family: {MONO_FONT};
            white-space: pre-wrap;
        }}
        .stats {{
            margin-top: 10px;
            font-size: 0.9em;
            color: var(--vscode-descriptionForeground);
        }}
        .no-results {{
            padding: 20px;
            text-align: center;
            color: var(--vscode-descriptionForeground);
        }}
    </style>
</head>
"#
    )
}

fn error_style() -> String {
    format!(
        r#"    <style>
        body {{ font-family: {BODY_FONT}; color: var(--vscode-editor-foreground); background-color: var(--vscode-editor-background); padding: 20px; }}
        .error {{ color: var(--vscode-errorForeground); background-color: var(--vscode-inputValidation-errorBackground); padding: 10px; border-radius: 4px; margin-bottom: 20px; white-space: pre-wrap; }}
        .timestamp {{ font-size: 0.8em; color: var(--vscode-descriptionForeground); }}
    </style>
"#
    )
}

fn render_failure(failure: &QueryFailure, ctx: &RenderContext) -> String {
    let message = if failure.message.is_empty() {
        "Unknown error"
    } else {
        failure.message.as_str()
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
{style}</head>
<body>
    <div class="timestamp">Executed at: {timestamp}</div>
    <h2>Query Error</h2>
    <div class="error"><p>{message}</p></div>
</body>
</html>
"#,
        style = error_style(),
        timestamp = ctx.timestamp(),
        message = escape_html(message),
    )
}

fn render_formatting_failure(error: &HogqlError, result: &QueryResult) -> String {
    let raw = serde_json::to_string_pretty(result)
        .unwrap_or_else(|e| format!("<unserializable result: {e}>"));

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
{style}</head>
<body>
    <h2>Error Formatting Results</h2>
    <div class="error"><p>{message}</p></div>
    <h3>Raw Response:</h3>
    <pre>{raw}</pre>
</body>
</html>
"#,
        style = error_style(),
        message = escape_html(&error.to_string()),
        raw = escape_html(&raw),
    )
}

fn fmt_error(e: std::fmt::Error) -> HogqlError {
    HogqlError::formatting(e.to_string())
}
