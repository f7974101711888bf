//! HogQL runner - run HogQL queries against the PostHog API.

use std::io::Write;

use hogql_runner::adapter::ExecutorResponse;
use hogql_runner::cli::{validate_query_path, Cli, OutputFormat};
use hogql_runner::config::Config;
use hogql_runner::error::{HogqlError, Result};
use hogql_runner::logging;
use hogql_runner::query::QueryExecutor;
use hogql_runner::render::{render_html, render_table, RenderContext};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    logging::init_stderr_logging();

    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// Runs one query and writes the rendered result.
///
/// Returns whether the query succeeded.
async fn run() -> Result<bool> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let format = cli.parse_output_format().map_err(HogqlError::config)?;
    let refresh = cli.parse_refresh(&config).map_err(HogqlError::config)?;
    let workspace = cli.workspace_root()?;

    let query_file = match &cli.file {
        Some(file) => Some(validate_query_path(&workspace, file)?),
        None => None,
    };

    let executor = QueryExecutor::connect(&cli.credential_sources(&config), Some(&workspace))?;
    let ctx = RenderContext::now();

    let response = match (&query_file, &cli.query) {
        (Some(path), _) => executor.execute_query_from_file(path, refresh).await,
        (None, Some(text)) => executor.execute_query(text, refresh).await,
        (None, None) => return Err(HogqlError::empty_query("No query file or query text given")),
    };

    let output = render(&response, format, &ctx)?;
    write_output(&cli, &output)?;

    if let Some(failure) = response.result.as_failure() {
        eprintln!("{}", failure.message);
    }
    Ok(response.is_success())
}

fn render(response: &ExecutorResponse, format: OutputFormat, ctx: &RenderContext) -> Result<String> {
    match format {
        OutputFormat::Html => Ok(render_html(&response.result, ctx)),
        OutputFormat::Table => Ok(render_table(response)),
        OutputFormat::Json => serde_json::to_string_pretty(response)
            .map_err(|e| HogqlError::formatting(e.to_string())),
    }
}

fn write_output(cli: &Cli, output: &str) -> Result<()> {
    match &cli.output {
        Some(path) => std::fs::write(path, output).map_err(|e| {
            HogqlError::file(format!("Failed to write {}: {e}", path.display()))
        }),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(output.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(|e| HogqlError::file(format!("Failed to write output: {e}")))
        }
    }
}
