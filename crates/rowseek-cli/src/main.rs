//! `rowseek` - filter and sort JSON records from the command line.

mod cli;
mod config;
mod logging;
mod output;

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{bail, Context};
use clap::Parser;
use rowseek::TableView;
use serde_json::Value;

use crate::cli::Cli;
use crate::config::ViewConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    run(&cli, &mut io::stdout().lock())
}

fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => ViewConfig::load(path)?,
        None => ViewConfig::default(),
    };
    let records = read_records(cli.input_path().map(|p| p.as_path()))?;
    let view = build_view(cli, &config, records);

    if cli.count {
        writeln!(out, "{}", view.count()?)?;
        return Ok(());
    }

    let rows = view.rows()?;
    tracing::info!(rows = rows.len(), "writing results");
    let text = output::serialize(&rows, cli.format)?;
    out.write_all(text.as_bytes())?;
    Ok(())
}

/// Combines the view file with the command line. Flags win: `--query`
/// replaces the file's query and any `--sort` replaces the file's sort.
fn build_view(cli: &Cli, config: &ViewConfig, records: Vec<Value>) -> TableView {
    let sort = if cli.sort.is_empty() {
        config.sort.clone()
    } else {
        cli.sort.clone()
    };
    let query = cli
        .query
        .as_deref()
        .or(config.query.as_deref())
        .unwrap_or_default();

    let mut view = TableView::new(records)
        .with_column_formatters(config.column_formatters())
        .with_value_formatters(config.query_value_formatters())
        .with_sort(sort);
    view.set_query(query);
    view
}

fn read_records(path: Option<&Path>) -> anyhow::Result<Vec<Value>> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading records from {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading records from stdin")?;
            text
        }
    };
    parse_records(&text)
}

fn parse_records(text: &str) -> anyhow::Result<Vec<Value>> {
    let value: Value = serde_json::from_str(text).context("records are not valid JSON")?;
    match value {
        Value::Array(records) => Ok(records),
        other => bail!(
            "expected a JSON array of records, got {}",
            match other {
                Value::Object(_) => "an object",
                Value::Null => "null",
                _ => "a scalar",
            }
        ),
    }
}
