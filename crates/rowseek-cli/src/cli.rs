//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use rowseek::SortKey;

/// Filter and sort a collection of JSON records.
///
/// Records are read as a JSON array from INPUT, or from stdin when INPUT is
/// omitted or `-`. Flags override the values of a `--config` view file.
#[derive(Debug, Parser)]
#[command(name = "rowseek", version, about, long_about = None)]
pub struct Cli {
    /// JSON file holding an array of records
    pub input: Option<PathBuf>,

    /// Query expression, e.g. "age > 30 and person.lastName == /^c/"
    #[arg(short, long)]
    pub query: Option<String>,

    /// Sort key; repeat for tie-breakers
    #[arg(short, long = "sort", value_name = "PATH[:asc|desc]")]
    pub sort: Vec<SortKey>,

    /// YAML view file with query, sort and formatters
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Print the number of matching records instead of the records
    #[arg(long)]
    pub count: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The input path, with `-` meaning stdin.
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|p| p.as_os_str() != "-")
    }
}

/// Structured output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Csv,
}
