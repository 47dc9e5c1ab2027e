//! CLI argument definitions for the grid viewer.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "sgrid",
    version,
    about = "Browse CSV and JSON datasets as a paginated, filterable grid",
    long_about = "Browse CSV and JSON datasets as a paginated, filterable grid.\n\n\
                  Supports free-text search, per-column quick filters, advanced\n\
                  field filters, natural-order sorting and persisted column layouts."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show one page of a dataset.
    View(ViewArgs),

    /// Inspect or change which columns a grid shows.
    Columns(ColumnsArgs),
}

/// Dataset and storage options shared by every command.
#[derive(Args)]
pub struct GridArgs {
    /// CSV or JSON file to browse.
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    /// Grid identifier for persisted state (default: the file stem).
    #[arg(long = "grid-id", value_name = "ID")]
    pub grid_id: Option<String>,

    /// Column layout storage file (default: platform data directory).
    #[arg(long = "storage", value_name = "PATH")]
    pub storage: Option<PathBuf>,

    /// Grid settings file (default: platform config directory).
    #[arg(long = "settings", value_name = "PATH")]
    pub settings: Option<PathBuf>,
}

#[derive(Args)]
pub struct ViewArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    /// Free-text search across all columns.
    #[arg(long = "search", value_name = "TERM", conflicts_with_all = ["filter", "quick"])]
    pub search: Option<String>,

    /// Advanced field filter (repeatable).
    #[arg(long = "filter", value_name = "KEY=VALUE", value_parser = parse_pair, conflicts_with = "quick")]
    pub filter: Vec<(String, String)>,

    /// Quick filter on one column (repeatable; values on one column combine).
    #[arg(long = "quick", value_name = "KEY=VALUE", value_parser = parse_pair)]
    pub quick: Vec<(String, String)>,

    /// Page to show (1-based).
    #[arg(long = "page", default_value_t = 1)]
    pub page: u32,

    /// Rows per page (default from settings).
    #[arg(long = "page-size", value_name = "N")]
    pub page_size: Option<u32>,

    /// Sort the page by this column.
    #[arg(long = "sort", value_name = "KEY")]
    pub sort: Option<String>,

    /// Sort ascending instead of descending.
    #[arg(long = "asc", requires = "sort")]
    pub ascending: bool,

    /// Skip the debounce and minimum loading delays.
    #[arg(long = "no-delay")]
    pub no_delay: bool,
}

#[derive(Args)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    #[command(subcommand)]
    pub action: ColumnsAction,
}

#[derive(Subcommand)]
pub enum ColumnsAction {
    /// List columns and whether they are visible.
    List,

    /// Show the given columns.
    Show {
        #[arg(value_name = "KEY", required = true)]
        keys: Vec<String>,
    },

    /// Hide the given columns.
    Hide {
        #[arg(value_name = "KEY", required = true)]
        keys: Vec<String>,
    },

    /// Restore the default column layout.
    Reset,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in `{raw}`"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_split_on_first_equals() {
        assert_eq!(
            parse_pair("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_pair("novalue").is_err());
        assert!(parse_pair("=x").is_err());
    }

    #[test]
    fn search_conflicts_with_filters() {
        let result = Cli::try_parse_from([
            "sgrid", "view", "data.csv", "--search", "acme", "--quick", "city=Oslo",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn view_arguments_parse() {
        let cli = Cli::try_parse_from([
            "sgrid", "view", "data.csv", "--quick", "city=Oslo", "--page", "2", "--sort", "name",
            "--asc",
        ])
        .unwrap();
        let Command::View(args) = cli.command else {
            panic!("expected view command");
        };
        assert_eq!(args.quick, vec![("city".to_string(), "Oslo".to_string())]);
        assert_eq!(args.page, 2);
        assert!(args.ascending);
    }
}
