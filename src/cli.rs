use analytics::ViewKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Sales-funnel analysis for per-city spreadsheet exports.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file. Defaults to ./leadlens.toml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Also write logs to a daily rolling file in this directory.
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the cities and periods found in a workbook or export.
    Inspect {
        /// A workbook, or a `.json` file written by `export`.
        source: PathBuf,
    },
    /// Print the rows selected for one city.
    Query {
        source: PathBuf,
        #[command(flatten)]
        filters: FilterArgs,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Compute one dashboard view for a selection.
    View {
        source: PathBuf,
        #[command(flatten)]
        filters: FilterArgs,
        /// One of: summary, origin-performance, conversion-by-channel, monthly-trend,
        /// top-channels, sales-efficiency, correlation, scatter, details.
        #[arg(long, default_value = "summary")]
        view: ViewKind,
        #[arg(long)]
        json: bool,
    },
    /// Write the ingested dataset as JSON.
    Export {
        source: PathBuf,
        #[arg(long, short)]
        out: PathBuf,
    },
}

#[derive(Args)]
pub struct FilterArgs {
    /// City (sheet) to analyze.
    #[arg(long)]
    pub city: String,

    /// First period, inclusive (e.g. "jan/25"). Defaults to the earliest period.
    #[arg(long)]
    pub from: Option<String>,

    /// Last period, inclusive. Defaults to the latest period.
    #[arg(long)]
    pub to: Option<String>,

    /// Restrict to these origins. Repeatable; omit for all origins.
    #[arg(long = "origin")]
    pub origins: Vec<String>,
}
