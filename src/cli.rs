use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "arnie-quotes")]
#[command(about = "Fetch quotes from a list of URLs with a bounded number of requests in flight")]
#[command(version)]
pub struct Cli {
    /// URLs to fetch, in output order
    pub urls: Vec<String>,

    /// Read URLs from the first column of a CSV file (appended after positional URLs)
    #[arg(short, long)]
    pub from_file: Option<PathBuf>,

    /// Read URLs from a JSON array file (appended after positional URLs)
    #[arg(short, long)]
    pub json: Option<PathBuf>,

    /// Maximum requests in flight; 0 or unset uses ARNIE_QUOTES_CONCURRENCY (default 10)
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pub pretty: bool,
}
