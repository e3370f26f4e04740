mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use arnie_quotes::utils::{load_urls_from_csv, load_urls_from_json};
use arnie_quotes::{QuoteFetcher, ReqwestClient};

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let urls = collect_urls(&cli)?;

    let fetcher = build_fetcher(&cli);

    info!(
        "Fetching {} URLs with up to {} in flight",
        urls.len(),
        fetcher.concurrency_limit()
    );
    let (records, summary) = fetcher.fetch_with_summary(&urls).await;
    info!(
        "Finished: {} quotes, {} failures",
        summary.succeeded, summary.failed
    );

    let output = if cli.pretty {
        serde_json::to_string_pretty(&records)
    } else {
        serde_json::to_string(&records)
    }
    .context("Failed to serialise results")?;

    println!("{}", output);
    Ok(())
}

// The fetcher owns limit resolution: a missing or zero flag means "use the configured ceiling".
fn build_fetcher(cli: &Cli) -> QuoteFetcher<ReqwestClient> {
    QuoteFetcher::with_concurrency_limit(ReqwestClient::new(), cli.concurrency.unwrap_or(0))
}

fn collect_urls(cli: &Cli) -> Result<Vec<String>> {
    let mut urls = cli.urls.clone();

    if let Some(path) = &cli.from_file {
        let loaded = load_urls_from_csv(path)
            .with_context(|| format!("Failed to load URLs from {}", path.display()))?;
        urls.extend(loaded);
    }

    if let Some(path) = &cli.json {
        let loaded = load_urls_from_json(path)
            .with_context(|| format!("Failed to load URLs from {}", path.display()))?;
        urls.extend(loaded);
    }

    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arnie_quotes::config::ConcurrencyConfig;
    use std::ffi::OsString;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn merges_positional_csv_and_json_sources_in_order() {
        let csv = write_temp("https://a.test/csv\n");
        let json = write_temp(r#"["https://a.test/json"]"#);

        let args: Vec<OsString> = vec![
            "arnie-quotes".into(),
            "https://a.test/arg".into(),
            "--from-file".into(),
            csv.path().into(),
            "--json".into(),
            json.path().into(),
        ];
        let cli = Cli::try_parse_from(args).expect("both file flags are accepted together");

        let urls = collect_urls(&cli).expect("urls load");
        assert_eq!(
            urls,
            vec!["https://a.test/arg", "https://a.test/csv", "https://a.test/json"]
        );
    }

    #[test]
    fn concurrency_flag_is_passed_through_once() {
        let cli = Cli::try_parse_from(["arnie-quotes", "--concurrency", "3"]).expect("parses");
        assert_eq!(build_fetcher(&cli).concurrency_limit(), 3);
    }

    #[test]
    fn zero_or_missing_concurrency_uses_configured_ceiling() {
        let configured = ConcurrencyConfig::from_env().limit;

        let zero = Cli::try_parse_from(["arnie-quotes", "--concurrency", "0"]).expect("parses");
        let missing = Cli::try_parse_from(["arnie-quotes"]).expect("parses");

        assert_eq!(build_fetcher(&zero).concurrency_limit(), configured);
        assert_eq!(build_fetcher(&missing).concurrency_limit(), configured);
    }
}
