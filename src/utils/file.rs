use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{Context, Result};
use crate::fetch::urls_from_json;

/// Read URLs from the first column of a header-less CSV file, skipping blank rows.
pub fn load_urls_from_csv(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut urls = Vec::new();
    for result in reader.records() {
        let record = result.context("Failed to read URL record")?;
        let Some(url) = record.get(0).map(str::trim) else {
            continue;
        };
        if url.is_empty() {
            continue;
        }
        urls.push(url.to_string());
    }

    Ok(urls)
}

/// Read URLs from a JSON document. A top level that is not an array yields no URLs.
pub fn load_urls_from_json(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text)?;
    Ok(urls_from_json(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn reads_first_column_and_skips_blank_rows() {
        let file = write_temp("https://a.test/1,ignored\n\n  https://a.test/2  \nhttps://a.test/3\n");

        let urls = load_urls_from_csv(file.path()).expect("csv loads");

        assert_eq!(
            urls,
            vec!["https://a.test/1", "https://a.test/2", "https://a.test/3"]
        );
    }

    #[test]
    fn json_object_yields_no_urls() {
        let file = write_temp(r#"{"urls": ["https://a.test/1"]}"#);
        let urls = load_urls_from_json(file.path()).expect("json loads");
        assert!(urls.is_empty());
    }

    #[test]
    fn json_array_keeps_order() {
        let file = write_temp(r#"["https://a.test/2", "https://a.test/1"]"#);
        let urls = load_urls_from_json(file.path()).expect("json loads");
        assert_eq!(urls, vec!["https://a.test/2", "https://a.test/1"]);
    }

    #[test]
    fn missing_json_file_reports_io_error() {
        let err = load_urls_from_json("/definitely/not/here.json").expect_err("load should fail");
        assert!(matches!(err, crate::error::AppError::Io(_)), "unexpected error: {err}");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_urls_from_csv("/definitely/not/here.csv").is_err());
    }
}
