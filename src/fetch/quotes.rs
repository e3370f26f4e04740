use std::convert::Infallible;

use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;

use crate::config::{resolve_limit, ConcurrencyConfig};
use crate::fetch::http::{HttpClient, HttpResponse};
use crate::fetch::runner::{failure_message, run_pool, FromFailure, RunSummary};

/// Message used when a response body is not a JSON object with a usable `message`.
pub const INVALID_RESPONSE_FORMAT: &str = "Invalid response format";

/// Per-URL outcome. Serialises as a single-key object: `{"Arnie Quote": ..}` or `{"FAILURE": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum QuoteRecord {
    #[serde(rename = "Arnie Quote")]
    Quote(String),
    #[serde(rename = "FAILURE")]
    Failure(String),
}

impl QuoteRecord {
    pub fn message(&self) -> &str {
        match self {
            QuoteRecord::Quote(text) | QuoteRecord::Failure(text) => text,
        }
    }
}

impl FromFailure for QuoteRecord {
    fn from_failure(message: String) -> Self {
        QuoteRecord::Failure(message)
    }

    fn is_failure(&self) -> bool {
        matches!(self, QuoteRecord::Failure(_))
    }
}

/// Fetches quotes for a list of URLs, keeping at most `concurrency_limit` requests in flight.
pub struct QuoteFetcher<C> {
    client: C,
    concurrency_limit: usize,
}

impl<C: HttpClient> QuoteFetcher<C> {
    /// A zero limit is treated as unset and falls back to the configured ceiling.
    pub fn with_concurrency_limit(client: C, concurrency_limit: usize) -> Self {
        let default_limit = ConcurrencyConfig::from_env().limit;
        Self {
            client,
            concurrency_limit: resolve_limit(Some(concurrency_limit), default_limit),
        }
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// One record per URL, in input order.
    pub async fn fetch_all<S: AsRef<str>>(&self, urls: &[S]) -> Vec<QuoteRecord> {
        self.fetch_with_summary(urls).await.0
    }

    pub async fn fetch_with_summary<S: AsRef<str>>(
        &self,
        urls: &[S],
    ) -> (Vec<QuoteRecord>, RunSummary) {
        fetch_indexed(&self.client, urls, self.concurrency_limit).await
    }
}

/// Fetch every URL with the default concurrency ceiling. Absent input yields
/// an empty result without issuing any request.
pub async fn get_arnie_quotes<C, S>(client: &C, urls: Option<&[S]>) -> Vec<QuoteRecord>
where
    C: HttpClient,
    S: AsRef<str>,
{
    let Some(urls) = urls else {
        return Vec::new();
    };

    let limit = ConcurrencyConfig::from_env().limit;
    fetch_indexed(client, urls, limit).await.0
}

async fn fetch_indexed<C, S>(client: &C, urls: &[S], limit: usize) -> (Vec<QuoteRecord>, RunSummary)
where
    C: HttpClient,
    S: AsRef<str>,
{
    run_pool(
        urls.len(),
        move |index| async move {
            Ok::<_, Infallible>(fetch_quote(client, urls[index].as_ref()).await)
        },
        limit,
    )
    .await
}

async fn fetch_quote<C: HttpClient>(client: &C, url: &str) -> QuoteRecord {
    match client.get(url).await {
        Ok(response) => {
            debug!("GET {} returned status {}", url, response.status);
            record_from_response(&response)
        }
        Err(err) => {
            warn!("GET {} failed: {}", url, err);
            QuoteRecord::Failure(failure_message(&err))
        }
    }
}

/// Map a completed response to a record: status 200 is a quote, anything else a failure.
pub fn record_from_response(response: &HttpResponse) -> QuoteRecord {
    let message = resolve_message(&response.body);
    if response.status == 200 {
        QuoteRecord::Quote(message)
    } else {
        QuoteRecord::Failure(message)
    }
}

/// Extract the display message from a response body, falling back to
/// [`INVALID_RESPONSE_FORMAT`] for bodies that are not JSON objects or carry
/// no usable `message`.
pub fn resolve_message(body: &str) -> String {
    let Ok(Value::Object(object)) = serde_json::from_str::<Value>(body) else {
        return INVALID_RESPONSE_FORMAT.to_string();
    };

    match object.get("message") {
        Some(Value::String(text)) if !text.is_empty() => text.clone(),
        Some(Value::Number(number)) if number.as_f64() != Some(0.0) => number.to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        Some(value @ (Value::Array(_) | Value::Object(_))) => value.to_string(),
        _ => INVALID_RESPONSE_FORMAT.to_string(),
    }
}

/// Read a URL list out of an arbitrary JSON document.
///
/// Anything other than an array is treated as an empty list. Non-string
/// entries keep their position and are rendered as text, so they fail on
/// their own at request time instead of shifting later indices.
pub fn urls_from_json(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(url) => url.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}
