use crate::error::Result;

pub mod http;
pub mod quotes;
pub mod runner;

pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use quotes::{get_arnie_quotes, resolve_message, urls_from_json, QuoteFetcher, QuoteRecord};
pub use runner::{run_pool, run_with_concurrency_limit, FromFailure, PoolState, RunSummary};

pub type FetchResult<T> = Result<T>;
