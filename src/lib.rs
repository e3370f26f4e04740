pub mod config;
pub mod error;
pub mod fetch;
pub mod utils;

pub use error::{AppError, Result};
pub use fetch::{
    get_arnie_quotes, run_with_concurrency_limit, HttpClient, HttpResponse, QuoteFetcher,
    QuoteRecord, ReqwestClient,
};
