pub mod file;

pub use file::{load_urls_from_csv, load_urls_from_json};
