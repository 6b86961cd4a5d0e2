pub mod fetch;
pub mod project;
pub mod ratios;
pub mod value;

/// Tickers are stored and looked up upper-cased
pub fn normalize_ticker(ticker: &str) -> String {
  ticker.trim().to_ascii_uppercase()
}
