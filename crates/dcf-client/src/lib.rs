//! # dcf-client
//!
//! Fetches the fundamentals documents a valuation run needs from the
//! AlphaVantage API.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dcf_client::FundamentalsClient;
//! use dcf_core::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let config = Config::from_env()?;
//!   let client = FundamentalsClient::new(config)?;
//!
//!   let statements = client.fetch_statement_set("IBM").await?;
//!   println!("{} annual income reports", statements.income_statement.len());
//!
//!   Ok(())
//! }
//! ```
//!
//! ## Rate Limiting
//!
//! Every endpoint call waits on a shared `governor` quota of
//! `Config::rate_limit` requests per minute.
//!
//! ## Error Handling
//!
//! All methods return `Result<T, dcf_core::Error>`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod endpoints;
pub mod peers;
pub mod transport;

pub use client::FundamentalsClient;
pub use dcf_core::{Config, Error, Result};
pub use endpoints::fundamentals::FundamentalsEndpoints;
pub use peers::{parse_peer_list, MarketCapRange, PeerDiscovery, StaticPeers};

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_client_creation() {
    let config = Config::default_with_key("test_key".to_string());
    let client = FundamentalsClient::new(config).unwrap();
    assert_eq!(client.base_url(), dcf_core::ALPHA_VANTAGE_BASE_URL);
  }
}
