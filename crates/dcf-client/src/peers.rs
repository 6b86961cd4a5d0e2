//! Peer discovery.
//!
//! Peers are chosen outside the provider API (a curated list, or a language
//! model answering with a JSON array of tickers). Whatever the source, its
//! answer goes through [`parse_peer_list`] before any ticker is fetched.

use async_trait::async_trait;
use dcf_core::{Error, Result};
use serde_json::Value;
use tracing::{debug, info};

const MAX_TICKER_LEN: usize = 10;

/// Market capitalization window peers should fall in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketCapRange {
  /// Lower bound, in currency units
  pub min: f64,
  /// Upper bound, in currency units
  pub max: f64,
}

impl MarketCapRange {
  /// 0.5x to 1.5x of the target's market capitalization
  pub fn around(market_cap: f64) -> Self {
    Self { min: market_cap * 0.5, max: market_cap * 1.5 }
  }
}

/// A source of comparable companies for a target ticker
#[async_trait]
pub trait PeerDiscovery: Send + Sync {
  /// Peer tickers for `ticker`, best match first
  async fn discover_peers(&self, ticker: &str, range: MarketCapRange) -> Result<Vec<String>>;
}

/// A fixed peer list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticPeers {
  tickers: Vec<String>,
}

impl StaticPeers {
  /// Normalizes the tickers the same way [`parse_peer_list`] does
  pub fn new<I, S>(tickers: I) -> Result<Self>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut normalized = Vec::new();
    for ticker in tickers {
      push_ticker(&mut normalized, ticker.as_ref())?;
    }
    Ok(Self { tickers: normalized })
  }

  /// Peer list from a JSON array of tickers
  pub fn parse(text: &str) -> Result<Self> {
    Ok(Self { tickers: parse_peer_list(text)? })
  }

  /// Normalized tickers, in order
  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }
}

#[async_trait]
impl PeerDiscovery for StaticPeers {
  async fn discover_peers(&self, ticker: &str, range: MarketCapRange) -> Result<Vec<String>> {
    let target = ticker.trim().to_ascii_uppercase();
    let peers: Vec<String> = self.tickers.iter().filter(|t| **t != target).cloned().collect();
    info!(ticker = %target, min = range.min, max = range.max, count = peers.len(), "static peers");
    Ok(peers)
  }
}

/// Validate a peer answer: a JSON array of ticker strings.
///
/// Single-quoted strings and a surrounding markdown code fence are tolerated.
/// Tickers are trimmed, upper-cased and deduplicated in order; each must be 1
/// to 10 characters of `A-Z`, `0-9`, `.` or `-`.
pub fn parse_peer_list(text: &str) -> Result<Vec<String>> {
  let cleaned = strip_code_fence(text.trim()).replace('\'', "\"");
  let value: Value = serde_json::from_str(&cleaned)
    .map_err(|e| Error::InvalidResponse(format!("peer list is not JSON: {e}")))?;

  let items = value
    .as_array()
    .ok_or_else(|| Error::InvalidResponse("peer list must be a JSON array".to_string()))?;

  let mut tickers = Vec::with_capacity(items.len());
  for item in items {
    let raw = item.as_str().ok_or_else(|| {
      Error::InvalidResponse(format!("peer list entries must be strings, got {item}"))
    })?;
    push_ticker(&mut tickers, raw)?;
  }
  debug!(?tickers, "parsed peer list");
  Ok(tickers)
}

fn push_ticker(tickers: &mut Vec<String>, raw: &str) -> Result<()> {
  let ticker = raw.trim().to_ascii_uppercase();
  if !is_valid_ticker(&ticker) {
    return Err(Error::InvalidResponse(format!("invalid ticker in peer list: {raw:?}")));
  }
  if !tickers.contains(&ticker) {
    tickers.push(ticker);
  }
  Ok(())
}

fn is_valid_ticker(ticker: &str) -> bool {
  (1..=MAX_TICKER_LEN).contains(&ticker.len())
    && ticker.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-')
}

fn strip_code_fence(text: &str) -> &str {
  let Some(body) = text.strip_prefix("```") else {
    return text;
  };
  // drop the info string ("json") on the opening fence
  let body = body.split_once('\n').map_or("", |(_, rest)| rest);
  body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_market_cap_range() {
    let range = MarketCapRange::around(1_000.0);
    assert_eq!(range, MarketCapRange { min: 500.0, max: 1_500.0 });
  }

  #[test]
  fn test_parse_peer_list() {
    let peers = parse_peer_list(r#"["nio", " RIVN ", "LCID", "nio", "BRK.B"]"#).unwrap();
    assert_eq!(peers, vec!["NIO", "RIVN", "LCID", "BRK.B"]);
  }

  #[test]
  fn test_parse_single_quotes_and_fence() {
    let peers = parse_peer_list("```json\n['GM', 'F']\n```").unwrap();
    assert_eq!(peers, vec!["GM", "F"]);
  }

  #[test]
  fn test_parse_rejects_bad_schema() {
    assert!(matches!(parse_peer_list("GM, F"), Err(Error::InvalidResponse(_))));
    assert!(matches!(parse_peer_list(r#"{"peers": ["GM"]}"#), Err(Error::InvalidResponse(_))));
    assert!(matches!(parse_peer_list(r#"["GM", 7]"#), Err(Error::InvalidResponse(_))));
    assert!(matches!(parse_peer_list(r#"["GM", ""]"#), Err(Error::InvalidResponse(_))));
    assert!(matches!(parse_peer_list(r#"["TOOLONGTICKER"]"#), Err(Error::InvalidResponse(_))));
    assert!(matches!(parse_peer_list(r#"["G M"]"#), Err(Error::InvalidResponse(_))));
  }

  #[test]
  fn test_parse_empty_array() {
    assert!(parse_peer_list("[]").unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_static_peers_skip_target() {
    let peers = StaticPeers::new(["ibm", "msft", "ORCL"]).unwrap();
    let found = peers.discover_peers("IBM", MarketCapRange::around(1.0e11)).await.unwrap();
    assert_eq!(found, vec!["MSFT", "ORCL"]);
  }

  #[test]
  fn test_static_peers_parse() {
    let peers = StaticPeers::parse(r#"["sap"]"#).unwrap();
    assert_eq!(peers.tickers(), ["SAP".to_string()]);
  }
}
