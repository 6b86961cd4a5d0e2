use crate::commands::normalize_ticker;
use crate::config::Config;
use crate::store::{write_json, DataDir};
use anyhow::{Context, Result};
use clap::Args;
use dcf_client::{FundamentalsClient, MarketCapRange, PeerDiscovery, StaticPeers};
use dcf_engine::extract::parse_value;
use dcf_engine::peers::{financial_metrics_document, summarize};
use dcf_models::{ComparableSet, ComparableTarget, PeerEntry, StatementSet};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct FetchArgs {
  /// Ticker to fetch
  pub ticker: String,

  /// Peer tickers (comma-separated)
  #[arg(short, long, value_delimiter = ',')]
  pub peers: Option<Vec<String>>,

  /// File holding a JSON array of peer tickers
  #[arg(long, conflicts_with = "peers")]
  pub discover_from: Option<PathBuf>,

  /// Directory the documents are written to
  #[arg(short, long)]
  pub data_dir: Option<PathBuf>,
}

pub async fn execute(args: FetchArgs, config: &Config) -> Result<()> {
  let ticker = normalize_ticker(&args.ticker);
  let data = DataDir::new(config.data_dir(args.data_dir.as_deref()));
  let peer_source = peer_source(args.peers, args.discover_from.as_deref())?;

  let client =
    FundamentalsClient::new(config.api_config()?).context("Failed to create API client")?;

  info!("Fetching financials for {}", ticker);
  let financials = client
    .fetch_statement_set(&ticker)
    .await
    .with_context(|| format!("Failed to fetch financials for {ticker}"))?;
  write_json(&data.financials(&ticker), &financials)?;

  let Some(peer_source) = peer_source else {
    info!("No peers given; skipping comparable analysis");
    return Ok(());
  };

  let comparables = fetch_comparables(&client, &peer_source, &ticker, financials).await?;
  info!("Fetched {} of the requested peers for {}", comparables.peers.len(), ticker);
  write_json(&data.comparable_analysis(&ticker), &comparables)
}

/// Peers from `--peers`, else from the `--discover-from` file
fn peer_source(peers: Option<Vec<String>>, discover_from: Option<&Path>) -> Result<Option<StaticPeers>> {
  if let Some(peers) = peers {
    return Ok(Some(StaticPeers::new(peers)?));
  }
  match discover_from {
    Some(path) => {
      let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read peer list {}", path.display()))?;
      let peers = StaticPeers::parse(&text)
        .with_context(|| format!("Invalid peer list in {}", path.display()))?;
      Ok(Some(peers))
    }
    None => Ok(None),
  }
}

async fn fetch_comparables(
  client: &FundamentalsClient,
  discovery: &dyn PeerDiscovery,
  ticker: &str,
  financials: StatementSet,
) -> Result<ComparableSet> {
  let market_cap = parse_value(financials.overview.market_capitalization.as_ref()).unwrap_or(0.0);
  let tickers = discovery.discover_peers(ticker, MarketCapRange::around(market_cap)).await?;

  let mut peers = Vec::with_capacity(tickers.len());
  for peer in tickers {
    match client.fetch_statement_set(&peer).await {
      Ok(set) => {
        let entry = peer_entry(&peer, set);
        peers.push((peer, entry));
      }
      Err(e) => warn!(peer = %peer, error = %e, "Skipping peer"),
    }
  }

  Ok(ComparableSet { target: comparable_target(ticker, financials), peers })
}

/// Peer block with its `$M` headline metrics
fn peer_entry(ticker: &str, financials: StatementSet) -> PeerEntry {
  let mut entry =
    PeerEntry { financial_metrics: BTreeMap::new(), overview: financials.overview.clone(), financials };
  entry.financial_metrics = financial_metrics_document(&summarize(ticker, &entry));
  entry
}

fn comparable_target(ticker: &str, financials: StatementSet) -> ComparableTarget {
  let entry = peer_entry(ticker, financials);
  let overview = &entry.overview;
  ComparableTarget {
    ticker: Some(ticker.to_string()),
    industry: overview.industry.clone(),
    sector: overview.sector.clone(),
    market_cap: overview.market_capitalization.clone(),
    financial_metrics: entry.financial_metrics,
    financials: entry.financials,
  }
}
