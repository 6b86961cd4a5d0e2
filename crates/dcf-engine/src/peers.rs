//! Peer comparable summaries.
//!
//! Each peer is reduced to headline market and operating figures from its
//! latest reports. Only the first `max_peers` peers in document order are
//! summarized; no ranking is applied.

use crate::extract::{lookup_in, parse_value};
use crate::rounding;
use dcf_models::{ComparableSet, GlobalQuote, LineItem, PeerEntry};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

const MILLION: f64 = 1_000_000.0;

pub const PRICE_KEY: &str = "Price ($/share)";
pub const MARKET_CAP_KEY: &str = "Market Cap ($M)";
pub const ENTERPRISE_VALUE_KEY: &str = "Enterprise Value ($M)";
pub const SALES_KEY: &str = "Sales ($M)";
pub const EBITDA_KEY: &str = "EBITDA ($M)";
pub const EBIT_KEY: &str = "EBIT ($M)";
pub const EARNINGS_KEY: &str = "Earnings ($M)";

/// Headline figures of one peer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerMetrics {
  pub ticker: String,
  pub name: Option<String>,
  #[serde(serialize_with = "rounding::rate_opt")]
  pub beta: Option<f64>,
  #[serde(serialize_with = "rounding::per_share_opt")]
  pub price_per_share: Option<f64>,
  #[serde(serialize_with = "rounding::currency_opt")]
  pub market_cap: Option<f64>,
  #[serde(serialize_with = "rounding::currency_opt")]
  pub enterprise_value: Option<f64>,
  #[serde(serialize_with = "rounding::currency_opt")]
  pub sales: Option<f64>,
  #[serde(serialize_with = "rounding::currency_opt")]
  pub ebitda: Option<f64>,
  #[serde(serialize_with = "rounding::currency_opt")]
  pub ebit: Option<f64>,
  #[serde(serialize_with = "rounding::currency_opt")]
  pub earnings: Option<f64>,
  #[serde(serialize_with = "rounding::rate_opt")]
  pub tax_rate: Option<f64>,
  #[serde(serialize_with = "rounding::currency_opt")]
  pub market_value_of_equity: Option<f64>,
  /// Approximated as enterprise value less market cap, not a priced debt figure
  #[serde(serialize_with = "rounding::currency_opt")]
  pub market_value_of_debt: Option<f64>,
}

/// Figure from the peer's `financial_metrics` block, scaled back from millions
fn reported_metric(entry: &PeerEntry, key: &str, scale: f64) -> Option<f64> {
  parse_value(entry.financial_metrics.get(key)).map(|v| v * scale)
}

/// Summarize one peer from its latest reports.
///
/// Statement figures win; the `financial_metrics` block fills gaps. The share
/// price comes from the profile, then the stored quote.
pub fn summarize(ticker: &str, entry: &PeerEntry) -> PeerMetrics {
  let profile = entry.profile();
  let income = entry.financials.income_statement.latest();
  let balance_sheet = entry.financials.balance_sheet.latest();

  let market_cap = parse_value(profile.market_capitalization.as_ref())
    .or_else(|| reported_metric(entry, MARKET_CAP_KEY, MILLION));
  let price_per_share = parse_value(profile.price.as_ref())
    .or_else(|| parse_value(entry.financials.quote.as_ref().and_then(GlobalQuote::price)))
    .or_else(|| reported_metric(entry, PRICE_KEY, 1.0));

  let enterprise_value = match (market_cap, balance_sheet) {
    (Some(cap), Some(_)) => {
      let debt = lookup_in(balance_sheet, LineItem::ShortTermDebt).unwrap_or(0.0)
        + lookup_in(balance_sheet, LineItem::LongTermDebt).unwrap_or(0.0);
      let cash = lookup_in(balance_sheet, LineItem::CashAndEquivalents).unwrap_or(0.0);
      Some(cap + debt - cash)
    }
    _ => reported_metric(entry, ENTERPRISE_VALUE_KEY, MILLION),
  };

  let sales = lookup_in(income, LineItem::TotalRevenue)
    .or_else(|| reported_metric(entry, SALES_KEY, MILLION));
  let ebitda =
    lookup_in(income, LineItem::Ebitda).or_else(|| reported_metric(entry, EBITDA_KEY, MILLION));
  let ebit = lookup_in(income, LineItem::Ebit).or_else(|| reported_metric(entry, EBIT_KEY, MILLION));
  let earnings = lookup_in(income, LineItem::NetIncome)
    .or_else(|| reported_metric(entry, EARNINGS_KEY, MILLION));

  let tax_rate = match (
    lookup_in(income, LineItem::IncomeBeforeTax),
    lookup_in(income, LineItem::IncomeTaxExpense),
  ) {
    (Some(ibt), Some(tax)) if ibt != 0.0 => Some(tax / ibt),
    _ => None,
  };

  PeerMetrics {
    ticker: ticker.to_string(),
    name: profile.name.clone(),
    beta: parse_value(profile.beta.as_ref()),
    price_per_share,
    market_cap,
    enterprise_value,
    sales,
    ebitda,
    ebit,
    earnings,
    tax_rate,
    market_value_of_equity: market_cap,
    market_value_of_debt: enterprise_value.zip(market_cap).map(|(ev, cap)| ev - cap),
  }
}

/// Median valuation multiples across the summarized peers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeerMultiples {
  #[serde(serialize_with = "rounding::rate_opt")]
  pub ev_to_ebitda: Option<f64>,
  #[serde(serialize_with = "rounding::rate_opt")]
  pub ev_to_sales: Option<f64>,
  #[serde(serialize_with = "rounding::rate_opt")]
  pub price_to_earnings: Option<f64>,
}

/// Target values implied by the peer median multiples
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImpliedValues {
  #[serde(serialize_with = "rounding::currency_opt")]
  pub enterprise_value_from_ebitda: Option<f64>,
  #[serde(serialize_with = "rounding::currency_opt")]
  pub enterprise_value_from_sales: Option<f64>,
  #[serde(serialize_with = "rounding::currency_opt")]
  pub equity_value_from_earnings: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeerSummary {
  /// Peers present in the comparable document
  pub supplied: usize,
  pub peers: Vec<PeerMetrics>,
  /// Mean of the available peer tax rates; unavailable rates are excluded
  #[serde(serialize_with = "rounding::rate_opt")]
  pub average_tax_rate: Option<f64>,
  pub multiples: PeerMultiples,
  pub implied: ImpliedValues,
}

/// Median of the finite values; `None` for an empty input
pub fn median(values: &[f64]) -> Option<f64> {
  let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
  if sorted.is_empty() {
    return None;
  }
  sorted.sort_by(f64::total_cmp);
  let mid = sorted.len() / 2;
  Some(if sorted.len() % 2 == 0 { (sorted[mid - 1] + sorted[mid]) / 2.0 } else { sorted[mid] })
}

pub fn average(values: &[f64]) -> Option<f64> {
  (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Multiple of `numerator / denominator` for each peer with a positive denominator
fn peer_multiples(
  peers: &[PeerMetrics],
  numerator: fn(&PeerMetrics) -> Option<f64>,
  denominator: fn(&PeerMetrics) -> Option<f64>,
) -> Vec<f64> {
  peers
    .iter()
    .filter_map(|p| match (numerator(p), denominator(p)) {
      (Some(n), Some(d)) if d > 0.0 => Some(n / d),
      _ => None,
    })
    .collect()
}

/// Summarize the first `max_peers` peers in document order
pub fn summarize_peers(comparable_set: &ComparableSet, max_peers: usize) -> PeerSummary {
  let supplied = comparable_set.peers.len();
  let used = comparable_set.leading_peers(max_peers);
  if supplied > used.len() {
    info!(supplied, used = used.len(), "peer set truncated");
  }

  let peers: Vec<PeerMetrics> =
    used.iter().map(|(ticker, entry)| summarize(ticker, entry)).collect();

  let tax_rates: Vec<f64> = peers.iter().filter_map(|p| p.tax_rate).collect();
  let multiples = PeerMultiples {
    ev_to_ebitda: median(&peer_multiples(&peers, |p| p.enterprise_value, |p| p.ebitda)),
    ev_to_sales: median(&peer_multiples(&peers, |p| p.enterprise_value, |p| p.sales)),
    price_to_earnings: median(&peer_multiples(&peers, |p| p.market_cap, |p| p.earnings)),
  };
  debug!(peers = peers.len(), ?multiples, "peer multiples");

  PeerSummary {
    supplied,
    average_tax_rate: average(&tax_rates),
    peers,
    multiples,
    implied: ImpliedValues::default(),
  }
}

/// Apply the peer median multiples to the target's latest figures
pub fn implied_values(
  multiples: &PeerMultiples,
  ebitda: Option<f64>,
  sales: Option<f64>,
  earnings: Option<f64>,
) -> ImpliedValues {
  ImpliedValues {
    enterprise_value_from_ebitda: multiples.ev_to_ebitda.zip(ebitda).map(|(m, v)| m * v),
    enterprise_value_from_sales: multiples.ev_to_sales.zip(sales).map(|(m, v)| m * v),
    equity_value_from_earnings: multiples.price_to_earnings.zip(earnings).map(|(m, v)| m * v),
  }
}

/// `financial_metrics` block of a comparable document, in millions
pub fn financial_metrics_document(metrics: &PeerMetrics) -> BTreeMap<String, Value> {
  let millions = |v: Option<f64>| -> Value {
    v.and_then(|v| rounding::round_f64(v / MILLION, 2)).map_or(Value::Null, Value::from)
  };
  let mut doc = BTreeMap::new();
  doc.insert(
    PRICE_KEY.to_string(),
    metrics.price_per_share.and_then(|v| rounding::round_f64(v, 2)).map_or(Value::Null, Value::from),
  );
  doc.insert(MARKET_CAP_KEY.to_string(), millions(metrics.market_cap));
  doc.insert(ENTERPRISE_VALUE_KEY.to_string(), millions(metrics.enterprise_value));
  doc.insert(SALES_KEY.to_string(), millions(metrics.sales));
  doc.insert(EBITDA_KEY.to_string(), millions(metrics.ebitda));
  doc.insert(EBIT_KEY.to_string(), millions(metrics.ebit));
  doc.insert(EARNINGS_KEY.to_string(), millions(metrics.earnings));
  doc
}
