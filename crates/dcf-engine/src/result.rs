//! Valuation result document.
//!
//! The struct keeps full precision; rounding happens when it is serialized
//! (see [`crate::rounding`]). Unavailable values serialize as `null` and are
//! explained by an entry in `diagnostics`.

use crate::capital::CapitalInputs;
use crate::historical::HistoricalAggregates;
use crate::peers::PeerSummary;
use crate::ratios::FinancialRatios;
use crate::rounding;
use dcf_core::ValuationAssumptions;
use serde::Serialize;

/// A field that could not be computed, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
  pub field: String,
  pub reason: String,
}

impl Diagnostic {
  pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
    Self { field: field.into(), reason: reason.into() }
  }
}

/// One forecast year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastYear {
  /// 1-based offset from the latest fiscal year
  pub year: u32,
  pub fiscal_year: Option<i32>,
  #[serde(serialize_with = "rounding::currency")]
  pub fcf: f64,
  #[serde(serialize_with = "rounding::rate")]
  pub discount_factor: f64,
  #[serde(serialize_with = "rounding::currency")]
  pub discounted_fcf: f64,
}

/// Origin of the base-year free cash flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FcfSource {
  CashFlowStatement,
  Override,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationResult {
  pub ticker: Option<String>,
  pub company_name: Option<String>,
  pub latest_period_end: Option<String>,
  pub latest_fiscal_year: Option<i32>,

  #[serde(serialize_with = "rounding::currency")]
  pub starting_fcf: f64,
  pub starting_fcf_source: FcfSource,
  pub forecast: Vec<ForecastYear>,
  #[serde(serialize_with = "rounding::currency")]
  pub sum_discounted_fcf: f64,
  #[serde(serialize_with = "rounding::currency")]
  pub terminal_value: f64,
  #[serde(serialize_with = "rounding::currency")]
  pub discounted_terminal_value: f64,
  #[serde(serialize_with = "rounding::currency")]
  pub enterprise_value: f64,
  #[serde(serialize_with = "rounding::currency")]
  pub total_debt: f64,
  #[serde(serialize_with = "rounding::currency")]
  pub cash: f64,
  #[serde(serialize_with = "rounding::currency")]
  pub equity_value: f64,
  #[serde(serialize_with = "rounding::currency")]
  pub shares_outstanding: f64,
  #[serde(serialize_with = "rounding::per_share_opt")]
  pub intrinsic_value_per_share: Option<f64>,

  pub capital: CapitalInputs,
  pub historical: HistoricalAggregates,
  pub peers: PeerSummary,
  pub ratios: FinancialRatios,
  pub assumptions: ValuationAssumptions,
  pub diagnostics: Vec<Diagnostic>,
}

impl ValuationResult {
  /// Pretty-printed JSON document
  pub fn to_json(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(self)
  }

  pub fn diagnostic(&self, field: &str) -> Option<&Diagnostic> {
    self.diagnostics.iter().find(|d| d.field == field)
  }
}
