//! Trailing multi-year series derived from a statement set.
//!
//! Series are computed oldest to newest and stored newest first, which is how
//! they are displayed. Period-over-period values (ΔOWC, revenue growth) are
//! always "this period minus the prior, older period".

use crate::extract::{extract_item, lookup_in};
use crate::rounding;
use dcf_models::{AlignedPeriod, FiscalPeriodReport, LineItem, StatementSet};
use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};
use tracing::debug;

/// How a series' values are rounded for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesUnit {
  Currency,
  Rate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
  pub fiscal_year: Option<i32>,
  pub period_end: Option<String>,
  pub value: Option<f64>,
}

/// One metric over the lookback window, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSeries {
  pub unit: SeriesUnit,
  pub points: Vec<SeriesPoint>,
}

impl HistoricalSeries {
  /// Build from values ordered oldest to newest
  fn from_oldest_first(
    unit: SeriesUnit,
    periods: &[AlignedPeriod<'_>],
    values: &[Option<f64>],
  ) -> Self {
    let points = periods
      .iter()
      .zip(values)
      .rev()
      .map(|(period, value)| SeriesPoint {
        fiscal_year: period.income.fiscal_year(),
        period_end: period.period_end().map(str::to_string),
        value: *value,
      })
      .collect();
    Self { unit, points }
  }

  pub fn latest(&self) -> Option<f64> {
    self.points.first().and_then(|p| p.value)
  }

  /// Values newest first
  pub fn values(&self) -> Vec<Option<f64>> {
    self.points.iter().map(|p| p.value).collect()
  }
}

struct RoundedPoint<'a> {
  point: &'a SeriesPoint,
  unit: SeriesUnit,
}

impl Serialize for RoundedPoint<'_> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let dp = match self.unit {
      SeriesUnit::Currency => rounding::CURRENCY_DP,
      SeriesUnit::Rate => rounding::RATE_DP,
    };
    let mut state = serializer.serialize_struct("SeriesPoint", 3)?;
    state.serialize_field("fiscal_year", &self.point.fiscal_year)?;
    state.serialize_field("period_end", &self.point.period_end)?;
    state.serialize_field("value", &self.point.value.and_then(|v| rounding::round_decimal(v, dp)))?;
    state.end()
  }
}

struct RoundedPoints<'a>(&'a HistoricalSeries);

impl Serialize for RoundedPoints<'_> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(self.0.points.len()))?;
    for point in &self.0.points {
      seq.serialize_element(&RoundedPoint { point, unit: self.0.unit })?;
    }
    seq.end()
  }
}

impl Serialize for HistoricalSeries {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("HistoricalSeries", 2)?;
    state.serialize_field("unit", &self.unit)?;
    state.serialize_field("points", &RoundedPoints(self))?;
    state.end()
  }
}

/// Trailing series used by the valuation and echoed in its result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalAggregates {
  pub periods: usize,
  pub net_revenue: HistoricalSeries,
  pub cost_of_revenue: HistoricalSeries,
  pub operating_expenses: HistoricalSeries,
  pub depreciation_and_amortization: HistoricalSeries,
  pub capital_expenditures: HistoricalSeries,
  pub ebit: HistoricalSeries,
  pub ebitda: HistoricalSeries,
  pub operating_working_capital: HistoricalSeries,
  pub change_in_owc: HistoricalSeries,
  pub revenue_growth: HistoricalSeries,
  #[serde(serialize_with = "rounding::rate_opt")]
  pub revenue_cagr: Option<f64>,
}

/// Compound annual growth rate from `start` to `end` over `periods`.
///
/// `None` when `start` is zero, `periods` is not positive, or the result is
/// not a finite number (a sign change between start and end).
pub fn cagr(start: f64, end: f64, periods: f64) -> Option<f64> {
  if start == 0.0 || periods <= 0.0 {
    return None;
  }
  let rate = (end / start).powf(1.0 / periods) - 1.0;
  rate.is_finite().then_some(rate)
}

/// (receivables + inventory + other current assets)
/// − (accounts payable + other current liabilities)
pub fn operating_working_capital(balance_sheet: &FiscalPeriodReport) -> f64 {
  let assets = extract_item(balance_sheet, LineItem::CurrentNetReceivables)
    + extract_item(balance_sheet, LineItem::Inventory)
    + extract_item(balance_sheet, LineItem::OtherCurrentAssets);
  let liabilities = extract_item(balance_sheet, LineItem::CurrentAccountsPayable)
    + extract_item(balance_sheet, LineItem::OtherCurrentLiabilities);
  assets - liabilities
}

/// This-minus-prior for each period; the oldest period has no prior.
fn period_changes(values: &[Option<f64>], change: impl Fn(f64, f64) -> Option<f64>) -> Vec<Option<f64>> {
  values
    .iter()
    .enumerate()
    .map(|(i, current)| {
      let prior = i.checked_sub(1).and_then(|p| values[p]);
      match (*current, prior) {
        (Some(current), Some(prior)) => change(current, prior),
        _ => None,
      }
    })
    .collect()
}

/// CAGR between the oldest and newest available values
pub(crate) fn window_cagr(values: &[Option<f64>]) -> Option<f64> {
  let first = values.iter().position(Option::is_some)?;
  let last = values.iter().rposition(Option::is_some)?;
  cagr(values[first]?, values[last]?, (last - first) as f64)
}

fn column<F>(periods: &[AlignedPeriod<'_>], value: F) -> Vec<Option<f64>>
where
  F: Fn(&AlignedPeriod<'_>) -> Option<f64>,
{
  periods.iter().map(value).collect()
}

pub(crate) fn depreciation(period: &AlignedPeriod<'_>) -> Option<f64> {
  lookup_in(Some(period.income), LineItem::DepreciationAndAmortization)
    .or_else(|| lookup_in(period.cash_flow, LineItem::CashFlowDepreciation))
}

/// Series over the most recent `lookback_years` periods
pub fn aggregate(statement_set: &StatementSet, lookback_years: usize) -> HistoricalAggregates {
  let mut periods = statement_set.aligned_periods(lookback_years);
  periods.reverse();

  let revenue = column(&periods, |p| lookup_in(Some(p.income), LineItem::TotalRevenue));
  let cost_of_revenue = column(&periods, |p| lookup_in(Some(p.income), LineItem::CostOfRevenue));
  let operating_expenses =
    column(&periods, |p| lookup_in(Some(p.income), LineItem::OperatingExpenses));
  let depreciation_and_amortization = column(&periods, depreciation);
  let capital_expenditures =
    column(&periods, |p| lookup_in(p.cash_flow, LineItem::CapitalExpenditures).map(f64::abs));
  let ebit = column(&periods, |p| lookup_in(Some(p.income), LineItem::Ebit));
  let ebitda = column(&periods, |p| {
    lookup_in(Some(p.income), LineItem::Ebitda).or_else(|| {
      let ebit = lookup_in(Some(p.income), LineItem::Ebit)?;
      Some(ebit + depreciation(p)?)
    })
  });
  let owc = column(&periods, |p| p.balance_sheet.map(operating_working_capital));

  let change_in_owc = period_changes(&owc, |current, prior| Some(current - prior));
  let revenue_growth = period_changes(&revenue, |current, prior| {
    (prior != 0.0).then(|| (current - prior) / prior)
  });
  let revenue_cagr = window_cagr(&revenue);

  debug!(periods = periods.len(), ?revenue_cagr, "aggregated historical series");

  let currency = |values: &[Option<f64>]| {
    HistoricalSeries::from_oldest_first(SeriesUnit::Currency, &periods, values)
  };

  HistoricalAggregates {
    periods: periods.len(),
    net_revenue: currency(&revenue),
    cost_of_revenue: currency(&cost_of_revenue),
    operating_expenses: currency(&operating_expenses),
    depreciation_and_amortization: currency(&depreciation_and_amortization),
    capital_expenditures: currency(&capital_expenditures),
    ebit: currency(&ebit),
    ebitda: currency(&ebitda),
    operating_working_capital: currency(&owc),
    change_in_owc: currency(&change_in_owc),
    revenue_growth: HistoricalSeries::from_oldest_first(
      SeriesUnit::Rate,
      &periods,
      &revenue_growth,
    ),
    revenue_cagr,
  }
}
