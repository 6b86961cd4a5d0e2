//! Operating projection from historical margins.
//!
//! Revenue grows at its historical CAGR; EBIT, D&A, capex and ΔOWC are
//! projected as average historical shares of revenue. Industry benchmarks,
//! when supplied, cap each driver from above.

use crate::error::{Result, ValuationError};
use crate::extract::{extract_item, lookup_in};
use crate::historical::{depreciation, window_cagr};
use crate::peers::average;
use crate::result::Diagnostic;
use crate::rounding;
use dcf_models::{FiscalPeriodReport, LineItem, StatementSet};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

pub const MIN_PROJECTION_HISTORY: usize = 3;
pub const MAX_PROJECTION_HISTORY: usize = 5;

/// Industry benchmark caps. Accepts fractions (`0.08`) or percent strings
/// (`"8%"`), under either the snake_case names or the benchmark report labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkCaps {
  #[serde(default, alias = "Revenue Growth Cap", deserialize_with = "rate_or_percent")]
  pub revenue_growth: Option<f64>,
  #[serde(default, alias = "EBIT Margin", deserialize_with = "rate_or_percent")]
  pub ebit_margin: Option<f64>,
  #[serde(default, alias = "D&A Margin", deserialize_with = "rate_or_percent")]
  pub depreciation_margin: Option<f64>,
  #[serde(default, alias = "Capex Margin", deserialize_with = "rate_or_percent")]
  pub capex_margin: Option<f64>,
  #[serde(default, alias = "ΔOWC Margin", deserialize_with = "rate_or_percent")]
  pub owc_change_margin: Option<f64>,
  #[serde(default, alias = "Sources", skip_serializing_if = "Option::is_none")]
  pub sources: Option<String>,
}

fn rate_or_percent<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<Value>::deserialize(deserializer)? {
    None | Some(Value::Null) => Ok(None),
    Some(Value::Number(n)) => Ok(n.as_f64()),
    Some(Value::String(s)) => {
      let text = s.trim();
      let parsed = match text.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f64>().map(|v| v / 100.0),
        None => text.parse::<f64>(),
      };
      parsed.map(Some).map_err(|_| D::Error::custom(format!("invalid rate {s:?}")))
    }
    Some(other) => Err(D::Error::custom(format!("expected a rate, found {other}"))),
  }
}

/// Drivers of the projection after caps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionDrivers {
  pub historical_years: usize,
  #[serde(serialize_with = "rounding::rate")]
  pub revenue_growth: f64,
  #[serde(serialize_with = "rounding::rate")]
  pub ebit_margin: f64,
  #[serde(serialize_with = "rounding::rate")]
  pub depreciation_margin: f64,
  #[serde(serialize_with = "rounding::rate")]
  pub capex_margin: f64,
  #[serde(serialize_with = "rounding::rate")]
  pub owc_change_margin: f64,
  /// Drivers reduced to their benchmark cap
  pub capped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedYear {
  pub year: u32,
  #[serde(serialize_with = "rounding::currency")]
  pub revenue: f64,
  #[serde(serialize_with = "rounding::currency")]
  pub ebit: f64,
  #[serde(serialize_with = "rounding::currency")]
  pub depreciation_and_amortization: f64,
  #[serde(serialize_with = "rounding::currency")]
  pub capital_expenditures: f64,
  #[serde(serialize_with = "rounding::currency")]
  pub change_in_owc: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
  pub drivers: ProjectionDrivers,
  pub years: Vec<ProjectedYear>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub benchmark_sources: Option<String>,
  pub diagnostics: Vec<Diagnostic>,
}

/// (current assets − cash) − (current liabilities − current debt)
fn non_cash_working_capital(balance_sheet: &FiscalPeriodReport) -> f64 {
  (extract_item(balance_sheet, LineItem::TotalCurrentAssets)
    - extract_item(balance_sheet, LineItem::CashAndEquivalents))
    - (extract_item(balance_sheet, LineItem::TotalCurrentLiabilities)
      - extract_item(balance_sheet, LineItem::CurrentDebt))
}

/// Average of `values`; 0 with a diagnostic when none are available
fn average_margin(name: &str, values: &[f64], diagnostics: &mut Vec<Diagnostic>) -> f64 {
  average(values).unwrap_or_else(|| {
    diagnostics.push(Diagnostic::new(
      format!("projection.{name}"),
      "no period with both the line item and revenue; using 0",
    ));
    0.0
  })
}

fn apply_cap(name: &str, value: f64, cap: Option<f64>, capped: &mut Vec<String>) -> f64 {
  match cap {
    Some(cap) if cap < value => {
      capped.push(name.to_string());
      cap
    }
    _ => value,
  }
}

/// Project `years` years of operating figures from up to five years of history.
#[instrument(skip(statement_set, caps))]
pub fn project(statement_set: &StatementSet, years: u32, caps: &BenchmarkCaps) -> Result<Projection> {
  let mut periods = statement_set.aligned_periods(MAX_PROJECTION_HISTORY);
  if periods.len() < MIN_PROJECTION_HISTORY {
    return Err(ValuationError::Precondition(format!(
      "projection needs at least {MIN_PROJECTION_HISTORY} years of income statements, found {}",
      periods.len()
    )));
  }
  periods.reverse();

  let revenues: Vec<Option<f64>> =
    periods.iter().map(|p| lookup_in(Some(p.income), LineItem::TotalRevenue)).collect();
  let base_revenue = revenues.last().copied().flatten().ok_or_else(|| {
    ValuationError::Precondition("latest period has no revenue to project from".to_string())
  })?;
  let revenue_growth = window_cagr(&revenues).ok_or_else(|| {
    ValuationError::Precondition("revenue growth cannot be computed from history".to_string())
  })?;

  let mut ebit_margins = Vec::new();
  let mut depreciation_margins = Vec::new();
  let mut capex_margins = Vec::new();
  let mut owc_change_margins = Vec::new();

  for (i, period) in periods.iter().enumerate() {
    let revenue = match revenues[i] {
      Some(r) if r != 0.0 => r,
      _ => continue,
    };
    if let Some(ebit) = lookup_in(Some(period.income), LineItem::Ebit) {
      ebit_margins.push(ebit / revenue);
    }
    if let Some(da) = depreciation(period) {
      depreciation_margins.push(da / revenue);
    }
    if let Some(capex) = lookup_in(period.cash_flow, LineItem::CapitalExpenditures) {
      capex_margins.push(capex.abs() / revenue);
    }
    let prior = i.checked_sub(1).and_then(|p| periods[p].balance_sheet);
    if let (Some(current), Some(prior)) = (period.balance_sheet, prior) {
      let change = non_cash_working_capital(current) - non_cash_working_capital(prior);
      owc_change_margins.push(change / revenue);
    }
  }

  let mut diagnostics = Vec::new();
  let ebit_margin = average_margin("ebit_margin", &ebit_margins, &mut diagnostics);
  let depreciation_margin =
    average_margin("depreciation_margin", &depreciation_margins, &mut diagnostics);
  let capex_margin = average_margin("capex_margin", &capex_margins, &mut diagnostics);
  let owc_change_margin =
    average_margin("owc_change_margin", &owc_change_margins, &mut diagnostics);

  let mut capped = Vec::new();
  let drivers = ProjectionDrivers {
    historical_years: periods.len(),
    revenue_growth: apply_cap("revenue_growth", revenue_growth, caps.revenue_growth, &mut capped),
    ebit_margin: apply_cap("ebit_margin", ebit_margin, caps.ebit_margin, &mut capped),
    depreciation_margin: apply_cap(
      "depreciation_margin",
      depreciation_margin,
      caps.depreciation_margin,
      &mut capped,
    ),
    capex_margin: apply_cap("capex_margin", capex_margin, caps.capex_margin, &mut capped),
    owc_change_margin: apply_cap(
      "owc_change_margin",
      owc_change_margin,
      caps.owc_change_margin,
      &mut capped,
    ),
    capped,
  };
  debug!(?drivers, "projection drivers");

  let mut revenue = base_revenue;
  let years = (1..=years)
    .map(|year| {
      revenue *= 1.0 + drivers.revenue_growth;
      ProjectedYear {
        year,
        revenue,
        ebit: revenue * drivers.ebit_margin,
        depreciation_and_amortization: revenue * drivers.depreciation_margin,
        capital_expenditures: revenue * drivers.capex_margin,
        change_in_owc: revenue * drivers.owc_change_margin,
      }
    })
    .collect();

  Ok(Projection { drivers, years, benchmark_sources: caps.sources.clone(), diagnostics })
}

#[cfg(test)]
mod tests {
  use super::*;
  use dcf_core::test_utils::{assert_currency_eq, assert_rate_eq};
  use dcf_models::StatementReports;
  use serde_json::json;

  fn history(revenues: &[(&str, f64)]) -> StatementSet {
    let income = revenues
      .iter()
      .map(|(date, revenue)| {
        FiscalPeriodReport::new(*date)
          .with_item("totalRevenue", revenue.to_string())
          .with_item("operatingIncome", (revenue * 0.2).to_string())
      })
      .collect();
    let cash_flow = revenues
      .iter()
      .map(|(date, revenue)| {
        FiscalPeriodReport::new(*date)
          .with_item("depreciationDepletionAndAmortization", (revenue * 0.05).to_string())
          .with_item("capitalExpenditures", (-revenue * 0.1).to_string())
      })
      .collect();
    let balance = revenues
      .iter()
      .enumerate()
      .map(|(i, (date, _))| {
        // newest first: current assets shrink by 10 each year back
        FiscalPeriodReport::new(*date)
          .with_item("totalCurrentAssets", (500.0 - 10.0 * i as f64).to_string())
          .with_item("cashAndCashEquivalentsAtCarryingValue", "100")
          .with_item("totalCurrentLiabilities", "200")
          .with_item("currentDebt", "50")
      })
      .collect();
    StatementSet {
      income_statement: StatementReports::from_annual(income),
      cash_flow: StatementReports::from_annual(cash_flow),
      balance_sheet: StatementReports::from_annual(balance),
      ..Default::default()
    }
  }

  #[test]
  fn test_requires_three_years() {
    let set = history(&[("2024-12-31", 110.0), ("2023-12-31", 100.0)]);
    let err = project(&set, 5, &BenchmarkCaps::default()).unwrap_err();
    assert!(matches!(err, ValuationError::Precondition(_)));
  }

  #[test]
  fn test_projection_from_margins() {
    let set = history(&[("2024-12-31", 121.0), ("2023-12-31", 110.0), ("2022-12-31", 100.0)]);
    let projection = project(&set, 2, &BenchmarkCaps::default()).unwrap();

    let drivers = &projection.drivers;
    assert_eq!(drivers.historical_years, 3);
    assert_rate_eq(drivers.revenue_growth, 0.1);
    assert_rate_eq(drivers.ebit_margin, 0.2);
    assert_rate_eq(drivers.depreciation_margin, 0.05);
    assert_rate_eq(drivers.capex_margin, 0.1);
    // working capital rises 10 a year
    assert_rate_eq(drivers.owc_change_margin, (10.0 / 110.0 + 10.0 / 121.0) / 2.0);
    assert!(drivers.capped.is_empty());

    assert_eq!(projection.years.len(), 2);
    assert_currency_eq(projection.years[0].revenue, 133.1);
    assert_currency_eq(projection.years[1].revenue, 146.41);
    assert_currency_eq(projection.years[1].ebit, 146.41 * 0.2);
  }

  #[test]
  fn test_benchmark_caps() {
    let set = history(&[("2024-12-31", 121.0), ("2023-12-31", 110.0), ("2022-12-31", 100.0)]);
    let caps: BenchmarkCaps = serde_json::from_value(json!({
      "Revenue Growth Cap": "6%",
      "EBIT Margin": 0.5,
      "D&A Margin": "4 %",
      "Sources": "Damodaran"
    }))
    .unwrap();

    let projection = project(&set, 1, &caps).unwrap();
    assert_rate_eq(projection.drivers.revenue_growth, 0.06);
    assert_rate_eq(projection.drivers.ebit_margin, 0.2);
    assert_rate_eq(projection.drivers.depreciation_margin, 0.04);
    assert_eq!(projection.drivers.capped, vec!["revenue_growth", "depreciation_margin"]);
    assert_eq!(projection.benchmark_sources.as_deref(), Some("Damodaran"));
  }

  #[test]
  fn test_rejects_malformed_cap() {
    let result: std::result::Result<BenchmarkCaps, _> =
      serde_json::from_value(json!({"EBIT Margin": "lots"}));
    assert!(result.is_err());
  }
}
