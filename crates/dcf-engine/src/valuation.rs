//! The DCF run.
//!
//! `run` is a pure function of its three inputs. It either returns a complete
//! [`ValuationResult`] or a single [`ValuationError`]; it never produces a
//! partial result.

use crate::capital::capital_inputs;
use crate::error::{Result, ValuationError};
use crate::extract::{extract_item, lookup_in, parse_value};
use crate::historical::aggregate;
use crate::peers::{implied_values, summarize_peers};
use crate::ratios;
use crate::result::{Diagnostic, FcfSource, ForecastYear, ValuationResult};
use dcf_core::ValuationAssumptions;
use dcf_models::{ComparableSet, LineItem, StatementSet};
use tracing::{info, instrument, warn};

/// Value the company described by `statement_set`.
#[instrument(skip_all)]
pub fn run(
  statement_set: &StatementSet,
  comparable_set: &ComparableSet,
  assumptions: &ValuationAssumptions,
) -> Result<ValuationResult> {
  assumptions.validate()?;

  let ticker = statement_set
    .overview
    .symbol
    .clone()
    .or_else(|| comparable_set.target.ticker.clone())
    .or_else(|| statement_set.income_statement.symbol.clone());
  info!(ticker = ticker.as_deref().unwrap_or("unknown"), "starting valuation");

  for (statement, message) in statement_set.provider_messages() {
    warn!(statement, message, "provider returned a notice instead of data");
  }

  if statement_set.income_statement.is_empty() {
    return Err(ValuationError::Precondition("no income statement reports".to_string()));
  }

  let periods = statement_set.aligned_periods(assumptions.lookback_years);
  if periods.len() < assumptions.min_history_periods {
    return Err(ValuationError::Precondition(format!(
      "{} income statement periods available, {} required",
      periods.len(),
      assumptions.min_history_periods
    )));
  }
  let latest = *periods.first().ok_or_else(|| {
    ValuationError::Precondition("no income statement period could be aligned".to_string())
  })?;
  let latest_fiscal_year = latest.income.fiscal_year();
  let historical = aggregate(statement_set, assumptions.lookback_years);

  let mut diagnostics = Vec::new();

  let balance_sheet = latest.balance_sheet.or_else(|| {
    let fallback = statement_set.balance_sheet.latest();
    if fallback.is_some() {
      warn!("no balance sheet for the latest income period; using the most recent one");
    }
    fallback
  });
  if balance_sheet.is_none() {
    diagnostics.push(Diagnostic::new(
      "balance_sheet",
      "no balance-sheet report; debt, cash and shares outstanding taken as 0",
    ));
  }
  let total_debt = balance_sheet.map_or(0.0, |bs| {
    extract_item(bs, LineItem::ShortTermDebt) + extract_item(bs, LineItem::LongTermDebt)
  });
  let cash = balance_sheet.map_or(0.0, |bs| extract_item(bs, LineItem::CashAndEquivalents));
  let shares_outstanding =
    balance_sheet.map_or(0.0, |bs| extract_item(bs, LineItem::SharesOutstanding));

  let (starting_fcf, starting_fcf_source) = match assumptions.starting_fcf {
    Some(fcf) => (fcf, FcfSource::Override),
    None => {
      let cash_flow = latest.cash_flow.or_else(|| statement_set.cash_flow.latest());
      let operating_cash_flow =
        lookup_in(cash_flow, LineItem::OperatingCashflow).ok_or_else(|| {
          ValuationError::Precondition(
            "no operating cash flow for the latest period and no starting_fcf override".to_string(),
          )
        })?;
      let capex = lookup_in(cash_flow, LineItem::CapitalExpenditures).map_or(0.0, f64::abs);
      (operating_cash_flow - capex, FcfSource::CashFlowStatement)
    }
  };

  let wacc = assumptions.discount_rate;
  let growth = assumptions.fcf_growth_rate;
  let mut fcf = starting_fcf;
  let forecast: Vec<ForecastYear> = (1..=assumptions.forecast_horizon)
    .map(|year| {
      fcf *= 1.0 + growth;
      let discount_factor = 1.0 / (1.0 + wacc).powf(f64::from(year));
      ForecastYear {
        year,
        fiscal_year: latest_fiscal_year.zip(i32::try_from(year).ok()).map(|(y, t)| y + t),
        fcf,
        discount_factor,
        discounted_fcf: fcf * discount_factor,
      }
    })
    .collect();

  let final_year = forecast.last().ok_or_else(|| {
    ValuationError::Configuration("forecast_horizon must be at least 1".to_string())
  })?;
  let terminal_growth = assumptions.terminal_growth_rate;
  let terminal_value = final_year.fcf * (1.0 + terminal_growth) / (wacc - terminal_growth);
  let discounted_terminal_value = terminal_value * final_year.discount_factor;

  let sum_discounted_fcf: f64 = forecast.iter().map(|y| y.discounted_fcf).sum();
  let enterprise_value = sum_discounted_fcf + discounted_terminal_value;
  let equity_value = enterprise_value - total_debt + cash;
  let intrinsic_value_per_share = if shares_outstanding > 0.0 {
    Some(equity_value / shares_outstanding)
  } else {
    warn!("shares outstanding is zero or missing; per-share value unavailable");
    diagnostics.push(Diagnostic::new(
      "intrinsic_value_per_share",
      "shares outstanding is zero or missing",
    ));
    None
  };

  let market_cap = parse_value(statement_set.overview.market_capitalization.as_ref())
    .or_else(|| parse_value(comparable_set.target.market_cap.as_ref()));
  let (capital, capital_diagnostics) =
    capital_inputs(latest.income, balance_sheet, market_cap, assumptions);
  diagnostics.extend(capital_diagnostics);

  let mut peers = summarize_peers(comparable_set, assumptions.max_peers);
  peers.implied = implied_values(
    &peers.multiples,
    historical.ebitda.latest(),
    historical.net_revenue.latest(),
    lookup_in(Some(latest.income), LineItem::NetIncome),
  );

  let (ratios, ratio_diagnostics) = ratios::compute(statement_set);
  diagnostics.extend(ratio_diagnostics);

  info!(
    enterprise_value,
    equity_value,
    ?intrinsic_value_per_share,
    diagnostics = diagnostics.len(),
    "valuation complete"
  );

  Ok(ValuationResult {
    ticker,
    company_name: statement_set.overview.name.clone(),
    latest_period_end: latest.period_end().map(str::to_string),
    latest_fiscal_year,
    starting_fcf,
    starting_fcf_source,
    sum_discounted_fcf,
    terminal_value,
    discounted_terminal_value,
    enterprise_value,
    total_debt,
    cash,
    equity_value,
    shares_outstanding,
    intrinsic_value_per_share,
    forecast,
    capital,
    historical,
    peers,
    ratios,
    assumptions: assumptions.clone(),
    diagnostics,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use dcf_core::test_utils::{assert_currency_eq, assert_some_approx};
  use dcf_models::{FiscalPeriodReport, StatementReports};

  fn statement_set(ocf: &str, capex: &str) -> StatementSet {
    StatementSet {
      income_statement: StatementReports::from_annual(vec![
        FiscalPeriodReport::new("2024-12-31").with_item("totalRevenue", "1000")
      ]),
      balance_sheet: StatementReports::from_annual(vec![FiscalPeriodReport::new("2024-12-31")
        .with_item("shortTermDebt", "20")
        .with_item("longTermDebt", "80")
        .with_item("cashAndCashEquivalentsAtCarryingValue", "50")
        .with_item("commonStockSharesOutstanding", "10")]),
      cash_flow: StatementReports::from_annual(vec![FiscalPeriodReport::new("2024-12-31")
        .with_item("operatingCashflow", ocf)
        .with_item("capitalExpenditures", capex)]),
      ..Default::default()
    }
  }

  fn assumptions(horizon: u32) -> ValuationAssumptions {
    ValuationAssumptions {
      discount_rate: 0.10,
      terminal_growth_rate: 0.02,
      fcf_growth_rate: 0.0,
      forecast_horizon: horizon,
      ..Default::default()
    }
  }

  #[test]
  fn test_flat_fcf_single_year() {
    let result =
      run(&statement_set("150", "-50"), &ComparableSet::default(), &assumptions(1)).unwrap();

    assert_eq!(result.starting_fcf_source, FcfSource::CashFlowStatement);
    assert_currency_eq(result.starting_fcf, 100.0);
    assert_eq!(result.forecast.len(), 1);
    assert_eq!(result.forecast[0].fiscal_year, Some(2025));
    assert_currency_eq(result.forecast[0].discounted_fcf, 100.0 / 1.1);

    let tv = 100.0 * 1.02 / 0.08;
    assert_currency_eq(result.terminal_value, tv);
    assert_currency_eq(result.enterprise_value, (100.0 + tv) / 1.1);
    assert_currency_eq(result.total_debt, 100.0);
    assert_currency_eq(result.equity_value, (100.0 + tv) / 1.1 - 100.0 + 50.0);
    assert_some_approx(result.intrinsic_value_per_share, ((100.0 + tv) / 1.1 - 50.0) / 10.0);
  }

  #[test]
  fn test_starting_fcf_override() {
    let set = StatementSet { cash_flow: StatementReports::default(), ..statement_set("0", "0") };
    let assumptions = ValuationAssumptions { starting_fcf: Some(40.0), ..assumptions(2) };
    let result = run(&set, &ComparableSet::default(), &assumptions).unwrap();
    assert_eq!(result.starting_fcf_source, FcfSource::Override);
    assert_currency_eq(result.forecast[1].fcf, 40.0);
  }

  #[test]
  fn test_missing_cash_flow_is_precondition() {
    let set = StatementSet { cash_flow: StatementReports::default(), ..statement_set("0", "0") };
    let err = run(&set, &ComparableSet::default(), &assumptions(2)).unwrap_err();
    assert!(matches!(err, ValuationError::Precondition(_)));
  }

  #[test]
  fn test_min_history_periods() {
    let assumptions = ValuationAssumptions { min_history_periods: 2, ..assumptions(2) };
    let err = run(&statement_set("1", "0"), &ComparableSet::default(), &assumptions).unwrap_err();
    assert!(err.to_string().contains("1 income statement periods available, 2 required"));
  }

  #[test]
  fn test_invalid_horizon_is_configuration() {
    let err =
      run(&statement_set("1", "0"), &ComparableSet::default(), &assumptions(0)).unwrap_err();
    assert!(matches!(err, ValuationError::Configuration(_)));
  }
}
