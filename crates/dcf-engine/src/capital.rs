//! Capital-cost inputs: effective tax rate, cost of debt, size premium.

use crate::extract::{extract_item, lookup_item};
use crate::result::Diagnostic;
use crate::rounding;
use dcf_core::{SizePremiumBracket, ValuationAssumptions};
use dcf_models::{FiscalPeriodReport, LineItem};
use serde::Serialize;
use tracing::warn;

/// Effective tax rate of one income-statement period.
///
/// `None` when either input cannot be parsed. A loss-making or break-even
/// period has a rate of zero.
pub fn corporate_tax_rate(income: &FiscalPeriodReport) -> Option<f64> {
  let income_before_tax = lookup_item(income, LineItem::IncomeBeforeTax)?;
  let tax_expense = lookup_item(income, LineItem::IncomeTaxExpense)?;
  if income_before_tax <= 0.0 {
    return Some(0.0);
  }
  Some(tax_expense / income_before_tax)
}

/// Interest expense over long-term debt. `None` without a usable debt figure.
pub fn cost_of_debt(income: &FiscalPeriodReport, balance_sheet: &FiscalPeriodReport) -> Option<f64> {
  let long_term_debt = lookup_item(balance_sheet, LineItem::LongTermDebt)?;
  if long_term_debt == 0.0 {
    return None;
  }
  Some(extract_item(income, LineItem::InterestExpense) / long_term_debt)
}

pub fn after_tax_cost_of_debt(cost_of_debt: Option<f64>, tax_rate: Option<f64>) -> Option<f64> {
  Some(cost_of_debt? * (1.0 - tax_rate?))
}

/// Outcome of the size-premium lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizePremium {
  #[serde(serialize_with = "rounding::rate")]
  pub premium: f64,
  /// False when no bracket covered the market cap (premium defaulted to 0)
  pub matched: bool,
  #[serde(serialize_with = "rounding::currency_opt")]
  pub market_cap: Option<f64>,
  pub bracket: Option<SizePremiumBracket>,
}

/// Premium of the first bracket containing `market_cap`.
///
/// Brackets are searched in table order. Without a market cap or a matching
/// bracket the premium is 0.0 and `matched` is false.
pub fn size_premium(market_cap: Option<f64>, brackets: &[SizePremiumBracket]) -> SizePremium {
  let bracket = market_cap.and_then(|cap| brackets.iter().find(|b| b.contains(cap)));
  match bracket {
    Some(bracket) => SizePremium {
      premium: bracket.premium,
      matched: true,
      market_cap,
      bracket: Some(bracket.clone()),
    },
    None => {
      warn!(?market_cap, "no size-premium bracket matched; using 0.0");
      SizePremium { premium: 0.0, matched: false, market_cap, bracket: None }
    }
  }
}

/// Where the tax rate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRateSource {
  IncomeStatement,
  Override,
  Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapitalInputs {
  #[serde(serialize_with = "rounding::rate_opt")]
  pub tax_rate: Option<f64>,
  pub tax_rate_source: TaxRateSource,
  #[serde(serialize_with = "rounding::rate_opt")]
  pub cost_of_debt: Option<f64>,
  #[serde(serialize_with = "rounding::rate_opt")]
  pub after_tax_cost_of_debt: Option<f64>,
  pub size_premium: SizePremium,
}

/// Capital inputs for the latest period, with diagnostics for anything
/// that could not be computed.
pub fn capital_inputs(
  income: &FiscalPeriodReport,
  balance_sheet: Option<&FiscalPeriodReport>,
  market_cap: Option<f64>,
  assumptions: &ValuationAssumptions,
) -> (CapitalInputs, Vec<Diagnostic>) {
  let mut diagnostics = Vec::new();

  let (tax_rate, tax_rate_source) = match assumptions.tax_rate_override {
    Some(rate) => (Some(rate), TaxRateSource::Override),
    None => match corporate_tax_rate(income) {
      Some(rate) => (Some(rate), TaxRateSource::IncomeStatement),
      None => {
        diagnostics.push(Diagnostic::new(
          "capital.tax_rate",
          "income before tax or income tax expense is missing",
        ));
        (None, TaxRateSource::Unavailable)
      }
    },
  };

  let cost_of_debt = balance_sheet.and_then(|bs| cost_of_debt(income, bs));
  if cost_of_debt.is_none() {
    diagnostics.push(Diagnostic::new("capital.cost_of_debt", "long-term debt is missing or zero"));
  }
  let after_tax_cost_of_debt = after_tax_cost_of_debt(cost_of_debt, tax_rate);
  if after_tax_cost_of_debt.is_none() {
    diagnostics.push(Diagnostic::new(
      "capital.after_tax_cost_of_debt",
      "cost of debt or tax rate is unavailable",
    ));
  }

  let size_premium = size_premium(market_cap, &assumptions.size_premium_brackets);
  if !size_premium.matched {
    let reason = match market_cap {
      Some(_) => "market capitalization outside every size-premium bracket; premium set to 0",
      None => "market capitalization unavailable; premium set to 0",
    };
    diagnostics.push(Diagnostic::new("capital.size_premium", reason));
  }

  (
    CapitalInputs { tax_rate, tax_rate_source, cost_of_debt, after_tax_cost_of_debt, size_premium },
    diagnostics,
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use dcf_core::assumptions::default_size_premium_brackets;
  use dcf_core::test_utils::{assert_rate_eq, assert_some_approx};

  fn income(ibt: &str, tax: &str) -> FiscalPeriodReport {
    FiscalPeriodReport::new("2024-12-31")
      .with_item("incomeBeforeTax", ibt)
      .with_item("incomeTaxExpense", tax)
      .with_item("interestExpense", "50")
  }

  #[test]
  fn test_tax_rate_of_loss_period_is_zero() {
    assert_eq!(corporate_tax_rate(&income("-100", "10")), Some(0.0));
    assert_eq!(corporate_tax_rate(&income("0", "10")), Some(0.0));
  }

  #[test]
  fn test_tax_rate_unavailable_when_unparsable() {
    assert_eq!(corporate_tax_rate(&income("N/A", "10")), None);
    assert_eq!(corporate_tax_rate(&income("100", "--")), None);
  }

  #[test]
  fn test_tax_rate_profitable_period() {
    assert_some_approx(corporate_tax_rate(&income("1,000", "210")), 0.21);
  }

  #[test]
  fn test_cost_of_debt() {
    let bs = FiscalPeriodReport::new("2024-12-31").with_item("longTermDebt", "1000");
    assert_some_approx(cost_of_debt(&income("100", "21"), &bs), 0.05);

    let zero = FiscalPeriodReport::new("2024-12-31").with_item("longTermDebt", "0");
    assert_eq!(cost_of_debt(&income("100", "21"), &zero), None);

    assert_some_approx(after_tax_cost_of_debt(Some(0.05), Some(0.21)), 0.0395);
    assert_eq!(after_tax_cost_of_debt(Some(0.05), None), None);
  }

  #[test]
  fn test_size_premium_brackets() {
    let table = default_size_premium_brackets();

    let mega = size_premium(Some(3.0e12), &table);
    assert!(mega.matched);
    assert_rate_eq(mega.premium, 0.0);

    let mid = size_premium(Some(5.0e9), &table);
    assert!(mid.matched);
    assert_rate_eq(mid.premium, 0.0120);

    // lower bound inclusive, upper exclusive
    let edge = size_premium(Some(51_900_000_000.0), &table);
    assert_rate_eq(edge.premium, 0.0020);
  }

  #[test]
  fn test_size_premium_no_match_is_flagged() {
    let table = vec![SizePremiumBracket::new(1.0e9, None, 0.01)];
    let small = size_premium(Some(5.0e8), &table);
    assert!(!small.matched);
    assert_eq!(small.premium, 0.0);
    assert!(small.bracket.is_none());

    let unknown = size_premium(None, &table);
    assert!(!unknown.matched);
  }

  #[test]
  fn test_capital_inputs_override_and_diagnostics() {
    let assumptions = ValuationAssumptions { tax_rate_override: Some(0.25), ..Default::default() };
    let (inputs, diagnostics) = capital_inputs(&income("N/A", "N/A"), None, None, &assumptions);

    assert_eq!(inputs.tax_rate, Some(0.25));
    assert_eq!(inputs.tax_rate_source, TaxRateSource::Override);
    assert_eq!(inputs.cost_of_debt, None);
    let fields: Vec<&str> = diagnostics.iter().map(|d| d.field.as_str()).collect();
    assert_eq!(
      fields,
      vec!["capital.cost_of_debt", "capital.after_tax_cost_of_debt", "capital.size_premium"]
    );
  }
}
