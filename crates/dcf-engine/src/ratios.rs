//! Financial ratios of the latest fiscal period.

use crate::extract::{lookup_in, parse_value};
use crate::result::Diagnostic;
use crate::rounding;
use dcf_models::{LineItem, StatementSet};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancialRatios {
  #[serde(serialize_with = "rounding::rate_opt")]
  pub current_ratio: Option<f64>,
  #[serde(serialize_with = "rounding::rate_opt")]
  pub quick_ratio: Option<f64>,
  #[serde(serialize_with = "rounding::rate_opt")]
  pub debt_to_equity: Option<f64>,
  #[serde(serialize_with = "rounding::rate_opt")]
  pub liabilities_to_assets: Option<f64>,
  #[serde(serialize_with = "rounding::rate_opt")]
  pub interest_coverage: Option<f64>,
  #[serde(serialize_with = "rounding::rate_opt")]
  pub net_margin: Option<f64>,
  #[serde(serialize_with = "rounding::rate_opt")]
  pub return_on_equity: Option<f64>,
  #[serde(serialize_with = "rounding::rate_opt")]
  pub return_on_assets: Option<f64>,
  #[serde(serialize_with = "rounding::rate_opt")]
  pub asset_turnover: Option<f64>,
  #[serde(serialize_with = "rounding::currency_opt")]
  pub free_cash_flow: Option<f64>,
  #[serde(serialize_with = "rounding::rate_opt")]
  pub ev_to_ebitda: Option<f64>,
  #[serde(serialize_with = "rounding::rate_opt")]
  pub price_to_earnings: Option<f64>,
}

/// Collects ratios, noting each one whose inputs were unusable
struct RatioBook {
  diagnostics: Vec<Diagnostic>,
}

impl RatioBook {
  fn ratio(&mut self, name: &str, numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
      (Some(n), Some(d)) if d != 0.0 => Some(n / d),
      (_, Some(d)) if d == 0.0 => {
        self.note(name, "denominator is zero");
        None
      }
      _ => {
        self.note(name, "input line item missing");
        None
      }
    }
  }

  fn note(&mut self, name: &str, reason: &str) {
    self.diagnostics.push(Diagnostic::new(format!("ratios.{name}"), reason));
  }
}

/// Ratios over the latest balance sheet, income statement and cash-flow
/// statement. Every ratio with a zero or missing denominator is `None`.
///
/// Enterprise value here is market cap + total liabilities − cash.
pub fn compute(statement_set: &StatementSet) -> (FinancialRatios, Vec<Diagnostic>) {
  let bs = statement_set.balance_sheet.latest();
  let income = statement_set.income_statement.latest();
  let cash_flow = statement_set.cash_flow.latest();

  let total_assets = lookup_in(bs, LineItem::TotalAssets);
  let total_liabilities = lookup_in(bs, LineItem::TotalLiabilities);
  let equity = lookup_in(bs, LineItem::TotalShareholderEquity);
  let current_assets = lookup_in(bs, LineItem::TotalCurrentAssets);
  let current_liabilities = lookup_in(bs, LineItem::TotalCurrentLiabilities);
  let cash = lookup_in(bs, LineItem::CashAndEquivalents);
  let inventory = lookup_in(bs, LineItem::Inventory).unwrap_or(0.0);

  let revenue = lookup_in(income, LineItem::TotalRevenue);
  let net_income = lookup_in(income, LineItem::NetIncome);
  let operating_income = lookup_in(income, LineItem::OperatingIncome);
  let interest_expense = lookup_in(income, LineItem::InterestExpense);
  let ebitda = lookup_in(income, LineItem::Ebitda);

  let free_cash_flow = lookup_in(cash_flow, LineItem::OperatingCashflow).map(|ocf| {
    ocf - lookup_in(cash_flow, LineItem::CapitalExpenditures).map_or(0.0, f64::abs)
  });

  let market_cap = parse_value(statement_set.overview.market_capitalization.as_ref());
  let enterprise_value = market_cap
    .zip(total_liabilities)
    .map(|(cap, liabilities)| cap + liabilities - cash.unwrap_or(0.0));

  let mut book = RatioBook { diagnostics: Vec::new() };
  let ratios = FinancialRatios {
    current_ratio: book.ratio("current_ratio", current_assets, current_liabilities),
    quick_ratio: book.ratio(
      "quick_ratio",
      current_assets.map(|ca| ca - inventory),
      current_liabilities,
    ),
    debt_to_equity: book.ratio("debt_to_equity", total_liabilities, equity),
    liabilities_to_assets: book.ratio("liabilities_to_assets", total_liabilities, total_assets),
    interest_coverage: book.ratio("interest_coverage", operating_income, interest_expense),
    net_margin: book.ratio("net_margin", net_income, revenue),
    return_on_equity: book.ratio("return_on_equity", net_income, equity),
    return_on_assets: book.ratio("return_on_assets", net_income, total_assets),
    asset_turnover: book.ratio("asset_turnover", revenue, total_assets),
    free_cash_flow,
    ev_to_ebitda: book.ratio("ev_to_ebitda", enterprise_value, ebitda),
    price_to_earnings: book.ratio("price_to_earnings", market_cap, net_income),
  };
  if ratios.free_cash_flow.is_none() {
    book.note("free_cash_flow", "operating cash flow missing");
  }

  (ratios, book.diagnostics)
}
