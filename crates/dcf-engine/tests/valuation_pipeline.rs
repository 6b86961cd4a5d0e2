use dcf_core::test_utils::{assert_currency_eq, assert_rate_eq, assert_some_approx};
use dcf_core::ValuationAssumptions;
use dcf_engine::extract::extract;
use dcf_engine::historical::cagr;
use dcf_engine::{run, ValuationError};
use dcf_models::{ComparableSet, FiscalPeriodReport, StatementSet};
use serde_json::{json, Value};

/// Financials document in the provider vocabulary, periods given newest first
/// and written to the document in the order given.
fn financials(revenues: &[(&str, &str)], shares: &str) -> Value {
  let income: Vec<Value> = revenues
    .iter()
    .map(|(date, revenue)| {
      json!({
        "fiscalDateEnding": date,
        "totalRevenue": revenue,
        "incomeBeforeTax": "30",
        "incomeTaxExpense": "6",
        "interestExpense": "None",
        "netIncome": "24"
      })
    })
    .collect();

  json!({
    "income_statement": {"symbol": "TEST", "annualReports": income, "quarterlyReports": []},
    "balance_sheet": {
      "symbol": "TEST",
      "annualReports": [{
        "fiscalDateEnding": revenues[0].0,
        "shortTermDebt": "0",
        "longTermDebt": "0",
        "cashAndCashEquivalentsAtCarryingValue": "0",
        "commonStockSharesOutstanding": shares
      }]
    },
    "cash_flow": {
      "symbol": "TEST",
      "annualReports": [{
        "fiscalDateEnding": revenues[0].0,
        "operatingCashflow": "20",
        "capitalExpenditures": "5"
      }]
    },
    "overview": {"Symbol": "TEST", "Name": "Test Corp", "MarketCapitalization": "1500000000"}
  })
}

fn four_year_set(shares: &str) -> StatementSet {
  serde_json::from_value(financials(
    &[("2024-12-31", "133.1"), ("2023-12-31", "121"), ("2022-12-31", "110"), ("2021-12-31", "100")],
    shares,
  ))
  .unwrap()
}

fn assumptions() -> ValuationAssumptions {
  ValuationAssumptions {
    discount_rate: 0.10,
    terminal_growth_rate: 0.03,
    fcf_growth_rate: 0.05,
    forecast_horizon: 2,
    ..Default::default()
  }
}

// Neither alphabetical nor in market-cap order
const PEER_BOOK: [(&str, f64); 8] = [
  ("ZZ", 1_000.0),
  ("AA", 9_000.0),
  ("MM", 3_000.0),
  ("CC", 7_000.0),
  ("XX", 2_000.0),
  ("BB", 8_000.0),
  ("YY", 6_000.0),
  ("DD", 5_000.0),
];

fn peers(count: usize) -> ComparableSet {
  let mut peers = serde_json::Map::new();
  for (i, (ticker, market_cap)) in PEER_BOOK.iter().take(count).enumerate() {
    peers.insert(
      ticker.to_string(),
      json!({
        "financial_metrics": {},
        "financials": {
          "income_statement": {"date": "2024-12-31", "revenue": 100.0, "ebitda": 20.0 + i as f64},
          "balance_sheet": {"date": "2024-12-31", "shortTermDebt": 0, "longTermDebt": 0},
          "overview": {"symbol": ticker, "mktCap": market_cap}
        }
      }),
    );
  }
  serde_json::from_value(json!({"target": {"ticker": "TEST"}, "peers": peers})).unwrap()
}

#[test]
fn test_end_to_end_two_year_forecast() {
  let result = run(&four_year_set("10"), &ComparableSet::default(), &assumptions()).unwrap();

  // base FCF = 20 - 5, grown 5% a year
  let fcf1 = 15.0 * 1.05;
  let fcf2 = fcf1 * 1.05;
  let df1 = 1.0 / 1.1;
  let df2 = 1.0 / 1.21;
  let sum = fcf1 * df1 + fcf2 * df2;
  let terminal_value = fcf2 * 1.03 / (0.10 - 0.03);
  let enterprise_value = sum + terminal_value * df2;

  assert_eq!(result.ticker.as_deref(), Some("TEST"));
  assert_eq!(result.latest_fiscal_year, Some(2024));
  assert_eq!(result.forecast.len(), 2);
  assert_currency_eq(result.forecast[0].fcf, fcf1);
  assert_currency_eq(result.forecast[1].fcf, fcf2);
  assert_rate_eq(result.forecast[1].discount_factor, df2);
  assert_currency_eq(result.sum_discounted_fcf, sum);
  assert_currency_eq(result.terminal_value, terminal_value);
  assert_currency_eq(result.discounted_terminal_value, terminal_value * df2);
  assert_currency_eq(result.enterprise_value, enterprise_value);
  assert_currency_eq(result.equity_value, enterprise_value);
  assert_some_approx(result.intrinsic_value_per_share, enterprise_value / 10.0);

  // historical echo, newest first
  assert_eq!(
    result.historical.net_revenue.values(),
    vec![Some(133.1), Some(121.0), Some(110.0), Some(100.0)]
  );
  assert_some_approx(result.historical.revenue_cagr, 0.1);
  assert_some_approx(result.capital.tax_rate, 0.2);
  assert!(result.capital.size_premium.matched);
  assert_rate_eq(result.capital.size_premium.premium, 0.0225);
}

#[test]
fn test_unsorted_input_uses_latest_year() {
  let set: StatementSet = serde_json::from_value(financials(
    &[("2022-12-31", "110"), ("2024-12-31", "133.1"), ("2021-12-31", "100"), ("2023-12-31", "121")],
    "10",
  ))
  .unwrap();
  let result = run(&set, &ComparableSet::default(), &assumptions()).unwrap();

  assert_eq!(result.latest_period_end.as_deref(), Some("2024-12-31"));
  assert_eq!(result.historical.net_revenue.latest(), Some(133.1));
}

#[test]
fn test_identical_inputs_serialize_identically() {
  let set = four_year_set("10");
  let comparables = peers(3);
  let first = run(&set, &comparables, &assumptions()).unwrap().to_json().unwrap();
  let second = run(&set, &comparables, &assumptions()).unwrap().to_json().unwrap();
  assert_eq!(first, second);

  let reparsed: StatementSet =
    serde_json::from_str(&serde_json::to_string(&set).unwrap()).unwrap();
  let third = run(&reparsed, &comparables, &assumptions()).unwrap().to_json().unwrap();
  assert_eq!(first, third);
}

#[test]
fn test_result_document_rounding() {
  let result = run(&four_year_set("10"), &ComparableSet::default(), &assumptions()).unwrap();
  let doc: Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

  assert_eq!(doc["forecast"][0]["discount_factor"], json!(0.9091));
  assert_eq!(doc["forecast"][0]["fcf"], json!(16.0));
  assert_eq!(doc["capital"]["tax_rate"], json!(0.2));
  let per_share = doc["intrinsic_value_per_share"].as_f64().unwrap();
  assert_eq!((per_share * 100.0).round() / 100.0, per_share);
}

#[test]
fn test_placeholders_extract_to_zero() {
  let report = FiscalPeriodReport::new("2024-12-31")
    .with_item("a", Value::Null)
    .with_item("b", "N/A")
    .with_item("c", "-")
    .with_item("d", "--")
    .with_item("e", "None")
    .with_item("f", "twelve");
  for field in ["a", "b", "c", "d", "e", "f", "absent"] {
    assert_eq!(extract(&report, field), 0.0);
  }
}

#[test]
fn test_cagr_of_three_revenues() {
  // newest first [120, 110, 100]
  assert_some_approx(cagr(100.0, 120.0, 2.0), 0.0954451150103322);
}

#[test]
fn test_loss_period_tax_rate_is_zero() {
  let mut doc = financials(&[("2024-12-31", "100")], "10");
  doc["income_statement"]["annualReports"][0]["incomeBeforeTax"] = json!("-100");
  doc["income_statement"]["annualReports"][0]["incomeTaxExpense"] = json!("10");
  let set: StatementSet = serde_json::from_value(doc).unwrap();

  let result = run(&set, &ComparableSet::default(), &assumptions()).unwrap();
  assert_eq!(result.capital.tax_rate, Some(0.0));
}

#[test]
fn test_wacc_equal_to_terminal_growth_is_configuration_error() {
  let assumptions =
    ValuationAssumptions { discount_rate: 0.08, terminal_growth_rate: 0.08, ..assumptions() };
  let err = run(&four_year_set("10"), &ComparableSet::default(), &assumptions).unwrap_err();
  assert!(matches!(err, ValuationError::Configuration(_)), "got {err:?}");
}

#[test]
fn test_missing_bracket_table_is_configuration_error() {
  let assumptions = ValuationAssumptions { size_premium_brackets: Vec::new(), ..assumptions() };
  let err = run(&four_year_set("10"), &ComparableSet::default(), &assumptions).unwrap_err();
  assert!(matches!(err, ValuationError::Configuration(_)));
}

#[test]
fn test_no_income_reports_is_precondition_failure() {
  let mut doc = financials(&[("2024-12-31", "100")], "10");
  doc["income_statement"] = json!({"Information": "API rate limit reached"});
  let set: StatementSet = serde_json::from_value(doc).unwrap();

  let err = run(&set, &ComparableSet::default(), &assumptions()).unwrap_err();
  assert!(matches!(err, ValuationError::Precondition(_)));
}

#[test]
fn test_eight_peers_truncate_to_first_five() {
  let result = run(&four_year_set("10"), &peers(8), &assumptions()).unwrap();

  assert_eq!(result.peers.supplied, 8);
  let tickers: Vec<&str> = result.peers.peers.iter().map(|p| p.ticker.as_str()).collect();
  assert_eq!(tickers, vec!["ZZ", "AA", "MM", "CC", "XX"]);
}

#[test]
fn test_zero_shares_completes_without_per_share_value() {
  let result = run(&four_year_set("0"), &ComparableSet::default(), &assumptions()).unwrap();

  assert_eq!(result.intrinsic_value_per_share, None);
  assert!(result.diagnostic("intrinsic_value_per_share").is_some());
  assert!(result.enterprise_value > 0.0);

  let doc: Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
  assert!(doc["intrinsic_value_per_share"].is_null());
}
