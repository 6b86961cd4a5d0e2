/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Financial statement documents.
//!
//! Statements are kept in the provider's own vocabulary: each fiscal period is
//! a date plus a map of raw line items. Parsing the raw values into numbers is
//! left to the valuation engine so that missing and unparsable values can be
//! reported the same way everywhere.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Keys under which the provider reports an error or throttling notice
/// instead of data.
pub const PROVIDER_MESSAGE_KEYS: [&str; 5] =
  ["Error Message", "Information", "Note", "error", "message"];

/// One fiscal period of one statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FiscalPeriodReport {
  #[serde(rename = "fiscalDateEnding", default, skip_serializing_if = "Option::is_none")]
  pub fiscal_date_ending: Option<String>,

  /// Raw line items keyed by provider field name
  #[serde(flatten)]
  pub line_items: BTreeMap<String, Value>,
}

impl FiscalPeriodReport {
  pub fn new(fiscal_date_ending: impl Into<String>) -> Self {
    Self { fiscal_date_ending: Some(fiscal_date_ending.into()), line_items: BTreeMap::new() }
  }

  /// Builder used by fixtures and the CLI's peer writer
  pub fn with_item(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
    self.line_items.insert(field.into(), value.into());
    self
  }

  pub fn get(&self, field: &str) -> Option<&Value> {
    self.line_items.get(field)
  }

  /// Period end as written in the document. Peer documents carry `date`
  /// instead of `fiscalDateEnding`.
  pub fn period_end(&self) -> Option<&str> {
    self
      .fiscal_date_ending
      .as_deref()
      .or_else(|| self.line_items.get("date").and_then(Value::as_str))
  }

  pub fn period_end_date(&self) -> Option<NaiveDate> {
    self.period_end().and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
  }

  /// Fiscal year of the period, from the end date or a `calendarYear` item
  pub fn fiscal_year(&self) -> Option<i32> {
    if let Some(date) = self.period_end_date() {
      return Some(date.year());
    }
    if let Some(year) = self.period_end().and_then(|s| s.get(..4)).and_then(|y| y.parse().ok()) {
      return Some(year);
    }
    match self.line_items.get("calendarYear") {
      Some(Value::String(s)) => s.trim().parse().ok(),
      Some(Value::Number(n)) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
      _ => None,
    }
  }

  /// Whether both reports describe the same fiscal period
  pub fn same_period(&self, other: &FiscalPeriodReport) -> bool {
    match (self.period_end_date(), other.period_end_date()) {
      (Some(a), Some(b)) => a == b,
      _ => matches!((self.period_end(), other.period_end()), (Some(a), Some(b)) if a == b),
    }
  }
}

/// The reports of one statement kind.
///
/// Deserializes from the provider envelope (`annualReports` /
/// `quarterlyReports`), a bare list of reports, a single report, or a provider
/// error object. An error object yields no reports and keeps the provider's
/// message. Always serializes as the envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatementReports {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub symbol: Option<String>,

  #[serde(rename = "annualReports")]
  pub annual_reports: Vec<FiscalPeriodReport>,

  #[serde(rename = "quarterlyReports", skip_serializing_if = "Vec::is_empty")]
  pub quarterly_reports: Vec<FiscalPeriodReport>,

  /// Error or throttling notice returned in place of data
  #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
  pub provider_message: Option<String>,
}

#[derive(Deserialize)]
struct ReportsEnvelope {
  #[serde(default)]
  symbol: Option<String>,
  #[serde(rename = "annualReports", default)]
  annual_reports: Vec<FiscalPeriodReport>,
  #[serde(rename = "quarterlyReports", default)]
  quarterly_reports: Vec<FiscalPeriodReport>,
  #[serde(rename = "error", default)]
  provider_message: Option<String>,
}

impl StatementReports {
  pub fn from_annual(annual_reports: Vec<FiscalPeriodReport>) -> Self {
    Self { annual_reports, ..Default::default() }
  }

  /// Interpret any of the accepted document shapes
  pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
    match value {
      Value::Null => Ok(Self::default()),
      Value::Array(items) => {
        let reports: Vec<FiscalPeriodReport> = serde_json::from_value(Value::Array(items))?;
        Ok(Self::from_annual(reports))
      }
      Value::Object(map) => {
        if map.contains_key("annualReports") || map.contains_key("quarterlyReports") {
          let envelope: ReportsEnvelope = serde_json::from_value(Value::Object(map))?;
          return Ok(Self {
            symbol: envelope.symbol,
            annual_reports: envelope.annual_reports,
            quarterly_reports: envelope.quarterly_reports,
            provider_message: envelope.provider_message,
          });
        }

        if let Some(message) = provider_message(&map) {
          return Ok(Self { provider_message: Some(message), ..Default::default() });
        }

        if map.is_empty() {
          return Ok(Self::default());
        }

        let report: FiscalPeriodReport = serde_json::from_value(Value::Object(map))?;
        Ok(Self::from_annual(vec![report]))
      }
      other => Err(serde::de::Error::custom(format!(
        "expected statement reports, found {}",
        value_kind(&other)
      ))),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.annual_reports.is_empty()
  }

  pub fn len(&self) -> usize {
    self.annual_reports.len()
  }

  /// Annual reports, newest first. Reports without a readable date sort last
  /// and keep their relative order.
  pub fn annual_newest_first(&self) -> Vec<&FiscalPeriodReport> {
    let mut reports: Vec<&FiscalPeriodReport> = self.annual_reports.iter().collect();
    reports.sort_by(|a, b| b.period_end_date().cmp(&a.period_end_date()));
    reports
  }

  /// Most recent annual report
  pub fn latest(&self) -> Option<&FiscalPeriodReport> {
    self.annual_newest_first().into_iter().next()
  }

  /// Report covering the same fiscal period as `period`: an exact end-date
  /// match first, then the same fiscal year.
  pub fn aligned_with(&self, period: &FiscalPeriodReport) -> Option<&FiscalPeriodReport> {
    if let Some(exact) = self.annual_reports.iter().find(|r| r.same_period(period)) {
      return Some(exact);
    }
    let year = period.fiscal_year()?;
    self.annual_reports.iter().find(|r| r.fiscal_year() == Some(year))
  }
}

impl<'de> Deserialize<'de> for StatementReports {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let value = Value::deserialize(deserializer)?;
    StatementReports::from_value(value).map_err(serde::de::Error::custom)
  }
}

fn provider_message(map: &serde_json::Map<String, Value>) -> Option<String> {
  PROVIDER_MESSAGE_KEYS.iter().find_map(|key| {
    map.get(*key).map(|v| match v {
      Value::String(s) => s.clone(),
      other => other.to_string(),
    })
  })
}

fn value_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

/// Company profile.
///
/// Accepts both the Alpha Vantage `OVERVIEW` keys and the FMP-style profile
/// keys used in peer documents. Numeric fields stay raw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overview {
  #[serde(rename = "Symbol", alias = "symbol", default, skip_serializing_if = "Option::is_none")]
  pub symbol: Option<String>,

  #[serde(rename = "Name", alias = "companyName", default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,

  #[serde(rename = "Sector", alias = "sector", default, skip_serializing_if = "Option::is_none")]
  pub sector: Option<String>,

  #[serde(rename = "Industry", alias = "industry", default, skip_serializing_if = "Option::is_none")]
  pub industry: Option<String>,

  #[serde(
    rename = "MarketCapitalization",
    alias = "mktCap",
    alias = "marketCap",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub market_capitalization: Option<Value>,

  #[serde(
    rename = "SharesOutstanding",
    alias = "sharesOutstanding",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub shares_outstanding: Option<Value>,

  #[serde(rename = "Beta", alias = "beta", default, skip_serializing_if = "Option::is_none")]
  pub beta: Option<Value>,

  /// Share price (profile documents only)
  #[serde(rename = "Price", alias = "price", default, skip_serializing_if = "Option::is_none")]
  pub price: Option<Value>,
}

impl Overview {
  pub fn is_empty(&self) -> bool {
    self.symbol.is_none()
      && self.name.is_none()
      && self.market_capitalization.is_none()
      && self.shares_outstanding.is_none()
      && self.price.is_none()
  }
}

/// Latest quote block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalQuote {
  #[serde(rename = "Global Quote", default)]
  pub quote: BTreeMap<String, Value>,
}

impl GlobalQuote {
  pub fn price(&self) -> Option<&Value> {
    self.quote.get("05. price")
  }

  pub fn is_empty(&self) -> bool {
    self.quote.is_empty()
  }
}

/// Everything the valuation needs about one company
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementSet {
  #[serde(default)]
  pub balance_sheet: StatementReports,

  #[serde(default)]
  pub income_statement: StatementReports,

  #[serde(default)]
  pub cash_flow: StatementReports,

  #[serde(default)]
  pub overview: Overview,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub quote: Option<GlobalQuote>,
}

/// One fiscal period with the matching balance-sheet and cash-flow reports
#[derive(Debug, Clone, Copy)]
pub struct AlignedPeriod<'a> {
  pub income: &'a FiscalPeriodReport,
  pub balance_sheet: Option<&'a FiscalPeriodReport>,
  pub cash_flow: Option<&'a FiscalPeriodReport>,
}

impl AlignedPeriod<'_> {
  pub fn period_end(&self) -> Option<&str> {
    self.income.period_end()
  }
}

impl StatementSet {
  /// Up to `limit` fiscal periods, newest first, anchored on the income
  /// statement. Balance-sheet and cash-flow reports are matched by end date,
  /// then by fiscal year.
  pub fn aligned_periods(&self, limit: usize) -> Vec<AlignedPeriod<'_>> {
    self
      .income_statement
      .annual_newest_first()
      .into_iter()
      .take(limit)
      .map(|income| AlignedPeriod {
        income,
        balance_sheet: self.balance_sheet.aligned_with(income),
        cash_flow: self.cash_flow.aligned_with(income),
      })
      .collect()
  }

  /// Provider notices carried by any statement block
  pub fn provider_messages(&self) -> Vec<(&'static str, &str)> {
    [
      ("balance_sheet", &self.balance_sheet),
      ("income_statement", &self.income_statement),
      ("cash_flow", &self.cash_flow),
    ]
    .into_iter()
    .filter_map(|(name, reports)| reports.provider_message.as_deref().map(|m| (name, m)))
    .collect()
  }
}
