//! Metric extraction from raw statement line items.
//!
//! Provider documents mix JSON numbers, numeric strings, currency-formatted
//! strings and placeholder strings. [`lookup`] turns a raw value into
//! `Some(f64)` or `None`; [`extract`] is the zero-defaulting form used where a
//! missing term should simply drop out of a sum.

use dcf_models::{FiscalPeriodReport, LineItem};
use serde_json::Value;
use tracing::debug;

/// Placeholder strings providers use for "no value"
pub const MISSING_SENTINELS: [&str; 4] = ["None", "N/A", "-", "--"];

/// Parse one raw value. Never fails; anything unusable is `None`.
pub fn parse_value(value: Option<&Value>) -> Option<f64> {
  match value? {
    Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
    Value::String(s) => parse_text(s),
    _ => None,
  }
}

fn parse_text(raw: &str) -> Option<f64> {
  let trimmed = raw.trim();
  if trimmed.is_empty() || MISSING_SENTINELS.contains(&trimmed) {
    return None;
  }
  let cleaned: String = trimmed.chars().filter(|c| *c != ',' && *c != '$').collect();
  cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Value of `field`, or `None` when absent, a placeholder, or unparsable.
pub fn lookup(report: &FiscalPeriodReport, field: &str) -> Option<f64> {
  let value = parse_value(report.get(field));
  if value.is_none() {
    debug!(field, period = report.period_end().unwrap_or("undated"), "line item missing");
  }
  value
}

/// Value of `field`, with 0.0 standing in for anything missing.
pub fn extract(report: &FiscalPeriodReport, field: &str) -> f64 {
  lookup(report, field).unwrap_or(0.0)
}

/// First usable value among the item's provider aliases
pub fn lookup_item(report: &FiscalPeriodReport, item: LineItem) -> Option<f64> {
  let value = item.aliases().iter().find_map(|field| parse_value(report.get(field)));
  if value.is_none() {
    debug!(
      field = item.field_name(),
      period = report.period_end().unwrap_or("undated"),
      "line item missing"
    );
  }
  value
}

pub fn extract_item(report: &FiscalPeriodReport, item: LineItem) -> f64 {
  lookup_item(report, item).unwrap_or(0.0)
}

/// [`lookup_item`] over a report that may itself be absent
pub fn lookup_in(report: Option<&FiscalPeriodReport>, item: LineItem) -> Option<f64> {
  report.and_then(|r| lookup_item(r, item))
}
