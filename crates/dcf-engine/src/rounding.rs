//! Output rounding for result documents.
//!
//! Values are held at full precision in memory and rounded only when
//! serialized: dollar figures to whole units, rates and discount factors to
//! four places, per-share values to two. Midpoints round away from zero.
//! Non-finite values serialize as `null`.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serializer;

pub const CURRENCY_DP: u32 = 0;
pub const RATE_DP: u32 = 4;
pub const PER_SHARE_DP: u32 = 2;

pub fn round_decimal(value: f64, dp: u32) -> Option<Decimal> {
  if !value.is_finite() {
    return None;
  }
  let rounded =
    Decimal::from_f64(value)?.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
  // -0 would otherwise print as "-0.0"
  Some(if rounded.is_zero() { Decimal::ZERO } else { rounded })
}

pub fn round_f64(value: f64, dp: u32) -> Option<f64> {
  round_decimal(value, dp).and_then(|d| d.to_f64())
}

fn serialize_rounded<S>(value: Option<f64>, dp: u32, serializer: S) -> Result<S::Ok, S::Error>
where
  S: Serializer,
{
  match value.and_then(|v| round_decimal(v, dp)) {
    Some(decimal) => serializer.serialize_some(&decimal),
    None => serializer.serialize_none(),
  }
}

pub fn currency<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
  serialize_rounded(Some(*value), CURRENCY_DP, serializer)
}

pub fn currency_opt<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
  serialize_rounded(*value, CURRENCY_DP, serializer)
}

pub fn rate<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
  serialize_rounded(Some(*value), RATE_DP, serializer)
}

pub fn rate_opt<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
  serialize_rounded(*value, RATE_DP, serializer)
}

pub fn per_share_opt<S: Serializer>(
  value: &Option<f64>,
  serializer: S,
) -> Result<S::Ok, S::Error> {
  serialize_rounded(*value, PER_SHARE_DP, serializer)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Serialize;

  #[derive(Serialize)]
  struct Sample {
    #[serde(serialize_with = "currency")]
    dollars: f64,
    #[serde(serialize_with = "rate")]
    rate: f64,
    #[serde(serialize_with = "per_share_opt")]
    per_share: Option<f64>,
    #[serde(serialize_with = "currency_opt")]
    missing: Option<f64>,
  }

  #[test]
  fn test_midpoint_rounds_away_from_zero() {
    assert_eq!(round_f64(2.5, 0), Some(3.0));
    assert_eq!(round_f64(-2.5, 0), Some(-3.0));
    assert_eq!(round_f64(0.09544511501, RATE_DP), Some(0.0954));
    assert_eq!(round_f64(12.346, PER_SHARE_DP), Some(12.35));
  }

  #[test]
  fn test_non_finite_is_unavailable() {
    assert_eq!(round_f64(f64::NAN, 0), None);
    assert_eq!(round_f64(f64::INFINITY, 4), None);
  }

  #[test]
  fn test_negative_zero_normalized() {
    assert_eq!(round_decimal(-0.2, 0), Some(Decimal::ZERO));
  }

  #[test]
  fn test_serialized_document() {
    let sample =
      Sample { dollars: 1234.5, rate: 0.123456, per_share: Some(45.678), missing: None };
    let json = serde_json::to_value(&sample).unwrap();
    assert_eq!(json["dollars"], serde_json::json!(1235.0));
    assert_eq!(json["rate"], serde_json::json!(0.1235));
    assert_eq!(json["per_share"], serde_json::json!(45.68));
    assert!(json["missing"].is_null());
  }

  #[test]
  fn test_per_share_keeps_cents() {
    let sample = Sample { dollars: 12.47, rate: 0.0, per_share: Some(12.47), missing: None };
    let json = serde_json::to_value(&sample).unwrap();
    assert_eq!(json["dollars"], serde_json::json!(12.0));
    assert_eq!(json["per_share"], serde_json::json!(12.47));
  }
}
