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

//! Valuation assumptions passed into every DCF run.
//!
//! Assumptions are plain data: the engine receives them by reference and never
//! reads the environment itself. [`ValuationAssumptions::from_env`] and
//! [`ValuationAssumptions::from_json_file`] exist for callers such as the CLI.

use crate::error::{Error, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_DISCOUNT_RATE: f64 = 0.10;
pub const DEFAULT_TERMINAL_GROWTH_RATE: f64 = 0.03;
pub const DEFAULT_FCF_GROWTH_RATE: f64 = 0.05;
pub const DEFAULT_FORECAST_HORIZON: u32 = 5;
pub const DEFAULT_LOOKBACK_YEARS: usize = 4;
pub const DEFAULT_MAX_PEERS: usize = 5;

/// One row of the size-premium table.
///
/// A market cap falls in the bracket when `lower_bound <= market_cap < upper_bound`.
/// An `upper_bound` of `None` is unbounded. `premium` is a decimal fraction
/// (0.0045 is 45 basis points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizePremiumBracket {
  pub lower_bound: f64,
  #[serde(default)]
  pub upper_bound: Option<f64>,
  pub premium: f64,
}

impl SizePremiumBracket {
  pub fn new(lower_bound: f64, upper_bound: Option<f64>, premium: f64) -> Self {
    Self { lower_bound, upper_bound, premium }
  }

  pub fn contains(&self, market_cap: f64) -> bool {
    market_cap >= self.lower_bound && self.upper_bound.map_or(true, |upper| market_cap < upper)
  }
}

/// Duff & Phelps market-cap brackets, largest first.
pub fn default_size_premium_brackets() -> Vec<SizePremiumBracket> {
  vec![
    SizePremiumBracket::new(264_000_000_000.0, None, 0.0),
    SizePremiumBracket::new(51_900_000_000.0, Some(264_000_000_000.0), 0.0020),
    SizePremiumBracket::new(20_600_000_000.0, Some(51_900_000_000.0), 0.0045),
    SizePremiumBracket::new(11_700_000_000.0, Some(20_600_000_000.0), 0.0070),
    SizePremiumBracket::new(7_700_000_000.0, Some(11_700_000_000.0), 0.0095),
    SizePremiumBracket::new(4_500_000_000.0, Some(7_700_000_000.0), 0.0120),
    SizePremiumBracket::new(2_550_000_000.0, Some(4_500_000_000.0), 0.0165),
    SizePremiumBracket::new(1_100_000_000.0, Some(2_550_000_000.0), 0.0225),
    SizePremiumBracket::new(500_000_000.0, Some(1_100_000_000.0), 0.0325),
    SizePremiumBracket::new(0.0, Some(500_000_000.0), 0.0500),
  ]
}

fn default_discount_rate() -> f64 {
  DEFAULT_DISCOUNT_RATE
}

fn default_terminal_growth_rate() -> f64 {
  DEFAULT_TERMINAL_GROWTH_RATE
}

fn default_fcf_growth_rate() -> f64 {
  DEFAULT_FCF_GROWTH_RATE
}

fn default_forecast_horizon() -> u32 {
  DEFAULT_FORECAST_HORIZON
}

fn default_lookback_years() -> usize {
  DEFAULT_LOOKBACK_YEARS
}

fn default_min_history_periods() -> usize {
  1
}

fn default_max_peers() -> usize {
  DEFAULT_MAX_PEERS
}

/// Configuration for one valuation run.
///
/// Every field except the bracket table falls back to its default when absent
/// from a JSON document. A document without `size_premium_brackets` deserializes
/// to an empty table, which [`validate`](Self::validate) rejects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationAssumptions {
  /// WACC applied to forecast cash flows
  #[serde(default = "default_discount_rate")]
  pub discount_rate: f64,

  /// Perpetual growth rate used in the terminal value
  #[serde(default = "default_terminal_growth_rate")]
  pub terminal_growth_rate: f64,

  /// Annual growth applied to free cash flow over the forecast horizon
  #[serde(default = "default_fcf_growth_rate")]
  pub fcf_growth_rate: f64,

  /// Number of forecast years
  #[serde(default = "default_forecast_horizon")]
  pub forecast_horizon: u32,

  /// Historical periods echoed in the result (current year plus prior years)
  #[serde(default = "default_lookback_years")]
  pub lookback_years: usize,

  /// Income-statement periods required before a run may start
  #[serde(default = "default_min_history_periods")]
  pub min_history_periods: usize,

  /// Peers consumed from the comparable set, first N in supplied order
  #[serde(default = "default_max_peers")]
  pub max_peers: usize,

  /// Replaces the tax rate derived from the income statement
  #[serde(default)]
  pub tax_rate_override: Option<f64>,

  /// Replaces the free cash flow derived from the latest cash-flow statement
  #[serde(default)]
  pub starting_fcf: Option<f64>,

  #[serde(default)]
  pub size_premium_brackets: Vec<SizePremiumBracket>,
}

impl Default for ValuationAssumptions {
  fn default() -> Self {
    Self {
      discount_rate: DEFAULT_DISCOUNT_RATE,
      terminal_growth_rate: DEFAULT_TERMINAL_GROWTH_RATE,
      fcf_growth_rate: DEFAULT_FCF_GROWTH_RATE,
      forecast_horizon: DEFAULT_FORECAST_HORIZON,
      lookback_years: DEFAULT_LOOKBACK_YEARS,
      min_history_periods: default_min_history_periods(),
      max_peers: DEFAULT_MAX_PEERS,
      tax_rate_override: None,
      starting_fcf: None,
      size_premium_brackets: default_size_premium_brackets(),
    }
  }
}

impl ValuationAssumptions {
  /// Defaults overridden by `DCF_*` environment variables.
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let mut assumptions = Self::default();
    if let Some(rate) = parse_env::<f64>("DCF_WACC")? {
      assumptions.discount_rate = rate;
    }
    if let Some(rate) = parse_env::<f64>("DCF_TERMINAL_GROWTH")? {
      assumptions.terminal_growth_rate = rate;
    }
    if let Some(rate) = parse_env::<f64>("DCF_FCF_GROWTH")? {
      assumptions.fcf_growth_rate = rate;
    }
    if let Some(years) = parse_env::<u32>("DCF_FORECAST_HORIZON")? {
      assumptions.forecast_horizon = years;
    }
    if let Some(rate) = parse_env::<f64>("DCF_TAX_RATE")? {
      assumptions.tax_rate_override = Some(rate);
    }

    Ok(assumptions)
  }

  /// Load assumptions from a JSON document on disk.
  pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let assumptions = serde_json::from_str(&content)?;
    Ok(assumptions)
  }

  /// Check the assumptions before any arithmetic happens.
  pub fn validate(&self) -> Result<()> {
    let rates = [
      ("discount_rate", self.discount_rate),
      ("terminal_growth_rate", self.terminal_growth_rate),
      ("fcf_growth_rate", self.fcf_growth_rate),
    ];
    for (name, value) in rates {
      if !value.is_finite() {
        return Err(Error::Config(format!("{} must be a finite number, got {}", name, value)));
      }
    }

    if self.discount_rate <= -1.0 {
      return Err(Error::Config(format!(
        "discount rate (WACC) {} must be greater than -1",
        self.discount_rate
      )));
    }

    if self.discount_rate <= self.terminal_growth_rate {
      return Err(Error::Config(format!(
        "discount rate (WACC) {:.4} must exceed terminal growth rate {:.4}",
        self.discount_rate, self.terminal_growth_rate
      )));
    }

    if self.forecast_horizon == 0 {
      return Err(Error::Config("forecast_horizon must be at least 1".to_string()));
    }

    if self.lookback_years == 0 {
      return Err(Error::Config("lookback_years must be at least 1".to_string()));
    }

    if self.min_history_periods == 0 || self.min_history_periods > self.lookback_years {
      return Err(Error::Config(format!(
        "min_history_periods must be between 1 and lookback_years ({}), got {}",
        self.lookback_years, self.min_history_periods
      )));
    }

    if let Some(rate) = self.tax_rate_override {
      if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
        return Err(Error::Config(format!("tax_rate_override must be within [0, 1], got {}", rate)));
      }
    }

    if let Some(fcf) = self.starting_fcf {
      if !fcf.is_finite() {
        return Err(Error::Config(format!("starting_fcf must be a finite number, got {}", fcf)));
      }
    }

    self.validate_brackets()
  }

  fn validate_brackets(&self) -> Result<()> {
    if self.size_premium_brackets.is_empty() {
      return Err(Error::Config("size_premium_brackets table is missing or empty".to_string()));
    }

    for (i, bracket) in self.size_premium_brackets.iter().enumerate() {
      if !bracket.lower_bound.is_finite() || !bracket.premium.is_finite() {
        return Err(Error::Config(format!("size premium bracket {} has a non-finite value", i)));
      }
      if let Some(upper) = bracket.upper_bound {
        if upper <= bracket.lower_bound {
          return Err(Error::Config(format!(
            "size premium bracket {} has upper bound {} not above lower bound {}",
            i, upper, bracket.lower_bound
          )));
        }
      }
    }

    // largest bracket first
    for (i, pair) in self.size_premium_brackets.windows(2).enumerate() {
      if pair[0].lower_bound <= pair[1].lower_bound {
        return Err(Error::Config(format!(
          "size premium brackets must be ordered largest first (bracket {} vs {})",
          i,
          i + 1
        )));
      }
    }

    Ok(())
  }
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>> {
  match env::var(name) {
    Ok(raw) => raw
      .trim()
      .parse::<T>()
      .map(Some)
      .map_err(|_| Error::Config(format!("Invalid {}: {}", name, raw))),
    Err(_) => Ok(None),
  }
}
