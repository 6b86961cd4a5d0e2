use crate::commands::normalize_ticker;
use crate::config::Config;
use crate::report::CalculationLog;
use crate::store::{write_text, DataDir};
use anyhow::{Context, Result};
use clap::Args;
use dcf_core::ValuationAssumptions;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Args, Debug)]
pub struct ValueArgs {
  /// Ticker to value
  pub ticker: String,

  /// Directory holding the fetched documents
  #[arg(short, long)]
  pub data_dir: Option<PathBuf>,

  /// JSON file of valuation assumptions (defaults come from DCF_* variables)
  #[arg(short, long)]
  pub assumptions: Option<PathBuf>,

  /// Discount rate (WACC), as a fraction
  #[arg(long)]
  pub wacc: Option<f64>,

  /// Terminal growth rate, as a fraction
  #[arg(long)]
  pub terminal_growth: Option<f64>,

  /// Annual FCF growth over the forecast, as a fraction
  #[arg(long)]
  pub fcf_growth: Option<f64>,

  /// Forecast horizon in years
  #[arg(long)]
  pub horizon: Option<u32>,

  /// Directory the valuation and calculation log are written to (defaults to the data directory)
  #[arg(short, long)]
  pub out_dir: Option<PathBuf>,
}

impl ValueArgs {
  /// File or environment assumptions with the command-line overrides applied
  fn assumptions(&self) -> Result<ValuationAssumptions> {
    let mut assumptions = match &self.assumptions {
      Some(path) => ValuationAssumptions::from_json_file(path)
        .with_context(|| format!("Failed to load assumptions from {}", path.display()))?,
      None => ValuationAssumptions::from_env().context("Invalid DCF_* environment variable")?,
    };
    if let Some(wacc) = self.wacc {
      assumptions.discount_rate = wacc;
    }
    if let Some(growth) = self.terminal_growth {
      assumptions.terminal_growth_rate = growth;
    }
    if let Some(growth) = self.fcf_growth {
      assumptions.fcf_growth_rate = growth;
    }
    if let Some(horizon) = self.horizon {
      assumptions.forecast_horizon = horizon;
    }
    Ok(assumptions)
  }
}

pub fn execute(args: ValueArgs, config: &Config) -> Result<()> {
  let ticker = normalize_ticker(&args.ticker);
  let assumptions = args.assumptions()?;
  let data_dir = config.data_dir(args.data_dir.as_deref());
  let data = DataDir::new(data_dir);
  let out = DataDir::new(args.out_dir.as_deref().unwrap_or(data_dir));

  let financials = data.load_statement_set(&ticker)?;
  let comparables = data.load_comparable_set(&ticker)?;

  let result = dcf_engine::run(&financials, &comparables, &assumptions)
    .with_context(|| format!("Valuation of {ticker} failed"))?;
  for diagnostic in &result.diagnostics {
    debug!(field = %diagnostic.field, reason = %diagnostic.reason, "unavailable");
  }

  write_text(&out.valuation(&ticker), &result.to_json()?)?;
  write_text(&out.calculation_log(&ticker), &CalculationLog(&result).to_string())?;

  match result.intrinsic_value_per_share {
    Some(per_share) => {
      info!(enterprise_value = result.enterprise_value, "Valued {}", ticker);
      println!("{ticker}: intrinsic value per share {per_share:.2}");
    }
    None => println!("{ticker}: equity value {:.0} (no share count)", result.equity_value),
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::commands::fixtures;
  use crate::store::write_json;
  use serde_json::Value;
  use std::fs;
  use tempfile::tempdir;

  fn args(dir: &std::path::Path) -> ValueArgs {
    ValueArgs {
      ticker: "acme".to_string(),
      data_dir: Some(dir.to_path_buf()),
      assumptions: None,
      wacc: Some(0.09),
      terminal_growth: Some(0.02),
      fcf_growth: Some(0.04),
      horizon: Some(3),
      out_dir: None,
    }
  }

  #[test]
  fn test_overrides_apply() {
    let tmp = tempdir().unwrap();
    let assumptions = args(tmp.path()).assumptions().unwrap();
    assert_eq!(assumptions.discount_rate, 0.09);
    assert_eq!(assumptions.terminal_growth_rate, 0.02);
    assert_eq!(assumptions.fcf_growth_rate, 0.04);
    assert_eq!(assumptions.forecast_horizon, 3);
  }

  #[test]
  fn test_assumptions_file_then_overrides() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("assumptions.json");
    fs::write(&path, r#"{"discount_rate": 0.12, "forecast_horizon": 7}"#).unwrap();

    let args = ValueArgs { assumptions: Some(path), wacc: None, horizon: None, ..args(tmp.path()) };
    let assumptions = args.assumptions().unwrap();
    assert_eq!(assumptions.discount_rate, 0.12);
    assert_eq!(assumptions.forecast_horizon, 7);
    assert_eq!(assumptions.terminal_growth_rate, 0.02);
  }

  #[test]
  fn test_writes_valuation_and_log() {
    let tmp = tempdir().unwrap();
    let data = DataDir::new(tmp.path());
    write_json(&data.financials("ACME"), &fixtures::financials()).unwrap();

    let config = Config { data_dir: PathBuf::from("unused") };
    execute(args(tmp.path()), &config).unwrap();

    let doc: Value =
      serde_json::from_str(&fs::read_to_string(data.valuation("ACME")).unwrap()).unwrap();
    assert_eq!(doc["ticker"], "ACME");
    assert_eq!(doc["forecast"].as_array().map(Vec::len), Some(3));
    assert!(doc["intrinsic_value_per_share"].is_number());

    let log = fs::read_to_string(data.calculation_log("ACME")).unwrap();
    assert!(log.starts_with("DCF calculation data for ACME (Acme Corp)"));
    assert!(log.contains("== Free cash flow forecast =="));
    assert!(log.contains("Year 3 (2027)"));
  }

  #[test]
  fn test_out_dir() {
    let tmp = tempdir().unwrap();
    let out = tmp.path().join("out");
    write_json(&DataDir::new(tmp.path()).financials("ACME"), &fixtures::financials()).unwrap();

    let config = Config { data_dir: PathBuf::from("unused") };
    execute(ValueArgs { out_dir: Some(out.clone()), ..args(tmp.path()) }, &config).unwrap();
    assert!(DataDir::new(&out).valuation("ACME").exists());
    assert!(!DataDir::new(tmp.path()).valuation("ACME").exists());
  }

  #[test]
  fn test_invalid_rates_fail() {
    let tmp = tempdir().unwrap();
    write_json(&DataDir::new(tmp.path()).financials("ACME"), &fixtures::financials()).unwrap();

    let config = Config { data_dir: PathBuf::from("unused") };
    let err = execute(ValueArgs { wacc: Some(0.02), ..args(tmp.path()) }, &config).unwrap_err();
    assert_eq!(err.to_string(), "Valuation of ACME failed");
    assert!(format!("{err:#}").contains("must exceed terminal growth"));
  }
}
