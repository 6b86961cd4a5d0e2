use crate::commands::normalize_ticker;
use crate::config::Config;
use crate::store::DataDir;
use anyhow::Result;
use clap::Args;
use dcf_engine::ratios::{self, FinancialRatios};
use dcf_engine::Diagnostic;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RatiosArgs {
  /// Ticker whose fetched financials are read
  pub ticker: String,

  /// Directory holding the fetched documents
  #[arg(short, long)]
  pub data_dir: Option<PathBuf>,
}

#[derive(Serialize)]
struct RatiosReport {
  ticker: String,
  ratios: FinancialRatios,
  diagnostics: Vec<Diagnostic>,
}

fn report(args: &RatiosArgs, config: &Config) -> Result<RatiosReport> {
  let ticker = normalize_ticker(&args.ticker);
  let financials =
    DataDir::new(config.data_dir(args.data_dir.as_deref())).load_statement_set(&ticker)?;
  let (ratios, diagnostics) = ratios::compute(&financials);
  Ok(RatiosReport { ticker, ratios, diagnostics })
}

pub fn execute(args: RatiosArgs, config: &Config) -> Result<()> {
  let report = report(&args, config)?;
  println!("{}", serde_json::to_string_pretty(&report)?);
  Ok(())
}
