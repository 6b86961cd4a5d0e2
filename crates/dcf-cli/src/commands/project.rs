use crate::commands::normalize_ticker;
use crate::config::Config;
use crate::store::{read_json, DataDir};
use anyhow::{Context, Result};
use clap::Args;
use dcf_engine::{project, BenchmarkCaps, Projection};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ProjectArgs {
  /// Ticker whose fetched financials are read
  pub ticker: String,

  /// Years to project
  #[arg(short, long, default_value = "5")]
  pub years: u32,

  /// JSON file of industry benchmark caps
  #[arg(short, long)]
  pub caps: Option<PathBuf>,

  /// Directory holding the fetched documents
  #[arg(short, long)]
  pub data_dir: Option<PathBuf>,
}

fn projection(args: &ProjectArgs, config: &Config) -> Result<Projection> {
  let ticker = normalize_ticker(&args.ticker);
  let financials =
    DataDir::new(config.data_dir(args.data_dir.as_deref())).load_statement_set(&ticker)?;
  let caps: BenchmarkCaps = match &args.caps {
    Some(path) => read_json(path)?,
    None => BenchmarkCaps::default(),
  };
  project(&financials, args.years, &caps).with_context(|| format!("Projection of {ticker} failed"))
}

pub fn execute(args: ProjectArgs, config: &Config) -> Result<()> {
  let projection = projection(&args, config)?;
  println!("{}", serde_json::to_string_pretty(&projection)?);
  Ok(())
}
