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

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod report;
mod store;

use commands::{
  fetch::FetchArgs, project::ProjectArgs, ratios::RatiosArgs, value::ValueArgs,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "dcf")]
#[command(propagate_version = true)]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  /// Verbose output
  #[arg(short, long, global = true)]
  verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Fetch financial statements (and optionally peers) for a ticker
  Fetch(FetchArgs),

  /// Run the discounted cash flow valuation on fetched documents
  Value(ValueArgs),

  /// Print the latest-period financial ratios
  Ratios(RatiosArgs),

  /// Print the five-year operating projection
  Project(ProjectArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
  // Load environment variables
  dotenv().ok();

  let cli = Cli::parse();

  // stdout carries command output; logs go to stderr
  let log_level = if cli.verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
  tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

  let config = config::Config::from_env();

  match cli.command {
    Commands::Fetch(args) => commands::fetch::execute(args, &config).await?,
    Commands::Value(args) => commands::value::execute(args, &config)?,
    Commands::Ratios(args) => commands::ratios::execute(args, &config)?,
    Commands::Project(args) => commands::project::execute(args, &config)?,
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_value_overrides() {
    let cli = Cli::try_parse_from([
      "dcf", "-v", "value", "IBM", "--wacc", "0.09", "--horizon", "3", "--data-dir", "/tmp/x",
    ])
    .unwrap();
    assert!(cli.verbose);
    match cli.command {
      Commands::Value(args) => {
        assert_eq!(args.ticker, "IBM");
        assert_eq!(args.wacc, Some(0.09));
        assert_eq!(args.horizon, Some(3));
      }
      other => panic!("unexpected command {other:?}"),
    }
  }

  #[test]
  fn test_parse_fetch_peer_list() {
    let cli = Cli::try_parse_from(["dcf", "fetch", "IBM", "--peers", "MSFT,ORCL"]).unwrap();
    match cli.command {
      Commands::Fetch(args) => assert_eq!(args.peers, Some(vec!["MSFT".to_string(), "ORCL".to_string()])),
      other => panic!("unexpected command {other:?}"),
    }
  }

  #[test]
  fn test_missing_ticker_is_rejected() {
    assert!(Cli::try_parse_from(["dcf", "ratios"]).is_err());
  }
}
