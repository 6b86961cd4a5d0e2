use anyhow::{Context, Result};
use dcf_core::Config as CoreConfig;
use std::env;
use std::path::{Path, PathBuf};

/// Directory fetched documents are read from and written to when neither
/// `--data-dir` nor `DCF_DATA_DIR` is given
pub const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Debug, Clone)]
pub struct Config {
  pub data_dir: PathBuf,
}

impl Config {
  pub fn from_env() -> Self {
    let data_dir = env::var("DCF_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
    Self { data_dir: PathBuf::from(data_dir) }
  }

  /// `--data-dir` when given, else the configured directory
  pub fn data_dir<'a>(&'a self, arg: Option<&'a Path>) -> &'a Path {
    arg.unwrap_or(&self.data_dir)
  }

  /// Provider settings; only `fetch` needs an API key
  pub fn api_config(&self) -> Result<CoreConfig> {
    CoreConfig::from_env().context("ALPHA_VANTAGE_API_KEY environment variable not set")
  }
}
