//! Documents on disk, named `<TICKER>_<kind>` inside a data directory.

use anyhow::{Context, Result};
use dcf_models::{ComparableSet, StatementSet};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct DataDir<'a> {
  dir: &'a Path,
}

impl<'a> DataDir<'a> {
  pub fn new(dir: &'a Path) -> Self {
    Self { dir }
  }

  pub fn financials(&self, ticker: &str) -> PathBuf {
    self.dir.join(format!("{ticker}_financials.json"))
  }

  pub fn comparable_analysis(&self, ticker: &str) -> PathBuf {
    self.dir.join(format!("{ticker}_comparable_analysis.json"))
  }

  pub fn valuation(&self, ticker: &str) -> PathBuf {
    self.dir.join(format!("{ticker}_valuation.json"))
  }

  pub fn calculation_log(&self, ticker: &str) -> PathBuf {
    self.dir.join(format!("{ticker}_calculation_data.txt"))
  }

  pub fn load_statement_set(&self, ticker: &str) -> Result<StatementSet> {
    read_json(&self.financials(ticker))
  }

  /// The comparable document, or an empty set when none was fetched
  pub fn load_comparable_set(&self, ticker: &str) -> Result<ComparableSet> {
    let path = self.comparable_analysis(ticker);
    if !path.exists() {
      warn!(path = %path.display(), "no comparable analysis; peer figures will be empty");
      return Ok(ComparableSet::default());
    }
    read_json(&path)
  }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
  let content =
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
  let content = serde_json::to_string_pretty(value)?;
  write_text(path, &content)
}

/// Write `content`, creating the parent directory if needed
pub fn write_text(path: &Path, content: &str) -> Result<()> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)
      .with_context(|| format!("Failed to create directory {}", parent.display()))?;
  }
  fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
  info!(path = %path.display(), "wrote");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use tempfile::tempdir;

  #[test]
  fn test_document_names() {
    let data = DataDir::new(Path::new("data"));
    assert_eq!(data.financials("IBM"), Path::new("data/IBM_financials.json"));
    assert_eq!(data.comparable_analysis("IBM"), Path::new("data/IBM_comparable_analysis.json"));
    assert_eq!(data.valuation("IBM"), Path::new("data/IBM_valuation.json"));
    assert_eq!(data.calculation_log("IBM"), Path::new("data/IBM_calculation_data.txt"));
  }

  #[test]
  fn test_round_trip_through_nested_dir() {
    let tmp = tempdir().unwrap();
    let nested = tmp.path().join("a").join("b");
    let data = DataDir::new(&nested);

    let doc = json!({"income_statement": {"annualReports": [{"fiscalDateEnding": "2024-12-31"}]}});
    write_json(&data.financials("IBM"), &doc).unwrap();

    let set = data.load_statement_set("IBM").unwrap();
    assert_eq!(set.income_statement.len(), 1);
  }

  #[test]
  fn test_missing_comparables_are_empty() {
    let tmp = tempdir().unwrap();
    let set = DataDir::new(tmp.path()).load_comparable_set("IBM").unwrap();
    assert!(set.peers.is_empty());
  }

  #[test]
  fn test_missing_financials_names_the_file() {
    let tmp = tempdir().unwrap();
    let err = DataDir::new(tmp.path()).load_statement_set("IBM").unwrap_err();
    assert!(err.to_string().contains("IBM_financials.json"));
  }

  #[test]
  fn test_malformed_financials() {
    let tmp = tempdir().unwrap();
    let data = DataDir::new(tmp.path());
    write_text(&data.financials("IBM"), "{not json").unwrap();
    let err = data.load_statement_set("IBM").unwrap_err();
    assert!(err.to_string().starts_with("Failed to parse"));
  }
}
