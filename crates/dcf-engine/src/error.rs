use thiserror::Error;

/// Failure of a valuation run.
///
/// Missing line items and undefined ratios are not errors: the extractor
/// substitutes zero and ratios become `None` with a diagnostic on the result.
#[derive(Error, Debug)]
pub enum ValuationError {
  /// The input documents cannot support a run (no reports, too few periods)
  #[error("Precondition failed: {0}")]
  Precondition(String),

  /// The caller's assumptions are unusable
  #[error("Invalid configuration: {0}")]
  Configuration(String),

  /// Error raised by the shared core
  #[error(transparent)]
  Core(dcf_core::Error),
}

impl From<dcf_core::Error> for ValuationError {
  fn from(err: dcf_core::Error) -> Self {
    match err {
      dcf_core::Error::Config(msg) => ValuationError::Configuration(msg),
      other => ValuationError::Core(other),
    }
  }
}

/// Result type alias for valuation runs
pub type Result<T> = std::result::Result<T, ValuationError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_config_error_becomes_configuration() {
    let err: ValuationError = dcf_core::Error::Config("horizon is zero".to_string()).into();
    assert!(matches!(err, ValuationError::Configuration(ref m) if m == "horizon is zero"));
    assert_eq!(err.to_string(), "Invalid configuration: horizon is zero");
  }

  #[test]
  fn test_other_core_errors_pass_through() {
    let err: ValuationError = dcf_core::Error::Parse("bad".to_string()).into();
    assert!(matches!(err, ValuationError::Core(_)));
    assert_eq!(err.to_string(), "Parse error: bad");
  }

  #[test]
  fn test_precondition_display() {
    let err = ValuationError::Precondition("no income statement reports".to_string());
    assert_eq!(err.to_string(), "Precondition failed: no income statement reports");
  }
}
