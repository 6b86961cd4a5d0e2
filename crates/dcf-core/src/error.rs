use thiserror::Error;

/// The main error type for dcf-* crates
#[derive(Error, Debug)]
pub enum Error {
  /// Environment variable error
  #[error("Environment variable error: {0}")]
  EnvVar(#[from] std::env::VarError),

  /// Configuration error
  #[error("Configuration error: {0}")]
  Config(String),

  /// API key error
  #[error("Failed to retrieve API key: {0}")]
  ApiKey(String),

  /// Serialization/Deserialization error
  #[error("Serialization error: {0}")]
  Serde(#[from] serde_json::Error),

  /// File access error
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  /// Missing required field in response
  #[error("Missing required field: {0}")]
  MissingField(String),

  /// API rate limit exceeded
  #[error("Rate limit exceeded: {0}")]
  RateLimit(String),

  /// Invalid response from API
  #[error("Invalid API response: {0}")]
  InvalidResponse(String),

  /// HTTP transport error
  #[error("HTTP error: {0}")]
  Http(String),

  /// API error from the fundamentals provider
  #[error("API error: {0}")]
  Api(String),

  /// Parse error for data processing
  #[error("Parse error: {0}")]
  Parse(String),
}

/// Result type alias for dcf-* crates
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_display_config() {
    let err = Error::Config("forecast_horizon must be at least 1".to_string());
    assert_eq!(err.to_string(), "Configuration error: forecast_horizon must be at least 1");
  }

  #[test]
  fn test_error_display_rate_limit() {
    let err = Error::RateLimit("API call frequency limit exceeded".to_string());
    assert_eq!(err.to_string(), "Rate limit exceeded: API call frequency limit exceeded");
  }

  #[test]
  fn test_error_from_serde() {
    let serde_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err: Error = serde_err.into();
    assert!(matches!(err, Error::Serde(_)));
  }
}
