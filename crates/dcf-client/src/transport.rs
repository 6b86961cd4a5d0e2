//! HTTP transport layer for fundamentals provider requests

use dcf_core::{Config, Error, FuncType, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// HTTP transport layer for making requests to the provider API
pub struct Transport {
  client: Client,
  base_url: String,
  api_key: String,
  timeout: Duration,
  max_retries: u32,
}

impl Transport {
  /// Create a new transport instance
  pub fn new(config: &Config) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .user_agent("dcf-client/0.1.0")
      .build()
      .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Self {
      client,
      base_url: config.base_url.trim_end_matches('/').to_string(),
      api_key: config.api_key.clone(),
      timeout: Duration::from_secs(config.timeout_secs),
      max_retries: config.max_retries,
    })
  }

  /// Create a mock transport for testing
  #[cfg(test)]
  pub fn new_mock() -> Self {
    Self {
      client: Client::new(),
      base_url: "https://mock.alphavantage.co".to_string(),
      api_key: "test_key".to_string(),
      timeout: Duration::from_secs(30),
      max_retries: 3,
    }
  }

  /// Make a GET request to the provider API
  ///
  /// Transport failures and non-success statuses are retried up to
  /// `max_retries` times, waiting `backoff` between attempts. Provider error
  /// bodies and unparseable bodies are returned immediately.
  #[instrument(skip(self, params), fields(function = %function))]
  pub async fn get<T>(&self, function: FuncType, params: HashMap<String, String>) -> Result<T>
  where
    T: DeserializeOwned,
  {
    let url = self.build_url(function, params)?;
    debug!(url = %redact(&url, &self.api_key), "sending request");

    let mut last_error = Error::Http("no request attempted".to_string());
    for attempt in 0..=self.max_retries {
      if attempt > 0 {
        let delay = backoff(attempt);
        warn!(attempt, delay_ms = delay.as_millis() as u64, "retrying request");
        tokio::time::sleep(delay).await;
      }

      match self.make_request(&url).await {
        Ok(response) => return self.decode(function, response).await,
        Err(e) => {
          warn!(attempt, error = %e, "request failed");
          last_error = e;
        }
      }
    }

    Err(last_error)
  }

  /// Read a successful response body into `T`
  async fn decode<T>(&self, function: FuncType, response: Response) -> Result<T>
  where
    T: DeserializeOwned,
  {
    let text = response
      .text()
      .await
      .map_err(|e| Error::Http(format!("Failed to read response body: {}", e)))?;
    debug!(bytes = text.len(), "response body");

    self.check_api_error(&text)?;

    serde_json::from_str::<T>(&text)
      .map(|data| {
        info!("parsed {} response", function);
        data
      })
      .map_err(|e| {
        error!(body = preview(&text, 500), "failed to parse {} response: {}", function, e);
        Error::Parse(format!("Failed to parse response: {}. Response: {}", e, preview(&text, 200)))
      })
  }

  /// Build the full URL for an API request
  fn build_url(&self, function: FuncType, mut params: HashMap<String, String>) -> Result<String> {
    let mut url = Url::parse(&format!("{}/query", self.base_url))
      .map_err(|e| Error::Http(format!("Invalid base URL: {}", e)))?;

    params.insert("function".to_string(), function.to_string());
    params.insert("apikey".to_string(), self.api_key.clone());

    // sorted so the same request always yields the same URL
    let mut pairs: Vec<(String, String)> = params.into_iter().collect();
    pairs.sort();
    {
      let mut query_pairs = url.query_pairs_mut();
      for (key, value) in &pairs {
        query_pairs.append_pair(key, value);
      }
    }

    Ok(url.to_string())
  }

  /// Make the actual HTTP request
  async fn make_request(&self, url: &str) -> Result<Response> {
    let response = self
      .client
      .get(url)
      .send()
      .await
      .map_err(|e| Error::Http(format!("Request failed: {}", e)))?;

    let status = response.status();

    if status.is_success() {
      debug!("Request successful with status: {}", status);
      Ok(response)
    } else {
      error!("Request failed with status: {}", status);
      Err(Error::Http(format!("HTTP error: {}", status)))
    }
  }

  /// Check for provider error messages in the response
  fn check_api_error(&self, response_text: &str) -> Result<()> {
    if response_text.contains("Error Message") {
      if let Ok(error_response) = serde_json::from_str::<HashMap<String, String>>(response_text) {
        if let Some(error_msg) = error_response.get("Error Message") {
          return Err(Error::Api(error_msg.clone()));
        }
      }
    }

    if response_text.contains("API call frequency")
      || response_text.contains("higher API call frequency")
      || response_text.contains("API rate limit")
    {
      return Err(Error::RateLimit("API call frequency limit exceeded".to_string()));
    }

    if response_text.contains("Invalid API call") || response_text.contains("Invalid API key") {
      return Err(Error::ApiKey("Invalid API key or unauthorized request".to_string()));
    }

    if response_text.contains("Invalid function") {
      return Err(Error::Api("Invalid function parameter".to_string()));
    }

    Ok(())
  }

  /// Get the base URL being used
  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Get request timeout duration
  pub fn timeout(&self) -> Duration {
    self.timeout
  }
}

const MAX_BACKOFF_EXPONENT: u32 = 6;

/// Wait before retry `attempt`: 2s, 4s, 8s, ... capped at 64s
fn backoff(attempt: u32) -> Duration {
  Duration::from_secs(1_u64 << attempt.min(MAX_BACKOFF_EXPONENT))
}

fn preview(text: &str, max_chars: usize) -> &str {
  match text.char_indices().nth(max_chars) {
    Some((idx, _)) => &text[..idx],
    None => text,
  }
}

/// The URL with the API key masked, for logging
fn redact(url: &str, api_key: &str) -> String {
  if api_key.is_empty() {
    url.to_string()
  } else {
    url.replace(api_key, "***")
  }
}
