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

use crate::endpoints::{fundamentals::FundamentalsEndpoints, SharedRateLimiter};
use crate::transport::Transport;
use dcf_core::{Config, Result};
use dcf_models::StatementSet;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Fundamentals provider client
///
/// Handles authentication, rate limiting and transport concerns for the
/// endpoint groups it hands out.
///
/// # Examples
///
/// ```rust,no_run
/// use dcf_client::FundamentalsClient;
/// use dcf_core::Config;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///   let client = FundamentalsClient::new(Config::from_env()?)?;
///
///   let overview = client.fundamentals().company_overview("IBM").await?;
///   println!("IBM market cap: {:?}", overview.market_capitalization);
///
///   Ok(())
/// }
/// ```
pub struct FundamentalsClient {
  rate_limiter: SharedRateLimiter,
  transport: Arc<Transport>,
}

impl FundamentalsClient {
  /// Create a new client
  ///
  /// # Arguments
  ///
  /// * `config` - Configuration containing API key and other settings
  ///
  /// # Errors
  ///
  /// Returns an error if the HTTP client cannot be created.
  pub fn new(config: Config) -> Result<Self> {
    // a zero rate limit falls back to the default quota
    let rate_limit_value = NonZeroU32::new(config.rate_limit)
      .or_else(|| NonZeroU32::new(dcf_core::DEFAULT_RATE_LIMIT))
      .unwrap_or(NonZeroU32::MIN);
    let quota = Quota::per_minute(rate_limit_value);
    let rate_limiter = Arc::new(RateLimiter::direct(quota));

    Self::with_rate_limiter(config, rate_limiter)
  }

  /// Create a new client with custom rate limiting
  ///
  /// # Errors
  ///
  /// Returns an error if the HTTP client cannot be created.
  pub fn with_rate_limiter(config: Config, rate_limiter: SharedRateLimiter) -> Result<Self> {
    Ok(Self { transport: Arc::new(Transport::new(&config)?), rate_limiter })
  }

  /// Get access to fundamentals endpoints
  pub fn fundamentals(&self) -> FundamentalsEndpoints {
    FundamentalsEndpoints::new(self.transport.clone(), self.rate_limiter.clone())
  }

  /// Fetch everything a valuation run reads for one company: the overview,
  /// the three statements and the latest quote.
  ///
  /// Statement and overview failures are returned. A failed quote request is
  /// logged and leaves `quote` empty.
  #[instrument(skip(self), fields(symbol))]
  pub async fn fetch_statement_set(&self, symbol: &str) -> Result<StatementSet> {
    let endpoints = self.fundamentals();

    let overview = endpoints.company_overview(symbol).await?;
    let income_statement = endpoints.income_statement(symbol).await?;
    let balance_sheet = endpoints.balance_sheet(symbol).await?;
    let cash_flow = endpoints.cash_flow(symbol).await?;
    let quote = match endpoints.global_quote(symbol).await {
      Ok(quote) if !quote.is_empty() => Some(quote),
      Ok(_) => {
        warn!(symbol, "empty quote");
        None
      }
      Err(e) => {
        warn!(symbol, error = %e, "quote unavailable");
        None
      }
    };

    let set = StatementSet { balance_sheet, income_statement, cash_flow, overview, quote };
    for (statement, message) in set.provider_messages() {
      warn!(symbol, statement, message, "provider returned a notice instead of data");
    }
    info!(
      symbol,
      income = set.income_statement.len(),
      balance_sheet = set.balance_sheet.len(),
      cash_flow = set.cash_flow.len(),
      "fetched statement set"
    );
    Ok(set)
  }

  /// Base URL requests are sent to
  pub fn base_url(&self) -> &str {
    self.transport.base_url()
  }
}

impl std::fmt::Debug for FundamentalsClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FundamentalsClient")
      .field("base_url", &self.transport.base_url())
      .field("timeout", &self.transport.timeout())
      .finish_non_exhaustive()
  }
}
