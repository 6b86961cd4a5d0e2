//! Company fundamentals: overview, the three statements and the latest quote

use super::{impl_endpoint_base, EndpointBase, SharedRateLimiter};
use crate::transport::Transport;
use dcf_core::{FuncType, Result};
use dcf_models::{GlobalQuote, Overview, StatementReports};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// Fundamental data endpoints for company financial information
pub struct FundamentalsEndpoints {
  transport: Arc<Transport>,
  rate_limiter: SharedRateLimiter,
}

impl_endpoint_base!(FundamentalsEndpoints);

impl FundamentalsEndpoints {
  /// Create a new fundamentals endpoints instance
  pub fn new(transport: Arc<Transport>, rate_limiter: SharedRateLimiter) -> Self {
    Self { transport, rate_limiter }
  }

  /// Company profile: name, sector, market capitalization, shares, beta
  ///
  /// # Arguments
  ///
  /// * `symbol` - The stock symbol (e.g., "IBM")
  #[instrument(skip(self), fields(symbol))]
  pub async fn company_overview(&self, symbol: &str) -> Result<Overview> {
    self.symbol_request(FuncType::Overview, symbol).await
  }

  /// Get annual and quarterly income statements
  ///
  /// # Arguments
  ///
  /// * `symbol` - The stock symbol
  ///
  /// # Examples
  ///
  /// ```rust,no_run
  /// # use dcf_client::{Config, FundamentalsClient};
  /// # async fn run() -> dcf_client::Result<()> {
  /// # let client = FundamentalsClient::new(Config::from_env()?)?;
  /// let income_statement = client.fundamentals().income_statement("IBM").await?;
  /// for report in income_statement.annual_newest_first() {
  ///   println!("{:?}: {:?}", report.period_end(), report.get("totalRevenue"));
  /// }
  /// # Ok(())
  /// # }
  /// ```
  #[instrument(skip(self), fields(symbol))]
  pub async fn income_statement(&self, symbol: &str) -> Result<StatementReports> {
    self.symbol_request(FuncType::IncomeStatement, symbol).await
  }

  /// Get annual and quarterly balance sheets
  ///
  /// # Arguments
  ///
  /// * `symbol` - The stock symbol
  #[instrument(skip(self), fields(symbol))]
  pub async fn balance_sheet(&self, symbol: &str) -> Result<StatementReports> {
    self.symbol_request(FuncType::BalanceSheet, symbol).await
  }

  /// Get annual and quarterly cash flow statements
  ///
  /// # Arguments
  ///
  /// * `symbol` - The stock symbol
  #[instrument(skip(self), fields(symbol))]
  pub async fn cash_flow(&self, symbol: &str) -> Result<StatementReports> {
    self.symbol_request(FuncType::CashFlow, symbol).await
  }

  /// Latest trading-day quote
  #[instrument(skip(self), fields(symbol))]
  pub async fn global_quote(&self, symbol: &str) -> Result<GlobalQuote> {
    self.symbol_request(FuncType::GlobalQuote, symbol).await
  }

  async fn symbol_request<T>(&self, function: FuncType, symbol: &str) -> Result<T>
  where
    T: serde::de::DeserializeOwned,
  {
    self.wait_for_rate_limit().await?;

    let mut params = HashMap::new();
    params.insert("symbol".to_string(), symbol.to_string());

    self.transport().get(function, params).await
  }
}
