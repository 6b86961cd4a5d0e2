//! Endpoint groups of the provider API

pub mod fundamentals;

use crate::transport::Transport;
use dcf_core::Result;
use governor::{
  clock::DefaultClock,
  middleware::NoOpMiddleware,
  state::{InMemoryState, NotKeyed},
  RateLimiter,
};
use std::sync::Arc;

/// Direct (unkeyed) rate limiter shared by every endpoint group of a client
pub type SharedRateLimiter =
  Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>;

/// Base trait for endpoint implementations
///
/// Provides common functionality needed by all endpoint modules
#[allow(async_fn_in_trait)]
pub trait EndpointBase {
  /// Wait for rate limit before making a request
  async fn wait_for_rate_limit(&self) -> Result<()>;

  /// Get a reference to the transport layer
  fn transport(&self) -> &Arc<Transport>;
}

/// Macro to implement the EndpointBase trait for endpoint structs
macro_rules! impl_endpoint_base {
  ($struct_name:ident) => {
    impl EndpointBase for $struct_name {
      async fn wait_for_rate_limit(&self) -> Result<()> {
        self.rate_limiter.until_ready().await;
        Ok(())
      }

      fn transport(&self) -> &Arc<Transport> {
        &self.transport
      }
    }
  };
}

pub(crate) use impl_endpoint_base;
