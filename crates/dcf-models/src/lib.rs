//! # dcf-models
//!
//! Document types consumed and produced by the DCF toolkit.
//!
//! ## Features
//!
//! - **Provider vocabulary**: statements keep their raw line items keyed by the
//!   provider's field names (`totalRevenue`, `longTermDebt`, ...)
//! - **Lenient shapes**: statement blocks accept the provider envelope, a bare
//!   list, a single report or a provider error object
//! - **Ordered peers**: comparable sets keep peers in document order
//!
//! ## Usage
//!
//! ```ignore
//! use dcf_models::{ComparableSet, StatementSet};
//!
//! let financials: StatementSet = serde_json::from_str(&financials_json)?;
//! let comparables: ComparableSet = serde_json::from_str(&comparables_json)?;
//! ```

#![warn(clippy::all)]

pub mod comparable;
pub mod fundamentals;
pub mod line_items;

pub use comparable::*;
pub use fundamentals::*;
pub use line_items::LineItem;
