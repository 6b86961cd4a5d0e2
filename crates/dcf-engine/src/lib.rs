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

//! # dcf-engine
//!
//! Discounted-cash-flow valuation over fundamentals documents.
//!
//! The pipeline is synchronous and pure: it reads a [`StatementSet`], a
//! [`ComparableSet`] and [`ValuationAssumptions`], and returns a
//! [`ValuationResult`] or a [`ValuationError`]. It performs no I/O and holds no
//! global state, so runs for different companies can proceed in parallel.
//!
//! ## Modules
//!
//! - [`extract`]: raw line item to number, with placeholder handling
//! - [`historical`]: trailing series, OWC, growth and CAGR
//! - [`capital`]: tax rate, cost of debt, size premium
//! - [`peers`]: peer summaries and median multiples
//! - [`valuation`]: the DCF run
//! - [`ratios`]: latest-period financial ratios
//! - [`projection`]: operating projection from historical margins
//!
//! ## Example
//!
//! ```ignore
//! use dcf_core::ValuationAssumptions;
//! use dcf_engine::run;
//!
//! let result = run(&financials, &comparables, &ValuationAssumptions::default())?;
//! println!("{}", result.to_json()?);
//! ```
//!
//! [`StatementSet`]: dcf_models::StatementSet
//! [`ComparableSet`]: dcf_models::ComparableSet
//! [`ValuationAssumptions`]: dcf_core::ValuationAssumptions

pub mod capital;
pub mod error;
pub mod extract;
pub mod historical;
pub mod peers;
pub mod projection;
pub mod ratios;
pub mod result;
pub mod rounding;
pub mod valuation;

pub use error::{Result, ValuationError};
pub use projection::{project, BenchmarkCaps, Projection};
pub use result::{Diagnostic, ValuationResult};
pub use valuation::run;
