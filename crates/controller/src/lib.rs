// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

//! Asynchronous controllers around the scope selection state machine.
//!
//! - [`GeographyCache`] memoises option lists and de-duplicates in-flight loads
//! - [`FetchController`] issues analytics fetches and drops stale responses
//! - [`ScopeSession`] turns dropdown interactions into cache loads and commits

mod cache;
mod config;
mod error;
mod fetch;
mod provider;
mod session;

#[cfg(test)]
mod tests;

pub use cache::{CollectionState, GeographyCache, GeographyLoad};
pub use config::ControllerConfig;
pub use error::{FetchError, ProviderError};
pub use fetch::{FetchController, FetchSnapshot, FetchStats, FetchStatus};
pub use provider::{
    AnalyticsProvider, CoverageReport, FiscalYearProvider, GeographyProvider, SessionProviders,
};
pub use session::{
    DropdownColumn, DropdownView, FiscalYearLoad, InteractionOutcome, ScopeSession,
};
