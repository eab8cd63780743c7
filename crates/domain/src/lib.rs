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

mod error;
mod fiscal_year;
mod role;
mod types;

#[cfg(test)]
mod tests;

pub use error::DomainError;
pub use fiscal_year::{FiscalYear, FiscalYearId, default_fiscal_year};
pub use role::{FixedScope, OfficerProfile, Role, RoleScopePolicy};
pub use types::{CollectionKey, GeoId, GeographyNode, ScopeEntry, ScopeTier};
