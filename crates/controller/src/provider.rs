// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Contracts of the external collaborators the controllers consume.
//!
//! Every provider error is caught at this boundary and turned into a result
//! shape (`GeographyLoad`, `FetchStatus::Failed`); nothing propagates past
//! the controllers as an `Err`.

use crate::error::ProviderError;
use async_trait::async_trait;
use sanitation_scope_domain::{FiscalYear, FiscalYearId, GeoId, GeographyNode, ScopeTier};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Source of district, block, and GP option lists.
#[async_trait]
pub trait GeographyProvider: Send + Sync {
    /// Lists every district of the state.
    async fn list_districts(&self) -> Result<Vec<GeographyNode>, ProviderError>;

    /// Lists the blocks of a district.
    async fn list_blocks(&self, district_id: GeoId) -> Result<Vec<GeographyNode>, ProviderError>;

    /// Lists the GPs of a block.
    async fn list_gps(
        &self,
        district_id: GeoId,
        block_id: GeoId,
    ) -> Result<Vec<GeographyNode>, ProviderError>;
}

/// Source of the fiscal years open for reporting.
#[async_trait]
pub trait FiscalYearProvider: Send + Sync {
    /// Lists active fiscal years, most recent first.
    async fn list_active_fiscal_years(&self) -> Result<Vec<FiscalYear>, ProviderError>;
}

/// Source of coverage analytics.
#[async_trait]
pub trait AnalyticsProvider: Send + Sync {
    /// Fetches the coverage report for a place.
    ///
    /// `id` is `None` for state-wide reports.
    async fn get_coverage(
        &self,
        tier: ScopeTier,
        id: Option<GeoId>,
        fiscal_year_id: FiscalYearId,
    ) -> Result<CoverageReport, ProviderError>;
}

/// A coverage report as returned by the analytics backend.
///
/// The payload holds breakdowns one tier below `tier` (e.g.
/// `block_wise_coverage` for a district). It is opaque to the controllers
/// and handed to rendering and export collaborators unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// The tier the report was computed for.
    pub tier: ScopeTier,
    /// The place the report was computed for.
    pub scope_id: Option<GeoId>,
    /// The fiscal year the report covers.
    pub fiscal_year_id: FiscalYearId,
    /// The report body.
    pub payload: serde_json::Value,
}

/// The providers a session talks to.
#[derive(Clone)]
pub struct SessionProviders {
    /// Geography option lists.
    pub geography: Arc<dyn GeographyProvider>,
    /// Fiscal year list.
    pub fiscal_years: Arc<dyn FiscalYearProvider>,
    /// Coverage analytics.
    pub analytics: Arc<dyn AnalyticsProvider>,
}
