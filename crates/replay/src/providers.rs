// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Providers that answer from a fixture after a simulated delay.

use crate::fixture::{CoverageTarget, Fixture};
use async_trait::async_trait;
use sanitation_scope_controller::{
    AnalyticsProvider, CoverageReport, FiscalYearProvider, GeographyProvider, ProviderError,
    SessionProviders,
};
use sanitation_scope_domain::{FiscalYear, FiscalYearId, GeoId, GeographyNode, ScopeTier};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Answers every provider contract from one fixture.
pub struct FixtureProviders {
    fixture: Arc<Fixture>,
    latency: Duration,
}

impl FixtureProviders {
    /// Wraps a fixture; every call sleeps for `latency` first.
    #[must_use]
    pub const fn new(fixture: Arc<Fixture>, latency: Duration) -> Self {
        Self { fixture, latency }
    }

    /// Hands the same instance to a session as all three providers.
    #[must_use]
    pub fn into_session_providers(self) -> SessionProviders {
        let shared: Arc<Self> = Arc::new(self);
        SessionProviders {
            geography: Arc::clone(&shared) as Arc<dyn GeographyProvider>,
            fiscal_years: Arc::clone(&shared) as Arc<dyn FiscalYearProvider>,
            analytics: shared,
        }
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn children(nodes: &[GeographyNode], parent: GeoId) -> Vec<GeographyNode> {
        nodes
            .iter()
            .filter(|node| node.parent_id == Some(parent))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl GeographyProvider for FixtureProviders {
    async fn list_districts(&self) -> Result<Vec<GeographyNode>, ProviderError> {
        self.delay().await;
        Ok(self.fixture.districts.clone())
    }

    async fn list_blocks(&self, district_id: GeoId) -> Result<Vec<GeographyNode>, ProviderError> {
        self.delay().await;
        debug!(%district_id, "Serving fixture blocks");
        Ok(Self::children(&self.fixture.blocks, district_id))
    }

    async fn list_gps(
        &self,
        _district_id: GeoId,
        block_id: GeoId,
    ) -> Result<Vec<GeographyNode>, ProviderError> {
        self.delay().await;
        debug!(%block_id, "Serving fixture GPs");
        Ok(Self::children(&self.fixture.gps, block_id))
    }
}

#[async_trait]
impl FiscalYearProvider for FixtureProviders {
    async fn list_active_fiscal_years(&self) -> Result<Vec<FiscalYear>, ProviderError> {
        self.delay().await;
        Ok(self
            .fixture
            .fiscal_years
            .iter()
            .filter(|year| year.active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AnalyticsProvider for FixtureProviders {
    async fn get_coverage(
        &self,
        tier: ScopeTier,
        id: Option<GeoId>,
        fiscal_year_id: FiscalYearId,
    ) -> Result<CoverageReport, ProviderError> {
        self.delay().await;
        let target: CoverageTarget = CoverageTarget { tier, id };
        if self.fixture.failing.contains(&target) {
            return Err(ProviderError::Request {
                message: format!("coverage backend rejected {tier} {id:?}"),
            });
        }

        self.fixture
            .coverage
            .iter()
            .find(|entry| entry.tier == tier && entry.id == id)
            .map(|entry| CoverageReport {
                tier,
                scope_id: id,
                fiscal_year_id,
                payload: entry.payload.clone(),
            })
            .ok_or_else(|| ProviderError::NotFound {
                resource: format!("{tier} coverage for {id:?}"),
            })
    }
}
