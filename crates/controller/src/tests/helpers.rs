// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-memory providers with call counters and per-key gates.
//!
//! A gated key blocks its provider call until the test calls
//! `Notify::notify_one` on the gate. `notify_one` stores a permit, so a gate
//! may be opened before the provider reaches it.

use crate::{
    AnalyticsProvider, ControllerConfig, CoverageReport, FiscalYearProvider, GeographyProvider,
    ProviderError, ScopeSession, SessionProviders,
};
use async_trait::async_trait;
use sanitation_scope_domain::{
    CollectionKey, FiscalYear, FiscalYearId, GeoId, GeographyNode, OfficerProfile, ScopeTier,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub fn ajmer() -> GeographyNode {
    GeographyNode::root(3, "Ajmer")
}

pub fn jodhpur() -> GeographyNode {
    GeographyNode::root(7, "Jodhpur")
}

pub fn kishangarh() -> GeographyNode {
    GeographyNode::child_of(3, 30, "Kishangarh")
}

pub fn osian() -> GeographyNode {
    GeographyNode::child_of(7, 71, "Osian")
}

pub fn bilara() -> GeographyNode {
    GeographyNode::child_of(7, 72, "Bilara")
}

pub fn tinwari() -> GeographyNode {
    GeographyNode::child_of(71, 712, "Tinwari")
}

pub fn mathania() -> GeographyNode {
    GeographyNode::child_of(71, 713, "Mathania")
}

pub fn create_test_fiscal_years() -> Vec<FiscalYear> {
    vec![
        FiscalYear::new(9, "2024-2025"),
        FiscalYear::new(8, "2023-2024"),
    ]
}

/// Identifies one analytics request.
pub type CoverageKey = (ScopeTier, Option<GeoId>, FiscalYearId);

pub fn coverage_key(tier: ScopeTier, id: Option<i64>, fiscal_year_id: i64) -> CoverageKey {
    (tier, id.map(GeoId), FiscalYearId(fiscal_year_id))
}

#[derive(Default)]
pub struct MockGeography {
    lists: Mutex<HashMap<CollectionKey, Vec<GeographyNode>>>,
    gates: Mutex<HashMap<CollectionKey, Arc<Notify>>>,
    failures: Mutex<HashMap<CollectionKey, usize>>,
    calls: AtomicUsize,
    requested: Mutex<Vec<CollectionKey>>,
}

impl MockGeography {
    /// Ajmer and Jodhpur with their blocks and Osian's GPs.
    pub fn rajasthan() -> Self {
        let geography: Self = Self::default();
        geography.set_list(CollectionKey::Districts, vec![ajmer(), jodhpur()]);
        geography.set_list(
            CollectionKey::Blocks {
                district_id: GeoId(3),
            },
            vec![kishangarh()],
        );
        geography.set_list(
            CollectionKey::Blocks {
                district_id: GeoId(7),
            },
            vec![osian(), bilara()],
        );
        geography.set_list(
            CollectionKey::Gps {
                district_id: GeoId(7),
                block_id: GeoId(71),
            },
            vec![tinwari(), mathania()],
        );
        geography
    }

    pub fn set_list(&self, key: CollectionKey, nodes: Vec<GeographyNode>) {
        self.lists.lock().unwrap().insert(key, nodes);
    }

    /// Holds requests for `key` until the returned gate is notified.
    pub fn gate(&self, key: CollectionKey) -> Arc<Notify> {
        let gate: Arc<Notify> = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(key, Arc::clone(&gate));
        gate
    }

    /// Fails the next `times` requests for `key`.
    pub fn fail_next(&self, key: CollectionKey, times: usize) {
        self.failures.lock().unwrap().insert(key, times);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<CollectionKey> {
        self.requested.lock().unwrap().clone()
    }

    async fn serve(&self, key: CollectionKey) -> Result<Vec<GeographyNode>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(key);

        let gate: Option<Arc<Notify>> = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        {
            let mut failures = self.failures.lock().unwrap();
            let remaining: usize = failures.get(&key).copied().unwrap_or(0);
            if remaining > 0 {
                failures.insert(key, remaining - 1);
                return Err(ProviderError::Request {
                    message: format!("{key} unavailable"),
                });
            }
        }

        self.lists
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                resource: key.to_string(),
            })
    }
}

#[async_trait]
impl GeographyProvider for MockGeography {
    async fn list_districts(&self) -> Result<Vec<GeographyNode>, ProviderError> {
        self.serve(CollectionKey::Districts).await
    }

    async fn list_blocks(&self, district_id: GeoId) -> Result<Vec<GeographyNode>, ProviderError> {
        self.serve(CollectionKey::Blocks { district_id }).await
    }

    async fn list_gps(
        &self,
        district_id: GeoId,
        block_id: GeoId,
    ) -> Result<Vec<GeographyNode>, ProviderError> {
        self.serve(CollectionKey::Gps {
            district_id,
            block_id,
        })
        .await
    }
}

pub struct MockFiscalYears {
    years: Mutex<Vec<FiscalYear>>,
    next_gate: Mutex<Option<Arc<Notify>>>,
    calls: AtomicUsize,
}

impl MockFiscalYears {
    pub fn new(years: Vec<FiscalYear>) -> Self {
        Self {
            years: Mutex::new(years),
            next_gate: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn replace(&self, years: Vec<FiscalYear>) {
        *self.years.lock().unwrap() = years;
    }

    /// Holds the next request until the returned gate is notified.
    ///
    /// The held request answers with the list as it was when it was made.
    pub fn gate_next(&self) -> Arc<Notify> {
        let gate: Arc<Notify> = Arc::new(Notify::new());
        *self.next_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FiscalYearProvider for MockFiscalYears {
    async fn list_active_fiscal_years(&self) -> Result<Vec<FiscalYear>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let years: Vec<FiscalYear> = self.years.lock().unwrap().clone();
        let gate: Option<Arc<Notify>> = self.next_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(years)
    }
}

#[derive(Default)]
pub struct MockAnalytics {
    gates: Mutex<HashMap<CoverageKey, Arc<Notify>>>,
    failures: Mutex<HashMap<CoverageKey, usize>>,
    calls: AtomicUsize,
    requested: Mutex<Vec<CoverageKey>>,
}

impl MockAnalytics {
    /// Holds requests for `key` until the returned gate is notified.
    pub fn gate(&self, key: CoverageKey) -> Arc<Notify> {
        let gate: Arc<Notify> = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(key, Arc::clone(&gate));
        gate
    }

    /// Fails the next `times` requests for `key`.
    pub fn fail_next(&self, key: CoverageKey, times: usize) {
        self.failures.lock().unwrap().insert(key, times);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<CoverageKey> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalyticsProvider for MockAnalytics {
    async fn get_coverage(
        &self,
        tier: ScopeTier,
        id: Option<GeoId>,
        fiscal_year_id: FiscalYearId,
    ) -> Result<CoverageReport, ProviderError> {
        let key: CoverageKey = (tier, id, fiscal_year_id);
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(key);

        let gate: Option<Arc<Notify>> = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        {
            let mut failures = self.failures.lock().unwrap();
            let remaining: usize = failures.get(&key).copied().unwrap_or(0);
            if remaining > 0 {
                failures.insert(key, remaining - 1);
                return Err(ProviderError::Request {
                    message: "analytics backend unavailable".to_string(),
                });
            }
        }

        Ok(CoverageReport {
            tier,
            scope_id: id,
            fiscal_year_id,
            payload: serde_json::json!({
                "total_households": 120,
                "households_with_toilet": 96,
            }),
        })
    }
}

/// A session over mock providers, with handles kept for assertions.
pub struct Harness {
    pub session: ScopeSession,
    pub geography: Arc<MockGeography>,
    pub fiscal_years: Arc<MockFiscalYears>,
    pub analytics: Arc<MockAnalytics>,
}

pub fn create_harness(profile: &OfficerProfile) -> Harness {
    create_harness_with(profile, MockGeography::rajasthan(), MockAnalytics::default())
}

pub fn create_harness_with(
    profile: &OfficerProfile,
    geography: MockGeography,
    analytics: MockAnalytics,
) -> Harness {
    let geography: Arc<MockGeography> = Arc::new(geography);
    let fiscal_years: Arc<MockFiscalYears> =
        Arc::new(MockFiscalYears::new(create_test_fiscal_years()));
    let analytics: Arc<MockAnalytics> = Arc::new(analytics);
    let providers: SessionProviders = SessionProviders {
        geography: Arc::clone(&geography) as Arc<dyn GeographyProvider>,
        fiscal_years: Arc::clone(&fiscal_years) as Arc<dyn FiscalYearProvider>,
        analytics: Arc::clone(&analytics) as Arc<dyn AnalyticsProvider>,
    };
    let config: ControllerConfig =
        ControllerConfig::default().with_fetch_timeout(Duration::from_secs(5));
    let session: ScopeSession = ScopeSession::new(profile, providers, &config).unwrap();
    Harness {
        session,
        geography,
        fiscal_years,
        analytics,
    }
}

/// Polls `condition` until it holds, yielding to spawned tasks in between.
pub async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..500 {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("condition not reached");
}
