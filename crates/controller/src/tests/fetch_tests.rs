// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{MockAnalytics, coverage_key, wait_until};
use crate::{
    AnalyticsProvider, FetchController, FetchError, FetchSnapshot, FetchStats, FetchStatus,
};
use sanitation_scope::FetchKey;
use sanitation_scope_domain::{FiscalYearId, GeoId, ScopeTier};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

fn create_controller(analytics: &Arc<MockAnalytics>, timeout: Duration) -> FetchController {
    FetchController::new(Arc::clone(analytics) as Arc<dyn AnalyticsProvider>, timeout)
}

fn district_key(id: i64) -> FetchKey {
    FetchKey {
        tier: ScopeTier::District,
        district_id: Some(GeoId(id)),
        block_id: None,
        gp_id: None,
        fiscal_year_id: FiscalYearId(9),
    }
}

fn osian_key() -> FetchKey {
    FetchKey {
        tier: ScopeTier::Block,
        district_id: Some(GeoId(7)),
        block_id: Some(GeoId(71)),
        gp_id: None,
        fiscal_year_id: FiscalYearId(9),
    }
}

#[tokio::test]
async fn test_starts_waiting_at_generation_zero() {
    let analytics: Arc<MockAnalytics> = Arc::new(MockAnalytics::default());
    let controller: FetchController = create_controller(&analytics, Duration::from_secs(5));

    let snapshot: FetchSnapshot = controller.snapshot();

    assert_eq!(snapshot.generation, 0);
    assert_eq!(snapshot.status, FetchStatus::Waiting);
    assert_eq!(controller.generation().await, 0);
}

#[tokio::test]
async fn test_missing_key_waits_without_fetching() {
    let analytics: Arc<MockAnalytics> = Arc::new(MockAnalytics::default());
    let controller: FetchController = create_controller(&analytics, Duration::from_secs(5));

    let generation: u64 = controller.on_key_change(None, "Block (not selected)".to_string()).await;
    controller.settled().await;

    assert_eq!(generation, 1);
    assert_eq!(controller.snapshot().status, FetchStatus::Waiting);
    assert_eq!(analytics.calls(), 0);
    assert_eq!(controller.retry().await, None);
}

#[tokio::test]
async fn test_key_change_publishes_loading_then_ready() {
    let analytics: Arc<MockAnalytics> = Arc::new(MockAnalytics::default());
    let gate: Arc<Notify> = analytics.gate(coverage_key(ScopeTier::Block, Some(71), 9));
    let controller: FetchController = create_controller(&analytics, Duration::from_secs(5));

    let generation: u64 = controller
        .on_key_change(Some(osian_key()), "Block Osian, District Jodhpur".to_string())
        .await;
    assert_eq!(
        controller.snapshot().status,
        FetchStatus::Loading { key: osian_key() }
    );

    gate.notify_one();
    controller.settled().await;

    let snapshot: FetchSnapshot = controller.snapshot();
    assert_eq!(snapshot.generation, generation);
    match snapshot.status {
        FetchStatus::Ready { key, report } => {
            assert_eq!(key, osian_key());
            assert_eq!(report.scope_id, Some(GeoId(71)));
            assert_eq!(report.fiscal_year_id, FiscalYearId(9));
        }
        other => panic!("expected ready, got {other:?}"),
    }
    assert_eq!(
        controller.stats().await,
        FetchStats {
            issued: 1,
            applied: 1,
            discarded: 0,
        }
    );
}

#[tokio::test]
async fn test_burst_applies_only_last_key() {
    let analytics: Arc<MockAnalytics> = Arc::new(MockAnalytics::default());
    let gate_a: Arc<Notify> = analytics.gate(coverage_key(ScopeTier::District, Some(3), 9));
    let gate_b: Arc<Notify> = analytics.gate(coverage_key(ScopeTier::District, Some(7), 9));
    let gate_c: Arc<Notify> = analytics.gate(coverage_key(ScopeTier::Block, Some(71), 9));
    let controller: FetchController = create_controller(&analytics, Duration::from_secs(5));

    controller
        .on_key_change(Some(district_key(3)), "District Ajmer".to_string())
        .await;
    controller
        .on_key_change(Some(district_key(7)), "District Jodhpur".to_string())
        .await;
    let live: u64 = controller
        .on_key_change(Some(osian_key()), "Block Osian, District Jodhpur".to_string())
        .await;
    assert_eq!(live, 3);

    // A and B resolve after C was issued and must not reach the output
    gate_b.notify_one();
    gate_a.notify_one();
    let watched: &FetchController = &controller;
    wait_until(move || async move { watched.stats().await.discarded == 2 }).await;
    assert_eq!(
        controller.snapshot(),
        FetchSnapshot {
            generation: 3,
            status: FetchStatus::Loading { key: osian_key() },
        }
    );

    gate_c.notify_one();
    controller.settled().await;

    let snapshot: FetchSnapshot = controller.snapshot();
    assert_eq!(snapshot.generation, 3);
    assert!(matches!(snapshot.status, FetchStatus::Ready { key, .. } if key == osian_key()));
    assert_eq!(
        controller.stats().await,
        FetchStats {
            issued: 3,
            applied: 1,
            discarded: 2,
        }
    );
}

#[tokio::test]
async fn test_failure_is_retryable_and_retry_recovers() {
    let analytics: Arc<MockAnalytics> = Arc::new(MockAnalytics::default());
    analytics.fail_next(coverage_key(ScopeTier::Block, Some(71), 9), 1);
    let controller: FetchController = create_controller(&analytics, Duration::from_secs(5));

    controller
        .on_key_change(Some(osian_key()), "Block Osian, District Jodhpur".to_string())
        .await;
    controller.settled().await;

    match controller.snapshot().status {
        FetchStatus::Failed {
            key,
            scope,
            error,
            retryable,
        } => {
            assert_eq!(key, osian_key());
            assert_eq!(scope, "Block Osian, District Jodhpur");
            assert!(matches!(error, FetchError::Provider { .. }));
            assert!(retryable);
        }
        other => panic!("expected failure, got {other:?}"),
    }

    let generation: Option<u64> = controller.retry().await;
    controller.settled().await;

    assert_eq!(generation, Some(2));
    assert!(matches!(
        controller.snapshot().status,
        FetchStatus::Ready { .. }
    ));
    assert_eq!(analytics.calls(), 2);
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let analytics: Arc<MockAnalytics> = Arc::new(MockAnalytics::default());
    let _never_opened: Arc<Notify> = analytics.gate(coverage_key(ScopeTier::Block, Some(71), 9));
    let controller: FetchController = create_controller(&analytics, Duration::from_millis(20));

    controller
        .on_key_change(Some(osian_key()), "Block Osian, District Jodhpur".to_string())
        .await;
    controller.settled().await;

    match controller.snapshot().status {
        FetchStatus::Failed {
            error, retryable, ..
        } => {
            assert_eq!(error, FetchError::TimedOut { after_ms: 20 });
            assert!(retryable);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_key_change_after_failure_replaces_it() {
    let analytics: Arc<MockAnalytics> = Arc::new(MockAnalytics::default());
    analytics.fail_next(coverage_key(ScopeTier::District, Some(7), 9), 1);
    let controller: FetchController = create_controller(&analytics, Duration::from_secs(5));

    controller
        .on_key_change(Some(district_key(7)), "District Jodhpur".to_string())
        .await;
    controller.settled().await;
    assert!(matches!(
        controller.snapshot().status,
        FetchStatus::Failed { .. }
    ));

    controller
        .on_key_change(Some(osian_key()), "Block Osian, District Jodhpur".to_string())
        .await;
    controller.settled().await;

    assert!(matches!(
        controller.snapshot().status,
        FetchStatus::Ready { key, .. } if key == osian_key()
    ));
    assert_eq!(
        analytics.requested(),
        vec![
            coverage_key(ScopeTier::District, Some(7), 9),
            coverage_key(ScopeTier::Block, Some(71), 9),
        ]
    );
}
