// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Generation-gated analytics fetches.
//!
//! Each key change opens a new generation. A response is applied only when
//! its generation is still live, so for a burst of key changes A → B → C
//! only C's result is ever published. Transport-level abort is not needed;
//! stale responses are counted and dropped.

use crate::error::FetchError;
use crate::provider::{AnalyticsProvider, CoverageReport};
use sanitation_scope::FetchKey;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What the rendering collaborators should show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchStatus {
    /// No location selected yet. Not an error.
    Waiting,
    /// A request for `key` is in flight.
    Loading {
        /// The key being fetched.
        key: FetchKey,
    },
    /// The report for `key` arrived.
    Ready {
        /// The key the report belongs to.
        key: FetchKey,
        /// The report.
        report: CoverageReport,
    },
    /// The request for `key` failed.
    Failed {
        /// The key that failed.
        key: FetchKey,
        /// Human-readable scope of the key, e.g. `Block Osian, District Jodhpur`.
        scope: String,
        /// The failure.
        error: FetchError,
        /// Whether `retry` is offered.
        retryable: bool,
    },
}

/// The published output, tagged with the generation that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchSnapshot {
    /// The generation that produced this output.
    pub generation: u64,
    /// The output.
    pub status: FetchStatus,
}

/// Request counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FetchStats {
    /// Requests sent to the analytics provider.
    pub issued: u64,
    /// Responses published because their generation was live.
    pub applied: u64,
    /// Responses dropped because a newer generation had started.
    pub discarded: u64,
}

struct LiveGeneration {
    generation: u64,
    key: Option<FetchKey>,
    scope: String,
    stats: FetchStats,
    in_flight: Vec<JoinHandle<()>>,
}

struct Inner {
    analytics: Arc<dyn AnalyticsProvider>,
    timeout: Duration,
    live: Mutex<LiveGeneration>,
    output: watch::Sender<FetchSnapshot>,
}

/// Issues one analytics request per key change and publishes only the live one.
#[derive(Clone)]
pub struct FetchController {
    inner: Arc<Inner>,
}

impl FetchController {
    /// Creates a controller publishing `Waiting` at generation 0.
    #[must_use]
    pub fn new(analytics: Arc<dyn AnalyticsProvider>, timeout: Duration) -> Self {
        let (output, _rx) = watch::channel(FetchSnapshot {
            generation: 0,
            status: FetchStatus::Waiting,
        });
        Self {
            inner: Arc::new(Inner {
                analytics,
                timeout,
                live: Mutex::new(LiveGeneration {
                    generation: 0,
                    key: None,
                    scope: String::new(),
                    stats: FetchStats::default(),
                    in_flight: Vec::new(),
                }),
                output,
            }),
        }
    }

    /// Starts a new generation for `key`.
    ///
    /// `None` publishes `Waiting` without fetching. Otherwise one request is
    /// spawned and `Loading` is published until it settles.
    ///
    /// # Arguments
    ///
    /// * `key` - The derived key, or `None` while waiting for a location
    /// * `scope` - Human-readable scope used in failure messages
    ///
    /// # Returns
    ///
    /// The new live generation.
    pub async fn on_key_change(&self, key: Option<FetchKey>, scope: String) -> u64 {
        let mut live = self.inner.live.lock().await;
        live.generation += 1;
        live.key = key;
        live.scope = scope;
        let generation: u64 = live.generation;
        live.in_flight.retain(|handle| !handle.is_finished());

        match key {
            None => {
                debug!(generation, "Waiting for a location");
                self.inner.output.send_replace(FetchSnapshot {
                    generation,
                    status: FetchStatus::Waiting,
                });
            }
            Some(key) => {
                info!(generation, %key, "Fetching coverage");
                live.stats.issued += 1;
                self.inner.output.send_replace(FetchSnapshot {
                    generation,
                    status: FetchStatus::Loading { key },
                });
                let handle: JoinHandle<()> = tokio::spawn(run(Arc::clone(&self.inner), generation, key));
                live.in_flight.push(handle);
            }
        }
        generation
    }

    /// Reissues the live key under a new generation.
    ///
    /// Returns `None` when there is nothing to retry.
    pub async fn retry(&self) -> Option<u64> {
        let (key, scope): (Option<FetchKey>, String) = {
            let live = self.inner.live.lock().await;
            (live.key, live.scope.clone())
        };
        match key {
            Some(key) => {
                info!(%key, "Retrying coverage fetch");
                Some(self.on_key_change(Some(key), scope).await)
            }
            None => None,
        }
    }

    /// Returns the current output.
    #[must_use]
    pub fn snapshot(&self) -> FetchSnapshot {
        self.inner.output.borrow().clone()
    }

    /// Subscribes to output changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FetchSnapshot> {
        self.inner.output.subscribe()
    }

    /// Returns the live generation.
    pub async fn generation(&self) -> u64 {
        self.inner.live.lock().await.generation
    }

    /// Returns the request counters.
    pub async fn stats(&self) -> FetchStats {
        self.inner.live.lock().await.stats
    }

    /// Waits until every spawned request, stale or live, has settled.
    pub async fn settled(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut live = self.inner.live.lock().await;
            std::mem::take(&mut live.in_flight)
        };
        for handle in handles {
            if let Err(error) = handle.await {
                warn!(%error, "Coverage fetch task ended abnormally");
            }
        }
    }
}

async fn run(inner: Arc<Inner>, generation: u64, key: FetchKey) {
    let request = inner
        .analytics
        .get_coverage(key.tier, key.scope_id(), key.fiscal_year_id);

    let outcome: Result<CoverageReport, FetchError> =
        match tokio::time::timeout(inner.timeout, request).await {
            Ok(result) => result.map_err(FetchError::from),
            Err(_) => Err(FetchError::TimedOut {
                after_ms: u64::try_from(inner.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        };

    let mut live = inner.live.lock().await;
    if live.generation != generation {
        live.stats.discarded += 1;
        debug!(generation, live = live.generation, %key, "Discarding stale coverage response");
        return;
    }

    live.stats.applied += 1;
    let status: FetchStatus = match outcome {
        Ok(report) => {
            debug!(generation, %key, "Coverage ready");
            FetchStatus::Ready { key, report }
        }
        Err(error) => {
            warn!(generation, %key, %error, "Coverage fetch failed");
            FetchStatus::Failed {
                key,
                scope: live.scope.clone(),
                error,
                retryable: true,
            }
        }
    };
    inner.output.send_replace(FetchSnapshot { generation, status });
}
