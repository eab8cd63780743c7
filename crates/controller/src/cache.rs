// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Memoised geography option lists.
//!
//! Geography is static reference data for a session, so a list is cached
//! forever once it loads. Concurrent loads of one key share a single
//! provider request. A failure is remembered only until the next attempt,
//! which always goes back to the provider.

use crate::error::ProviderError;
use crate::provider::GeographyProvider;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use sanitation_scope_domain::{CollectionKey, GeographyNode};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, warn};

type SharedLoad = Shared<BoxFuture<'static, Result<Arc<[GeographyNode]>, ProviderError>>>;

enum Slot {
    /// The list has loaded; never replaced afterwards.
    Ready(Arc<[GeographyNode]>),
    /// A provider request is in flight.
    Pending { attempt: u64, load: SharedLoad },
    /// The last attempt failed.
    Failed(ProviderError),
}

/// What the cache currently holds for one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionState {
    /// The collection has never been requested.
    Unrequested,
    /// A provider request is in flight.
    Loading,
    /// The last attempt failed; a retry issues a new request.
    Failed {
        /// The provider error of the last attempt.
        error: ProviderError,
    },
    /// The list has loaded.
    Ready {
        /// The nodes in provider order.
        nodes: Arc<[GeographyNode]>,
    },
}

/// The outcome of a cache load.
///
/// A failed load yields an empty list plus the error, so callers can render
/// an empty column with an inline retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeographyLoad {
    /// The collection that was loaded.
    pub key: CollectionKey,
    /// The nodes in provider order; empty on failure.
    pub nodes: Arc<[GeographyNode]>,
    /// The provider error, if the load failed.
    pub error: Option<ProviderError>,
}

impl GeographyLoad {
    fn ready(key: CollectionKey, nodes: Arc<[GeographyNode]>) -> Self {
        Self {
            key,
            nodes,
            error: None,
        }
    }

    fn failed(key: CollectionKey, error: ProviderError) -> Self {
        Self {
            key,
            nodes: Arc::from(Vec::new()),
            error: Some(error),
        }
    }

    /// Returns whether the load succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Keyed loader for district, block, and GP lists.
pub struct GeographyCache {
    provider: Arc<dyn GeographyProvider>,
    slots: Mutex<HashMap<CollectionKey, Slot>>,
    next_attempt: AtomicU64,
}

impl GeographyCache {
    /// Creates an empty cache over `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn GeographyProvider>) -> Self {
        Self {
            provider,
            slots: Mutex::new(HashMap::new()),
            next_attempt: AtomicU64::new(0),
        }
    }

    /// Loads a collection, reusing a cached list or a pending request.
    ///
    /// The cache lock is never held while the provider is awaited.
    pub async fn load(&self, key: CollectionKey) -> GeographyLoad {
        let (attempt, load): (u64, SharedLoad) = {
            let mut slots = self.slots.lock().await;
            match slots.get(&key) {
                Some(Slot::Ready(nodes)) => return GeographyLoad::ready(key, Arc::clone(nodes)),
                Some(Slot::Pending { attempt, load }) => {
                    debug!(%key, "Joining pending geography load");
                    (*attempt, load.clone())
                }
                None | Some(Slot::Failed(_)) => {
                    let attempt: u64 = self.next_attempt.fetch_add(1, Ordering::Relaxed);
                    let load: SharedLoad = request(Arc::clone(&self.provider), key)
                        .boxed()
                        .shared();
                    slots.insert(
                        key,
                        Slot::Pending {
                            attempt,
                            load: load.clone(),
                        },
                    );
                    debug!(%key, attempt, "Requesting geography collection");
                    (attempt, load)
                }
            }
        };

        let outcome: Result<Arc<[GeographyNode]>, ProviderError> = load.await;

        let mut slots = self.slots.lock().await;
        // Only the first waiter to return settles the slot for this attempt
        let settles: bool = matches!(
            slots.get(&key),
            Some(Slot::Pending { attempt: pending, .. }) if *pending == attempt
        );
        match outcome {
            Ok(nodes) => {
                if settles {
                    debug!(%key, count = nodes.len(), "Cached geography collection");
                    slots.insert(key, Slot::Ready(Arc::clone(&nodes)));
                }
                GeographyLoad::ready(key, nodes)
            }
            Err(error) => {
                if settles {
                    warn!(%key, %error, "Geography load failed");
                    slots.insert(key, Slot::Failed(error.clone()));
                }
                GeographyLoad::failed(key, error)
            }
        }
    }

    /// Returns what the cache holds for `key` without triggering a load.
    pub async fn state(&self, key: CollectionKey) -> CollectionState {
        match self.slots.lock().await.get(&key) {
            None => CollectionState::Unrequested,
            Some(Slot::Pending { .. }) => CollectionState::Loading,
            Some(Slot::Failed(error)) => CollectionState::Failed {
                error: error.clone(),
            },
            Some(Slot::Ready(nodes)) => CollectionState::Ready {
                nodes: Arc::clone(nodes),
            },
        }
    }
}

async fn request(
    provider: Arc<dyn GeographyProvider>,
    key: CollectionKey,
) -> Result<Arc<[GeographyNode]>, ProviderError> {
    let nodes: Vec<GeographyNode> = match key {
        CollectionKey::Districts => provider.list_districts().await?,
        CollectionKey::Blocks { district_id } => provider.list_blocks(district_id).await?,
        CollectionKey::Gps {
            district_id,
            block_id,
        } => provider.list_gps(district_id, block_id).await?,
    };
    let stray: Option<&GeographyNode> = key
        .parent()
        .and_then(|parent| nodes.iter().find(|node| !node.belongs_to(parent)));
    if let Some(node) = stray {
        return Err(ProviderError::InvalidResponse {
            message: format!("{} {} is not part of {key}", node.name, node.id),
        });
    }
    Ok(Arc::from(nodes))
}
