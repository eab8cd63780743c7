// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The dropdown interaction controller.
//!
//! A `ScopeSession` is owned by one mounted view. Hovers move the hierarchy
//! cursor and prefetch the next column; clicks commit. After every committed
//! change the fetch key is re-derived, and only a key that differs by value
//! from the last published one starts a new fetch generation.

use crate::cache::{CollectionState, GeographyCache, GeographyLoad};
use crate::config::ControllerConfig;
use crate::error::ProviderError;
use crate::fetch::{FetchController, FetchSnapshot, FetchStats};
use crate::provider::{FiscalYearProvider, SessionProviders};
use sanitation_scope::{
    Command, CoreError, FetchKey, ScopeSelection, TransitionResult, apply, derive_key,
    describe_scope,
};
use sanitation_scope_domain::{
    CollectionKey, DomainError, FiscalYear, FiscalYearId, GeoId, GeographyNode, OfficerProfile,
    RoleScopePolicy, ScopeTier,
};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

/// The result of a user interaction.
///
/// Interactions never fail across this boundary; a rejected one is reported
/// as `Ignored` and leaves the selection untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// The interaction changed the selection.
    Applied {
        /// The fetch generation started by the change, if the key changed.
        generation: Option<u64>,
        /// Lists loaded because of the interaction, in request order.
        loads: Vec<GeographyLoad>,
    },
    /// The role policy or hierarchy does not allow the interaction.
    Ignored {
        /// Why the interaction was ignored.
        reason: CoreError,
    },
}

impl InteractionOutcome {
    /// Returns whether the interaction was applied.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// Returns the fetch generation started by the interaction.
    #[must_use]
    pub const fn generation(&self) -> Option<u64> {
        match self {
            Self::Applied { generation, .. } => *generation,
            Self::Ignored { .. } => None,
        }
    }
}

/// The outcome of loading the fiscal year list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiscalYearLoad {
    /// The loaded years; empty on failure.
    pub years: Vec<FiscalYear>,
    /// The provider error, if the load failed.
    pub error: Option<ProviderError>,
    /// The fetch generation started because the effective year changed.
    pub generation: Option<u64>,
    /// Whether a later reload was issued before this one answered.
    ///
    /// A superseded list is never applied.
    pub superseded: bool,
}

/// One column of the dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownColumn {
    /// The tier this column chooses.
    pub tier: ScopeTier,
    /// The collection shown, once the cursor has reached its parent.
    pub key: Option<CollectionKey>,
    /// The load state of `key`; `Unrequested` while there is no key.
    pub state: CollectionState,
    /// The node the cursor rests on in this column.
    pub highlighted: Option<GeoId>,
}

/// What the dropdown should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownView {
    /// Whether the dropdown is open.
    pub open: bool,
    /// Browsable columns, coarsest first. Empty for village officers.
    pub columns: Vec<DropdownColumn>,
}

struct SessionState {
    selection: ScopeSelection,
    fiscal_years: Vec<FiscalYear>,
    /// The last key handed to the fetch controller; `None` before the first.
    published: Option<Option<FetchKey>>,
    /// Fiscal year loads issued so far; only the latest may apply its list.
    fiscal_year_loads: u64,
}

/// Hierarchical scope selector for one view.
pub struct ScopeSession {
    policy: RoleScopePolicy,
    state: Mutex<SessionState>,
    cache: GeographyCache,
    fiscal_year_provider: Arc<dyn FiscalYearProvider>,
    fetch: FetchController,
}

impl ScopeSession {
    /// Creates a session for the signed-in officer.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile lacks an assignment its role requires.
    pub fn new(
        profile: &OfficerProfile,
        providers: SessionProviders,
        config: &ControllerConfig,
    ) -> Result<Self, DomainError> {
        let policy: RoleScopePolicy = RoleScopePolicy::resolve(profile)?;
        info!(role = %policy.role(), tier = %policy.default_tier(), "Opening scope session");
        Ok(Self {
            state: Mutex::new(SessionState {
                selection: ScopeSelection::for_policy(&policy),
                fiscal_years: Vec::new(),
                published: None,
                fiscal_year_loads: 0,
            }),
            policy,
            cache: GeographyCache::new(providers.geography),
            fiscal_year_provider: providers.fiscal_years,
            fetch: FetchController::new(providers.analytics, config.fetch_timeout),
        })
    }

    /// Loads fiscal years and the first column, then publishes the first key.
    ///
    /// Village officers never touch the geography provider: their key is
    /// derivable from the fixed GP as soon as fiscal years arrive.
    pub async fn start(&self) -> FiscalYearLoad {
        let fiscal_years: FiscalYearLoad = self.load_fiscal_years().await;

        let first_column: Option<CollectionKey> = {
            let mut state = self.state.lock().await;
            if state.published.is_none() {
                self.publish_key(&mut state).await;
            }
            let tier: ScopeTier = state.selection.active_tier();
            self.policy
                .browsable_columns(tier)
                .first()
                .and_then(|column| state.selection.column_key(*column))
        };

        if let Some(key) = first_column {
            self.load_column(key).await;
        }
        fiscal_years
    }

    /// Reloads the fiscal year list.
    ///
    /// A held year missing from the new list is silently replaced by the
    /// list's default; if that changes the key, a new fetch starts. When
    /// reloads overlap, only the last one issued is applied.
    pub async fn load_fiscal_years(&self) -> FiscalYearLoad {
        let request: u64 = {
            let mut state = self.state.lock().await;
            state.fiscal_year_loads += 1;
            state.fiscal_year_loads
        };
        let result: Result<Vec<FiscalYear>, ProviderError> =
            self.fiscal_year_provider.list_active_fiscal_years().await;

        let mut state = self.state.lock().await;
        if request != state.fiscal_year_loads {
            debug!(
                request,
                latest = state.fiscal_year_loads,
                "Discarding superseded fiscal year list"
            );
            let (years, error): (Vec<FiscalYear>, Option<ProviderError>) = match result {
                Ok(years) => (years, None),
                Err(error) => (Vec::new(), Some(error)),
            };
            return FiscalYearLoad {
                years,
                error,
                generation: None,
                superseded: true,
            };
        }

        match result {
            Ok(years) => {
                debug!(count = years.len(), request, "Fiscal years loaded");
                state.fiscal_years.clone_from(&years);
                let command: Command = Command::ReconcileFiscalYears {
                    years: years.clone(),
                };
                let generation: Option<u64> = self
                    .transition(&mut state, command)
                    .await
                    .ok()
                    .and_then(|(generation, _)| generation);
                FiscalYearLoad {
                    years,
                    error: None,
                    generation,
                    superseded: false,
                }
            }
            Err(error) => {
                warn!(%error, "Fiscal year load failed");
                FiscalYearLoad {
                    years: Vec::new(),
                    error: Some(error),
                    generation: None,
                    superseded: false,
                }
            }
        }
    }

    /// Switches the active tier.
    pub async fn set_active_tier(&self, tier: ScopeTier) -> InteractionOutcome {
        self.interact(Command::SetActiveTier { tier }).await
    }

    /// Opens the dropdown at the committed branch.
    pub async fn open_dropdown(&self) -> InteractionOutcome {
        self.interact(Command::OpenDropdown).await
    }

    /// Closes the dropdown without committing (click outside).
    pub async fn close_dropdown(&self) -> InteractionOutcome {
        self.interact(Command::CloseDropdown).await
    }

    /// Hovers a district and prefetches its blocks.
    pub async fn hover_district(&self, node: GeographyNode) -> InteractionOutcome {
        self.interact(Command::HoverDistrict { node }).await
    }

    /// Hovers a block and prefetches its GPs.
    pub async fn hover_block(&self, node: GeographyNode) -> InteractionOutcome {
        self.interact(Command::HoverBlock { node }).await
    }

    /// Commits a district.
    pub async fn click_district(&self, node: GeographyNode) -> InteractionOutcome {
        self.interact(Command::ClickDistrict { node }).await
    }

    /// Commits a block.
    pub async fn click_block(&self, node: GeographyNode) -> InteractionOutcome {
        self.interact(Command::ClickBlock { node }).await
    }

    /// Commits a GP.
    pub async fn click_gp(&self, node: GeographyNode) -> InteractionOutcome {
        self.interact(Command::ClickGp { node }).await
    }

    /// Chooses a fiscal year.
    ///
    /// Before the list has loaded any id is held; the list's arrival then
    /// keeps it or falls back to the default. Once loaded, ids outside the
    /// list are ignored.
    pub async fn set_fiscal_year(&self, fiscal_year_id: FiscalYearId) -> InteractionOutcome {
        {
            let state = self.state.lock().await;
            let listed: bool = state.fiscal_years.iter().any(|year| year.id == fiscal_year_id);
            if !state.fiscal_years.is_empty() && !listed {
                let reason: CoreError = CoreError::UnknownFiscalYear { fiscal_year_id };
                debug!(%reason, "Ignoring interaction");
                return InteractionOutcome::Ignored { reason };
            }
        }
        self.interact(Command::SetFiscalYear { fiscal_year_id }).await
    }

    /// Reconciles the committed block against a freshly loaded block list.
    ///
    /// Called whenever blocks of a district load, and by the shell when an
    /// upstream change replaces a list.
    pub async fn reconcile_blocks(
        &self,
        district_id: GeoId,
        blocks: Vec<GeographyNode>,
    ) -> InteractionOutcome {
        self.interact(Command::ReconcileBlocks {
            district_id,
            blocks,
        })
        .await
    }

    /// Reissues the live fetch after a failure or timeout.
    pub async fn retry(&self) -> Option<u64> {
        self.fetch.retry().await
    }

    /// Reloads the list shown in a dropdown column after it failed.
    ///
    /// Returns `None` when the column is not offered or the cursor has not
    /// reached its parent yet.
    pub async fn retry_column(&self, tier: ScopeTier) -> Option<GeographyLoad> {
        let key: Option<CollectionKey> = {
            let state = self.state.lock().await;
            if self.policy.is_browsable(tier, state.selection.active_tier()) {
                state.selection.column_key(tier)
            } else {
                None
            }
        };
        let Some(key) = key else {
            debug!(%tier, "No column list to retry");
            return None;
        };
        info!(%key, "Retrying geography load");
        Some(self.load_column(key).await)
    }

    /// Returns the role policy.
    #[must_use]
    pub const fn policy(&self) -> &RoleScopePolicy {
        &self.policy
    }

    /// Returns a copy of the current selection.
    pub async fn selection(&self) -> ScopeSelection {
        self.state.lock().await.selection.clone()
    }

    /// Returns the loaded fiscal years.
    pub async fn fiscal_years(&self) -> Vec<FiscalYear> {
        self.state.lock().await.fiscal_years.clone()
    }

    /// Returns the key derived from the current selection.
    pub async fn current_key(&self) -> Option<FetchKey> {
        let state = self.state.lock().await;
        derive_key(&state.selection, &state.fiscal_years)
    }

    /// Returns the fetch output.
    #[must_use]
    pub fn fetch_snapshot(&self) -> FetchSnapshot {
        self.fetch.snapshot()
    }

    /// Subscribes to fetch output changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FetchSnapshot> {
        self.fetch.subscribe()
    }

    /// Returns the fetch counters.
    pub async fn fetch_stats(&self) -> FetchStats {
        self.fetch.stats().await
    }

    /// Waits for every in-flight analytics request to settle.
    pub async fn settled(&self) {
        self.fetch.settled().await;
    }

    /// Returns the columns to render, from the cursor and the cache.
    ///
    /// Only the list under the current cursor is shown, so a prefetch for a
    /// district hovered earlier never displaces the latest hover.
    pub async fn columns(&self) -> DropdownView {
        let selection: ScopeSelection = self.selection().await;
        let mut columns: Vec<DropdownColumn> = Vec::new();
        for tier in self.policy.browsable_columns(selection.active_tier()) {
            let key: Option<CollectionKey> = selection.column_key(tier);
            let state: CollectionState = match key {
                Some(key) => self.cache.state(key).await,
                None => CollectionState::Unrequested,
            };
            let highlighted: Option<GeoId> = match tier {
                ScopeTier::District => selection.cursor().district.as_ref().map(|d| d.id),
                ScopeTier::Block => selection.cursor().block.as_ref().map(|b| b.id),
                ScopeTier::Gp => selection.gp().map(|gp| gp.id),
                ScopeTier::State => None,
            };
            columns.push(DropdownColumn {
                tier,
                key,
                state,
                highlighted,
            });
        }
        DropdownView {
            open: selection.is_dropdown_open(),
            columns,
        }
    }

    async fn interact(&self, command: Command) -> InteractionOutcome {
        let (generation, prefetch): (Option<u64>, Vec<CollectionKey>) = {
            let mut state = self.state.lock().await;
            match self.transition(&mut state, command).await {
                Ok(applied) => applied,
                Err(reason) => return InteractionOutcome::Ignored { reason },
            }
        };

        // The selection lock is released; a click is never queued behind a prefetch
        let mut loads: Vec<GeographyLoad> = Vec::with_capacity(prefetch.len());
        for key in prefetch {
            loads.push(self.load_column(key).await);
        }
        InteractionOutcome::Applied { generation, loads }
    }

    async fn transition(
        &self,
        state: &mut SessionState,
        command: Command,
    ) -> Result<(Option<u64>, Vec<CollectionKey>), CoreError> {
        let name: &'static str = command.name();
        let result: TransitionResult =
            apply(&self.policy, &state.selection, command).inspect_err(|reason| {
                debug!(command = name, %reason, "Ignoring interaction");
            })?;
        debug!(command = name, prefetch = result.prefetch.len(), "Applied interaction");
        state.selection = result.new_selection;
        let generation: Option<u64> = self.publish_key(state).await;
        Ok((generation, result.prefetch))
    }

    /// Hands the derived key to the fetch controller if it changed by value.
    async fn publish_key(&self, state: &mut SessionState) -> Option<u64> {
        let key: Option<FetchKey> = derive_key(&state.selection, &state.fiscal_years);
        if state.published == Some(key) {
            return None;
        }
        state.published = Some(key);
        let scope: String = describe_scope(&state.selection);
        Some(self.fetch.on_key_change(key, scope).await)
    }

    async fn load_column(&self, key: CollectionKey) -> GeographyLoad {
        let load: GeographyLoad = self.cache.load(key).await;
        if let (CollectionKey::Blocks { district_id }, true) = (key, load.is_ok()) {
            let mut state = self.state.lock().await;
            let command: Command = Command::ReconcileBlocks {
                district_id,
                blocks: load.nodes.to_vec(),
            };
            if let Err(reason) = self.transition(&mut state, command).await {
                warn!(%reason, "Block reconciliation rejected");
            }
        }
        load
    }
}
