// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Canonical fetch key derivation.
//!
//! Every analytics or report fetch is keyed by a [`FetchKey`]. Keys are
//! compared by value, so re-deriving from an unchanged selection never
//! triggers a second fetch.

use crate::state::ScopeSelection;
use sanitation_scope_domain::{
    FiscalYear, FiscalYearId, GeoId, ScopeTier, default_fiscal_year,
};
use serde::{Deserialize, Serialize};

/// The canonical key downstream analytics fetches are issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchKey {
    /// The active tier.
    pub tier: ScopeTier,
    /// The district, when the tier names one.
    pub district_id: Option<GeoId>,
    /// The block, when the tier names one.
    pub block_id: Option<GeoId>,
    /// The GP, when the tier names one.
    pub gp_id: Option<GeoId>,
    /// The fiscal year.
    pub fiscal_year_id: FiscalYearId,
}

impl FetchKey {
    /// Returns the id of the place at the key's own tier.
    ///
    /// `None` for state-wide keys.
    #[must_use]
    pub const fn scope_id(&self) -> Option<GeoId> {
        match self.tier {
            ScopeTier::State => None,
            ScopeTier::District => self.district_id,
            ScopeTier::Block => self.block_id,
            ScopeTier::Gp => self.gp_id,
        }
    }
}

impl std::fmt::Display for FetchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.scope_id() {
            Some(id) => write!(f, "{}:{id}@fy{}", self.tier, self.fiscal_year_id),
            None => write!(f, "{}@fy{}", self.tier, self.fiscal_year_id),
        }
    }
}

/// Returns the fiscal year a fetch should use: the held one, else the default.
#[must_use]
pub fn resolve_fiscal_year(
    held: Option<FiscalYearId>,
    years: &[FiscalYear],
) -> Option<FiscalYearId> {
    held.or_else(|| default_fiscal_year(years).map(|year| year.id))
}

/// Derives the fetch key for a selection.
///
/// Ids are copied only down to the active tier; a GP chosen earlier is not
/// part of a block-scope key.
///
/// # Returns
///
/// * `Some(FetchKey)` when the selection names a complete scope
/// * `None` while waiting for a location or a fiscal year
#[must_use]
pub fn derive_key(selection: &ScopeSelection, fiscal_years: &[FiscalYear]) -> Option<FetchKey> {
    let tier: ScopeTier = selection.active_tier();
    if tier != ScopeTier::State && selection.entry_at(tier).is_none() {
        return None;
    }
    let fiscal_year_id: FiscalYearId =
        resolve_fiscal_year(selection.fiscal_year_id(), fiscal_years)?;

    let id_at = |level: ScopeTier| {
        if tier.includes(level) {
            selection.entry_at(level).map(|entry| entry.id)
        } else {
            None
        }
    };

    Some(FetchKey {
        tier,
        district_id: id_at(ScopeTier::District),
        block_id: id_at(ScopeTier::Block),
        gp_id: id_at(ScopeTier::Gp),
        fiscal_year_id,
    })
}

/// Renders the selection's scope for display, finest level first.
///
/// Used to tell the user *what* failed to load, e.g. `GP Tinwari, Block
/// Osian, District Jodhpur`.
#[must_use]
pub fn describe_scope(selection: &ScopeSelection) -> String {
    let tier: ScopeTier = selection.active_tier();
    if tier == ScopeTier::State {
        return String::from("State");
    }

    let parts: Vec<String> = [ScopeTier::Gp, ScopeTier::Block, ScopeTier::District]
        .into_iter()
        .filter(|level| tier.includes(*level))
        .filter_map(|level| {
            let label: Option<&str> = match level {
                ScopeTier::Block => selection.block_label(),
                _ => selection.entry_at(level).map(|entry| entry.name.as_str()),
            };
            label.map(|name| format!("{level} {name}"))
        })
        .collect();

    if parts.is_empty() {
        format!("{tier} (not selected)")
    } else {
        parts.join(", ")
    }
}
