// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use sanitation_scope_domain::{
    CollectionKey, FiscalYearId, RoleScopePolicy, ScopeEntry, ScopeTier,
};
use serde::Serialize;

/// Tentative district and block chosen while browsing nested dropdown columns.
///
/// The cursor may disagree with the committed fields until a click commits.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HierarchyCursor {
    /// The district whose blocks are displayed.
    pub district: Option<ScopeEntry>,
    /// The block whose GPs are displayed.
    pub block: Option<ScopeEntry>,
}

/// The active tier and the committed place at every tier.
///
/// One instance exists per mounted view. It only changes through
/// [`crate::apply`], which keeps a committed block under the committed
/// district and a committed GP under the committed block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeSelection {
    active_tier: ScopeTier,
    district: Option<ScopeEntry>,
    block: Option<ScopeEntry>,
    gp: Option<ScopeEntry>,
    fiscal_year_id: Option<FiscalYearId>,
    cursor: HierarchyCursor,
    dropdown_open: bool,
    stale_block_label: Option<String>,
}

impl ScopeSelection {
    /// Creates the selection a freshly mounted view starts with.
    #[must_use]
    pub fn for_policy(policy: &RoleScopePolicy) -> Self {
        Self::seeded(policy, policy.default_tier(), None)
    }

    /// Builds a selection at `tier` holding only the policy's fixed fields.
    pub(crate) fn seeded(
        policy: &RoleScopePolicy,
        tier: ScopeTier,
        fiscal_year_id: Option<FiscalYearId>,
    ) -> Self {
        let fixed = policy.fixed();
        Self {
            active_tier: tier,
            district: fixed.district.clone(),
            block: fixed.block.clone(),
            gp: fixed.gp.clone(),
            fiscal_year_id,
            cursor: HierarchyCursor {
                district: fixed.district.clone(),
                block: fixed.block.clone(),
            },
            dropdown_open: false,
            stale_block_label: None,
        }
    }

    /// Returns the active tier.
    #[must_use]
    pub const fn active_tier(&self) -> ScopeTier {
        self.active_tier
    }

    /// Returns the committed district.
    #[must_use]
    pub const fn district(&self) -> Option<&ScopeEntry> {
        self.district.as_ref()
    }

    /// Returns the committed block.
    #[must_use]
    pub const fn block(&self) -> Option<&ScopeEntry> {
        self.block.as_ref()
    }

    /// Returns the committed GP.
    #[must_use]
    pub const fn gp(&self) -> Option<&ScopeEntry> {
        self.gp.as_ref()
    }

    /// Returns the committed entry at `tier`.
    #[must_use]
    pub const fn entry_at(&self, tier: ScopeTier) -> Option<&ScopeEntry> {
        match tier {
            ScopeTier::State => None,
            ScopeTier::District => self.district(),
            ScopeTier::Block => self.block(),
            ScopeTier::Gp => self.gp(),
        }
    }

    /// Returns the explicitly chosen fiscal year, if any.
    #[must_use]
    pub const fn fiscal_year_id(&self) -> Option<FiscalYearId> {
        self.fiscal_year_id
    }

    /// Returns the hierarchy cursor.
    #[must_use]
    pub const fn cursor(&self) -> &HierarchyCursor {
        &self.cursor
    }

    /// Returns whether the dropdown is open.
    #[must_use]
    pub const fn is_dropdown_open(&self) -> bool {
        self.dropdown_open
    }

    /// Returns the label of a block dropped by reconciliation.
    ///
    /// Kept for display until the dropdown is opened again.
    #[must_use]
    pub fn stale_block_label(&self) -> Option<&str> {
        self.stale_block_label.as_deref()
    }

    /// Returns the block label to display: the committed block, or a stale one.
    #[must_use]
    pub fn block_label(&self) -> Option<&str> {
        self.block
            .as_ref()
            .map(|entry| entry.name.as_str())
            .or_else(|| self.stale_block_label())
    }

    /// Returns the collection that fills dropdown `column` at the current cursor.
    ///
    /// `None` when the cursor has not reached the column's parent yet.
    #[must_use]
    pub fn column_key(&self, column: ScopeTier) -> Option<CollectionKey> {
        match column {
            ScopeTier::State => None,
            ScopeTier::District => Some(CollectionKey::Districts),
            ScopeTier::Block => self
                .cursor
                .district
                .as_ref()
                .map(|district| CollectionKey::Blocks {
                    district_id: district.id,
                }),
            ScopeTier::Gp => match (&self.cursor.district, &self.cursor.block) {
                (Some(district), Some(block)) => Some(CollectionKey::Gps {
                    district_id: district.id,
                    block_id: block.id,
                }),
                _ => None,
            },
        }
    }

    pub(crate) fn commit(
        &mut self,
        district: Option<ScopeEntry>,
        block: Option<ScopeEntry>,
        gp: Option<ScopeEntry>,
    ) {
        self.district = district;
        self.block = block;
        self.gp = gp;
        self.stale_block_label = None;
        self.dropdown_open = false;
    }

    pub(crate) const fn cursor_mut(&mut self) -> &mut HierarchyCursor {
        &mut self.cursor
    }

    pub(crate) const fn set_dropdown_open(&mut self, open: bool) {
        self.dropdown_open = open;
    }

    pub(crate) const fn set_fiscal_year_id(&mut self, fiscal_year_id: Option<FiscalYearId>) {
        self.fiscal_year_id = fiscal_year_id;
    }

    /// Drops the committed block and GP, keeping the block's label for display.
    ///
    /// At Block or GP tier this leaves no derivable key, so the view shows
    /// `Waiting` until the user picks a block from the reopened dropdown.
    pub(crate) fn drop_stale_block(&mut self) {
        if let Some(block) = self.block.take() {
            self.stale_block_label = Some(block.name);
        }
        self.gp = None;
    }

    pub(crate) fn clear_stale_block_label(&mut self) {
        self.stale_block_label = None;
    }
}

/// The result of a successful selection transition.
///
/// Transitions are atomic: they either succeed completely or leave the
/// previous selection untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The selection after the transition.
    pub new_selection: ScopeSelection,
    /// Collections the controller should load speculatively.
    pub prefetch: Vec<CollectionKey>,
}

impl TransitionResult {
    pub(crate) const fn without_prefetch(new_selection: ScopeSelection) -> Self {
        Self {
            new_selection,
            prefetch: Vec::new(),
        }
    }
}
