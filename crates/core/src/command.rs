// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use sanitation_scope_domain::{FiscalYear, FiscalYearId, GeoId, GeographyNode, ScopeTier};

/// A command represents a user interaction or a background reconciliation as data only.
///
/// Commands are the only way to change a `ScopeSelection`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Switch the active tier, resetting the selection to role defaults.
    SetActiveTier {
        /// The requested tier.
        tier: ScopeTier,
    },
    /// Hover a district in the dropdown, moving the cursor only.
    HoverDistrict {
        /// The hovered district.
        node: GeographyNode,
    },
    /// Hover a block in the dropdown, moving the cursor only.
    HoverBlock {
        /// The hovered block.
        node: GeographyNode,
    },
    /// Commit a district.
    ClickDistrict {
        /// The chosen district.
        node: GeographyNode,
    },
    /// Commit a block and its district.
    ClickBlock {
        /// The chosen block.
        node: GeographyNode,
    },
    /// Commit a GP with its block and district.
    ClickGp {
        /// The chosen GP.
        node: GeographyNode,
    },
    /// Open the dropdown at the committed branch.
    OpenDropdown,
    /// Close the dropdown without committing anything.
    CloseDropdown,
    /// Choose a fiscal year.
    SetFiscalYear {
        /// The chosen fiscal year.
        fiscal_year_id: FiscalYearId,
    },
    /// A fiscal year list arrived; drop a held year it no longer contains.
    ReconcileFiscalYears {
        /// The freshly loaded list.
        years: Vec<FiscalYear>,
    },
    /// A block list for a district arrived; drop a committed block it no longer contains.
    ///
    /// The district stays committed but the fetch key becomes `None` when the
    /// active tier needs a block. No replacement block is guessed; the stale
    /// label stays on the trigger until the dropdown opens.
    ReconcileBlocks {
        /// The district the list belongs to.
        district_id: GeoId,
        /// The freshly loaded list.
        blocks: Vec<GeographyNode>,
    },
}

impl Command {
    /// Returns the command name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetActiveTier { .. } => "SetActiveTier",
            Self::HoverDistrict { .. } => "HoverDistrict",
            Self::HoverBlock { .. } => "HoverBlock",
            Self::ClickDistrict { .. } => "ClickDistrict",
            Self::ClickBlock { .. } => "ClickBlock",
            Self::ClickGp { .. } => "ClickGp",
            Self::OpenDropdown => "OpenDropdown",
            Self::CloseDropdown => "CloseDropdown",
            Self::SetFiscalYear { .. } => "SetFiscalYear",
            Self::ReconcileFiscalYears { .. } => "ReconcileFiscalYears",
            Self::ReconcileBlocks { .. } => "ReconcileBlocks",
        }
    }
}
