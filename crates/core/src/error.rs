// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use sanitation_scope_domain::{FiscalYearId, GeoId, Role, ScopeTier};

/// Errors that can occur during selection transitions.
///
/// These describe interactions the role policy or the hierarchy does not
/// allow. The selection is left untouched when one is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The role may not switch to this tier.
    TierNotVisible {
        /// The role of the session.
        role: Role,
        /// The requested tier.
        tier: ScopeTier,
    },
    /// The column is pre-seeded from the officer's assignment.
    FixedColumn {
        /// The fixed column.
        column: ScopeTier,
    },
    /// The column is not offered at the active tier.
    ColumnNotBrowsable {
        /// The column that was interacted with.
        column: ScopeTier,
        /// The active tier.
        active: ScopeTier,
    },
    /// A node was chosen before any ancestor was browsed to.
    MissingAncestor {
        /// The column that was interacted with.
        column: ScopeTier,
        /// The ancestor tier with nothing chosen.
        ancestor: ScopeTier,
    },
    /// A node does not belong under the ancestor currently browsed to.
    InconsistentParent {
        /// The column that was interacted with.
        column: ScopeTier,
        /// The offending node.
        node: GeoId,
        /// The ancestor the node should belong to.
        expected: GeoId,
    },
    /// There is nothing to browse at the active tier.
    NoDropdown {
        /// The active tier.
        active: ScopeTier,
    },
    /// The fiscal year is not in the loaded list.
    UnknownFiscalYear {
        /// The requested fiscal year.
        fiscal_year_id: FiscalYearId,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TierNotVisible { role, tier } => {
                write!(f, "{tier} scope is not available to {role} officers")
            }
            Self::FixedColumn { column } => {
                write!(f, "{column} is fixed by the officer assignment")
            }
            Self::ColumnNotBrowsable { column, active } => {
                write!(f, "{column} cannot be browsed at {active} scope")
            }
            Self::MissingAncestor { column, ancestor } => {
                write!(f, "Cannot choose a {column} before a {ancestor}")
            }
            Self::InconsistentParent {
                column,
                node,
                expected,
            } => {
                write!(f, "{column} {node} does not belong under {expected}")
            }
            Self::NoDropdown { active } => {
                write!(f, "Nothing to browse at {active} scope")
            }
            Self::UnknownFiscalYear { fiscal_year_id } => {
                write!(f, "Fiscal year {fiscal_year_id} is not available")
            }
        }
    }
}

impl std::error::Error for CoreError {}
