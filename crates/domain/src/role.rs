// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Officer roles and the scope policy each role is held to.

use crate::error::DomainError;
use crate::types::{ScopeEntry, ScopeTier};
use serde::{Deserialize, Serialize};

/// Administrative role of the signed-in officer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// State analyst: may browse every district, block, and GP.
    State,
    /// District officer: confined to one district.
    District,
    /// Block officer: confined to one block.
    Block,
    /// Village officer: fixed to one GP with no browsing at all.
    Village,
}

impl Role {
    /// Converts this role to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::State => "State",
            Self::District => "District",
            Self::Block => "Block",
            Self::Village => "Village",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The signed-in officer's role and assignment, as supplied by the profile source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerProfile {
    /// The officer's role.
    pub role: Role,
    /// Assigned district, if any.
    #[serde(default)]
    pub district: Option<ScopeEntry>,
    /// Assigned block, if any.
    #[serde(default)]
    pub block: Option<ScopeEntry>,
    /// Assigned GP, if any.
    #[serde(default)]
    pub gp: Option<ScopeEntry>,
}

impl OfficerProfile {
    /// Creates a profile for a state analyst.
    #[must_use]
    pub const fn state() -> Self {
        Self {
            role: Role::State,
            district: None,
            block: None,
            gp: None,
        }
    }

    /// Creates a profile for a district officer.
    #[must_use]
    pub const fn district(district: ScopeEntry) -> Self {
        Self {
            role: Role::District,
            district: Some(district),
            block: None,
            gp: None,
        }
    }

    /// Creates a profile for a block officer.
    #[must_use]
    pub const fn block(district: ScopeEntry, block: ScopeEntry) -> Self {
        Self {
            role: Role::Block,
            district: Some(district),
            block: Some(block),
            gp: None,
        }
    }

    /// Creates a profile for a village officer.
    #[must_use]
    pub const fn village(gp: ScopeEntry) -> Self {
        Self {
            role: Role::Village,
            district: None,
            block: None,
            gp: Some(gp),
        }
    }
}

/// Scope fields pre-seeded from the officer's assignment.
///
/// Fixed fields are never offered as browsable options.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FixedScope {
    /// Fixed district.
    pub district: Option<ScopeEntry>,
    /// Fixed block.
    pub block: Option<ScopeEntry>,
    /// Fixed GP.
    pub gp: Option<ScopeEntry>,
}

impl FixedScope {
    /// Returns the fixed entry at `tier`, if any.
    #[must_use]
    pub const fn at(&self, tier: ScopeTier) -> Option<&ScopeEntry> {
        match tier {
            ScopeTier::State => None,
            ScopeTier::District => self.district.as_ref(),
            ScopeTier::Block => self.block.as_ref(),
            ScopeTier::Gp => self.gp.as_ref(),
        }
    }
}

/// What a role may see and browse.
///
/// Resolved once per session from the officer profile and read-only after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleScopePolicy {
    role: Role,
    visible_tiers: Vec<ScopeTier>,
    fixed: FixedScope,
}

impl RoleScopePolicy {
    /// Resolves the policy for an officer profile.
    ///
    /// Assignments a role does not use are ignored; a state analyst's
    /// profile never fixes anything even if it carries a district.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile lacks an assignment its role
    /// requires, or if a village officer's assignment skips a level.
    pub fn resolve(profile: &OfficerProfile) -> Result<Self, DomainError> {
        let require = |entry: &Option<ScopeEntry>, tier: ScopeTier| {
            entry.clone().ok_or(DomainError::MissingAssignment {
                role: profile.role,
                tier,
            })
        };

        let (visible_tiers, fixed) = match profile.role {
            Role::State => (ScopeTier::ALL.to_vec(), FixedScope::default()),
            Role::District => (
                vec![ScopeTier::District, ScopeTier::Block, ScopeTier::Gp],
                FixedScope {
                    district: Some(require(&profile.district, ScopeTier::District)?),
                    block: None,
                    gp: None,
                },
            ),
            Role::Block => (
                vec![ScopeTier::Block, ScopeTier::Gp],
                FixedScope {
                    district: Some(require(&profile.district, ScopeTier::District)?),
                    block: Some(require(&profile.block, ScopeTier::Block)?),
                    gp: None,
                },
            ),
            Role::Village => {
                if profile.block.is_some() && profile.district.is_none() {
                    return Err(DomainError::InconsistentAssignment {
                        reason: String::from("block assigned without a district"),
                    });
                }
                (
                    Vec::new(),
                    FixedScope {
                        district: profile.district.clone(),
                        block: profile.block.clone(),
                        gp: Some(require(&profile.gp, ScopeTier::Gp)?),
                    },
                )
            }
        };

        Ok(Self {
            role: profile.role,
            visible_tiers,
            fixed,
        })
    }

    /// Returns the role this policy was resolved for.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the tiers the officer may switch between, coarsest first.
    #[must_use]
    pub fn visible_tiers(&self) -> &[ScopeTier] {
        &self.visible_tiers
    }

    /// Returns the pre-seeded scope fields.
    #[must_use]
    pub const fn fixed(&self) -> &FixedScope {
        &self.fixed
    }

    /// Returns whether the officer may switch to `tier`.
    #[must_use]
    pub fn is_visible(&self, tier: ScopeTier) -> bool {
        self.visible_tiers.contains(&tier)
    }

    /// Returns whether the field at `tier` is pre-seeded.
    #[must_use]
    pub const fn is_fixed(&self, tier: ScopeTier) -> bool {
        self.fixed.at(tier).is_some()
    }

    /// Returns the tier a freshly mounted view starts at.
    ///
    /// Village officers have no visible tiers and operate at their GP.
    #[must_use]
    pub fn default_tier(&self) -> ScopeTier {
        self.visible_tiers.first().copied().unwrap_or(ScopeTier::Gp)
    }

    /// Returns the dropdown columns offered while `active` is the active tier.
    ///
    /// A column is offered when the active tier names a place at that level
    /// and the field is not fixed. Hidden tiers offer nothing.
    #[must_use]
    pub fn browsable_columns(&self, active: ScopeTier) -> Vec<ScopeTier> {
        if !self.is_visible(active) {
            return Vec::new();
        }
        ScopeTier::BROWSABLE
            .into_iter()
            .filter(|column| active.includes(*column) && !self.is_fixed(*column))
            .collect()
    }

    /// Returns whether `column` is offered while `active` is the active tier.
    #[must_use]
    pub fn is_browsable(&self, column: ScopeTier, active: ScopeTier) -> bool {
        self.browsable_columns(active).contains(&column)
    }
}
