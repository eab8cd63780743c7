// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::role::Role;
use crate::types::ScopeTier;

/// Errors that can occur while validating domain values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An officer profile lacks an assignment its role requires.
    MissingAssignment {
        /// The role being resolved.
        role: Role,
        /// The tier whose assignment is missing.
        tier: ScopeTier,
    },
    /// Fixed assignments do not form a single chain.
    InconsistentAssignment {
        /// Description of the conflict.
        reason: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAssignment { role, tier } => {
                write!(
                    f,
                    "{role} officer profile has no {tier} assignment",
                    tier = tier.as_str().to_lowercase()
                )
            }
            Self::InconsistentAssignment { reason } => {
                write!(f, "Inconsistent officer assignment: {reason}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
