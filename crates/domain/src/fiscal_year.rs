// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

/// Identifier of a fiscal year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FiscalYearId(pub i64);

impl std::fmt::Display for FiscalYearId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reporting year, e.g. `2024-2025`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FiscalYear {
    /// The fiscal year identifier.
    pub id: FiscalYearId,
    /// The display label. Labels sort lexically by recency.
    pub label: String,
    /// Whether the year is open for reporting.
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

impl FiscalYear {
    /// Creates an active fiscal year.
    #[must_use]
    pub fn new(id: i64, label: &str) -> Self {
        Self {
            id: FiscalYearId(id),
            label: label.to_string(),
            active: true,
        }
    }
}

/// Picks the default fiscal year: the most recent label, active years first.
///
/// Labels are compared lexically in descending order. Inactive years are
/// considered only when no year in the list is active.
#[must_use]
pub fn default_fiscal_year(years: &[FiscalYear]) -> Option<&FiscalYear> {
    let latest_active = years
        .iter()
        .filter(|year| year.active)
        .max_by(|a, b| a.label.cmp(&b.label));

    latest_active.or_else(|| years.iter().max_by(|a, b| a.label.cmp(&b.label)))
}
