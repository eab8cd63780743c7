// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Replay fixtures: a geography tree, analytics answers, and a script.

use sanitation_scope_domain::{
    FiscalYear, FiscalYearId, GeoId, GeographyNode, OfficerProfile, ScopeTier,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or replaying a fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The fixture file could not be read.
    #[error("Failed to read fixture {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The fixture is not valid JSON for this format.
    #[error("Invalid fixture: {0}")]
    Parse(#[from] serde_json::Error),

    /// A script step names a node the fixture does not define.
    #[error("Script refers to unknown {tier} {id}")]
    UnknownNode { tier: ScopeTier, id: i64 },

    /// Concurrent groups may only hold plain interactions.
    #[error("Concurrent steps cannot be nested")]
    NestedConcurrency,
}

/// A coverage answer for one place.
#[derive(Debug, Clone, Deserialize)]
pub struct CoverageFixture {
    pub tier: ScopeTier,
    #[serde(default)]
    pub id: Option<GeoId>,
    pub payload: serde_json::Value,
}

/// A place whose coverage request always fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CoverageTarget {
    pub tier: ScopeTier,
    #[serde(default)]
    pub id: Option<GeoId>,
}

/// One scripted interaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Start,
    SetActiveTier { tier: ScopeTier },
    OpenDropdown,
    CloseDropdown,
    HoverDistrict { id: i64 },
    HoverBlock { id: i64 },
    ClickDistrict { id: i64 },
    ClickBlock { id: i64 },
    ClickGp { id: i64 },
    SetFiscalYear { id: FiscalYearId },
    ReloadFiscalYears,
    Retry,
    /// Reloads the list of one dropdown column.
    RetryColumn { tier: ScopeTier },
    /// Waits for every in-flight analytics request.
    Settle,
    /// Runs the inner steps at the same time.
    Concurrent { steps: Vec<Step> },
}

impl Step {
    /// Returns the step name used in replay output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::SetActiveTier { .. } => "set_active_tier",
            Self::OpenDropdown => "open_dropdown",
            Self::CloseDropdown => "close_dropdown",
            Self::HoverDistrict { .. } => "hover_district",
            Self::HoverBlock { .. } => "hover_block",
            Self::ClickDistrict { .. } => "click_district",
            Self::ClickBlock { .. } => "click_block",
            Self::ClickGp { .. } => "click_gp",
            Self::SetFiscalYear { .. } => "set_fiscal_year",
            Self::ReloadFiscalYears => "reload_fiscal_years",
            Self::Retry => "retry",
            Self::RetryColumn { .. } => "retry_column",
            Self::Settle => "settle",
            Self::Concurrent { .. } => "concurrent",
        }
    }
}

/// A complete replay fixture.
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    pub profile: OfficerProfile,
    /// Simulated provider latency.
    #[serde(default)]
    pub latency_ms: u64,
    pub districts: Vec<GeographyNode>,
    #[serde(default)]
    pub blocks: Vec<GeographyNode>,
    #[serde(default)]
    pub gps: Vec<GeographyNode>,
    pub fiscal_years: Vec<FiscalYear>,
    #[serde(default)]
    pub coverage: Vec<CoverageFixture>,
    #[serde(default)]
    pub failing: Vec<CoverageTarget>,
    pub script: Vec<Step>,
}

impl Fixture {
    /// Reads a fixture from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let text: String = std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses a fixture from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid fixture.
    pub fn parse(text: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Finds a node of `tier` by id.
    ///
    /// # Errors
    ///
    /// Returns `UnknownNode` if the fixture does not define it.
    pub fn node(&self, tier: ScopeTier, id: i64) -> Result<GeographyNode, FixtureError> {
        let nodes: &[GeographyNode] = match tier {
            ScopeTier::District => &self.districts,
            ScopeTier::Block => &self.blocks,
            ScopeTier::Gp => &self.gps,
            ScopeTier::State => &[],
        };
        nodes
            .iter()
            .find(|node| node.id == GeoId(id))
            .cloned()
            .ok_or(FixtureError::UnknownNode { tier, id })
    }
}
