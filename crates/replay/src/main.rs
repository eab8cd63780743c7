// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod fixture;
mod providers;

use clap::Parser;
use fixture::{Fixture, FixtureError, Step};
use futures::future::try_join_all;
use providers::FixtureProviders;
use sanitation_scope::{FetchKey, describe_scope};
use sanitation_scope_controller::{
    ControllerConfig, FetchSnapshot, FiscalYearLoad, GeographyLoad, InteractionOutcome,
    ScopeSession,
};
use sanitation_scope_domain::ScopeTier;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Sanitation Scope Replay - drives the scope selector from a scripted fixture
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON fixture holding geography, analytics, and the script
    #[arg(short, long)]
    fixture: PathBuf,

    /// Seconds an analytics fetch may take before it is reported as timed out
    #[arg(short, long, default_value_t = 15)]
    timeout_secs: u64,

    /// Simulated provider latency in milliseconds; overrides the fixture's
    #[arg(short, long)]
    latency_ms: Option<u64>,
}

/// What a step did, before it is summarised for output.
enum Performed {
    Interaction(InteractionOutcome),
    FiscalYears(FiscalYearLoad),
    Retried(Option<u64>),
    ColumnReloaded(Option<GeographyLoad>),
    Settled,
}

impl Performed {
    fn summary(&self) -> (bool, Option<String>) {
        match self {
            Self::Interaction(InteractionOutcome::Applied { loads, .. }) => {
                let failed: Vec<String> = loads
                    .iter()
                    .filter_map(|load| {
                        load.error
                            .as_ref()
                            .map(|error| format!("{}: {error}", load.key))
                    })
                    .collect();
                (true, (!failed.is_empty()).then(|| failed.join("; ")))
            }
            Self::Interaction(InteractionOutcome::Ignored { reason }) => {
                (false, Some(reason.to_string()))
            }
            Self::FiscalYears(load) if load.superseded => {
                (false, Some("superseded by a later reload".to_string()))
            }
            Self::FiscalYears(load) => (
                load.error.is_none(),
                load.error.as_ref().map(ToString::to_string),
            ),
            Self::Retried(generation) => (
                generation.is_some(),
                generation.is_none().then(|| "nothing to retry".to_string()),
            ),
            Self::ColumnReloaded(Some(load)) => (
                load.is_ok(),
                load.error
                    .as_ref()
                    .map(|error| format!("{}: {error}", load.key)),
            ),
            Self::ColumnReloaded(None) => (false, Some("column not offered".to_string())),
            Self::Settled => (true, None),
        }
    }
}

/// One line of replay output.
#[derive(Debug, Clone, Serialize)]
struct StepRecord {
    /// Position of the step in the script.
    index: usize,
    /// The step name.
    action: &'static str,
    /// Whether every interaction in the step was applied.
    applied: bool,
    /// Rejection reasons and load failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    /// The fetch key after the step.
    key: Option<FetchKey>,
    /// Human-readable scope after the step.
    scope: String,
    /// The published fetch output after the step.
    fetch: FetchSnapshot,
}

async fn perform(
    session: &ScopeSession,
    fixture: &Fixture,
    step: &Step,
) -> Result<Performed, FixtureError> {
    let performed: Performed = match step {
        Step::Start => Performed::FiscalYears(session.start().await),
        Step::SetActiveTier { tier } => Performed::Interaction(session.set_active_tier(*tier).await),
        Step::OpenDropdown => Performed::Interaction(session.open_dropdown().await),
        Step::CloseDropdown => Performed::Interaction(session.close_dropdown().await),
        Step::HoverDistrict { id } => Performed::Interaction(
            session
                .hover_district(fixture.node(ScopeTier::District, *id)?)
                .await,
        ),
        Step::HoverBlock { id } => Performed::Interaction(
            session
                .hover_block(fixture.node(ScopeTier::Block, *id)?)
                .await,
        ),
        Step::ClickDistrict { id } => Performed::Interaction(
            session
                .click_district(fixture.node(ScopeTier::District, *id)?)
                .await,
        ),
        Step::ClickBlock { id } => Performed::Interaction(
            session
                .click_block(fixture.node(ScopeTier::Block, *id)?)
                .await,
        ),
        Step::ClickGp { id } => {
            Performed::Interaction(session.click_gp(fixture.node(ScopeTier::Gp, *id)?).await)
        }
        Step::SetFiscalYear { id } => Performed::Interaction(session.set_fiscal_year(*id).await),
        Step::ReloadFiscalYears => Performed::FiscalYears(session.load_fiscal_years().await),
        Step::Retry => Performed::Retried(session.retry().await),
        Step::RetryColumn { tier } => {
            Performed::ColumnReloaded(session.retry_column(*tier).await)
        }
        Step::Settle => {
            session.settled().await;
            Performed::Settled
        }
        Step::Concurrent { .. } => return Err(FixtureError::NestedConcurrency),
    };
    Ok(performed)
}

/// Runs the fixture's script and records the state after every step.
async fn replay(
    session: &ScopeSession,
    fixture: &Fixture,
) -> Result<Vec<StepRecord>, FixtureError> {
    let mut records: Vec<StepRecord> = Vec::with_capacity(fixture.script.len());
    for (index, step) in fixture.script.iter().enumerate() {
        let performed: Vec<Performed> = match step {
            Step::Concurrent { steps } => {
                try_join_all(steps.iter().map(|inner| perform(session, fixture, inner))).await?
            }
            _ => vec![perform(session, fixture, step).await?],
        };

        let mut applied: bool = true;
        let mut notes: Vec<String> = Vec::new();
        for outcome in &performed {
            let (step_applied, note) = outcome.summary();
            applied &= step_applied;
            notes.extend(note);
        }

        let key: Option<FetchKey> = session.current_key().await;
        let scope: String = describe_scope(&session.selection().await);
        info!(index, action = step.name(), applied, "Replayed step");
        records.push(StepRecord {
            index,
            action: step.name(),
            applied,
            note: (!notes.is_empty()).then(|| notes.join("; ")),
            key,
            scope,
            fetch: session.fetch_snapshot(),
        });
    }
    Ok(records)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Loading fixture from {}", args.fixture.display());
    let fixture: Arc<Fixture> = Arc::new(Fixture::load(&args.fixture)?);

    let latency: Duration = Duration::from_millis(args.latency_ms.unwrap_or(fixture.latency_ms));
    let config: ControllerConfig =
        ControllerConfig::default().with_fetch_timeout(Duration::from_secs(args.timeout_secs));
    let providers = FixtureProviders::new(Arc::clone(&fixture), latency).into_session_providers();
    let session: ScopeSession = ScopeSession::new(&fixture.profile, providers, &config)?;

    for record in replay(&session, &fixture).await? {
        println!("{}", serde_json::to_string(&record)?);
    }
    session.settled().await;

    Ok(())
}
