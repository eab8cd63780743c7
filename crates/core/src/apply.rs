// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{ScopeSelection, TransitionResult};
use sanitation_scope_domain::{
    CollectionKey, FiscalYear, GeoId, GeographyNode, RoleScopePolicy, ScopeEntry, ScopeTier,
    default_fiscal_year,
};

/// Applies a command to the current selection, producing a new selection.
///
/// Hover commands only move the hierarchy cursor. Click commands are the
/// only commands that change the committed district, block, or GP.
///
/// # Arguments
///
/// * `policy` - The role policy of the session
/// * `selection` - The current selection (immutable)
/// * `command` - The command to apply
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the new selection and prefetch requests
/// * `Err(CoreError)` if the policy or hierarchy does not allow the command
///
/// # Errors
///
/// Returns an error if:
/// - The requested tier is hidden from the role
/// - The column is fixed or not offered at the active tier
/// - A node is chosen before its ancestor, or under the wrong ancestor
pub fn apply(
    policy: &RoleScopePolicy,
    selection: &ScopeSelection,
    command: Command,
) -> Result<TransitionResult, CoreError> {
    match command {
        Command::SetActiveTier { tier } => set_active_tier(policy, selection, tier),
        Command::HoverDistrict { node } => hover_district(policy, selection, &node),
        Command::HoverBlock { node } => hover_block(policy, selection, &node),
        Command::ClickDistrict { node } => {
            ensure_browsable(policy, selection, ScopeTier::District)?;
            let district: ScopeEntry = ScopeEntry::from(&node);

            let mut new_selection: ScopeSelection = selection.clone();
            new_selection.commit(Some(district.clone()), None, None);
            let cursor = new_selection.cursor_mut();
            cursor.district = Some(district);
            cursor.block = None;

            Ok(TransitionResult::without_prefetch(new_selection))
        }
        Command::ClickBlock { node } => {
            ensure_browsable(policy, selection, ScopeTier::Block)?;
            let district: ScopeEntry = browsed_district(policy, selection, ScopeTier::Block)?;
            ensure_parent(ScopeTier::Block, &node, district.id)?;
            let block: ScopeEntry = ScopeEntry::from(&node);

            let mut new_selection: ScopeSelection = selection.clone();
            new_selection.commit(Some(district.clone()), Some(block.clone()), None);
            let cursor = new_selection.cursor_mut();
            cursor.district = Some(district);
            cursor.block = Some(block);

            Ok(TransitionResult::without_prefetch(new_selection))
        }
        Command::ClickGp { node } => {
            ensure_browsable(policy, selection, ScopeTier::Gp)?;
            let district: ScopeEntry = browsed_district(policy, selection, ScopeTier::Gp)?;
            let block: ScopeEntry = browsed_block(policy, selection)?;
            ensure_parent(ScopeTier::Gp, &node, block.id)?;

            let mut new_selection: ScopeSelection = selection.clone();
            new_selection.commit(
                Some(district.clone()),
                Some(block.clone()),
                Some(ScopeEntry::from(&node)),
            );
            let cursor = new_selection.cursor_mut();
            cursor.district = Some(district);
            cursor.block = Some(block);

            Ok(TransitionResult::without_prefetch(new_selection))
        }
        Command::OpenDropdown => open_dropdown(policy, selection),
        Command::CloseDropdown => {
            let mut new_selection: ScopeSelection = selection.clone();
            new_selection.set_dropdown_open(false);
            Ok(TransitionResult::without_prefetch(new_selection))
        }
        Command::SetFiscalYear { fiscal_year_id } => {
            let mut new_selection: ScopeSelection = selection.clone();
            new_selection.set_fiscal_year_id(Some(fiscal_year_id));
            Ok(TransitionResult::without_prefetch(new_selection))
        }
        Command::ReconcileFiscalYears { years } => {
            Ok(reconcile_fiscal_years(selection, &years))
        }
        Command::ReconcileBlocks {
            district_id,
            blocks,
        } => Ok(reconcile_blocks(policy, selection, district_id, &blocks)),
    }
}

fn set_active_tier(
    policy: &RoleScopePolicy,
    selection: &ScopeSelection,
    tier: ScopeTier,
) -> Result<TransitionResult, CoreError> {
    if !policy.is_visible(tier) {
        return Err(CoreError::TierNotVisible {
            role: policy.role(),
            tier,
        });
    }

    let new_selection: ScopeSelection =
        ScopeSelection::seeded(policy, tier, selection.fiscal_year_id());

    // Load the first column the officer will browse under the new tier
    let prefetch: Vec<CollectionKey> = policy
        .browsable_columns(tier)
        .first()
        .and_then(|column| new_selection.column_key(*column))
        .into_iter()
        .collect();

    Ok(TransitionResult {
        new_selection,
        prefetch,
    })
}

fn hover_district(
    policy: &RoleScopePolicy,
    selection: &ScopeSelection,
    node: &GeographyNode,
) -> Result<TransitionResult, CoreError> {
    ensure_browsable(policy, selection, ScopeTier::District)?;

    let mut new_selection: ScopeSelection = selection.clone();
    let cursor = new_selection.cursor_mut();
    if cursor.district.as_ref().map(|district| district.id) != Some(node.id) {
        cursor.block = None;
    }
    cursor.district = Some(ScopeEntry::from(node));

    let prefetch: Vec<CollectionKey> = if selection.active_tier().includes(ScopeTier::Block) {
        vec![CollectionKey::Blocks {
            district_id: node.id,
        }]
    } else {
        Vec::new()
    };

    Ok(TransitionResult {
        new_selection,
        prefetch,
    })
}

fn hover_block(
    policy: &RoleScopePolicy,
    selection: &ScopeSelection,
    node: &GeographyNode,
) -> Result<TransitionResult, CoreError> {
    ensure_browsable(policy, selection, ScopeTier::Block)?;
    let district: ScopeEntry = browsed_district(policy, selection, ScopeTier::Block)?;
    ensure_parent(ScopeTier::Block, node, district.id)?;

    let mut new_selection: ScopeSelection = selection.clone();
    let cursor = new_selection.cursor_mut();
    cursor.district = Some(district.clone());
    cursor.block = Some(ScopeEntry::from(node));

    let prefetch: Vec<CollectionKey> = if selection.active_tier().includes(ScopeTier::Gp) {
        vec![CollectionKey::Gps {
            district_id: district.id,
            block_id: node.id,
        }]
    } else {
        Vec::new()
    };

    Ok(TransitionResult {
        new_selection,
        prefetch,
    })
}

fn open_dropdown(
    policy: &RoleScopePolicy,
    selection: &ScopeSelection,
) -> Result<TransitionResult, CoreError> {
    let columns: Vec<ScopeTier> = policy.browsable_columns(selection.active_tier());
    if columns.is_empty() {
        return Err(CoreError::NoDropdown {
            active: selection.active_tier(),
        });
    }

    let fixed = policy.fixed();
    let mut new_selection: ScopeSelection = selection.clone();
    new_selection.set_dropdown_open(true);
    new_selection.clear_stale_block_label();
    let cursor = new_selection.cursor_mut();
    cursor.district = fixed
        .district
        .clone()
        .or_else(|| selection.district().cloned());
    cursor.block = fixed.block.clone().or_else(|| selection.block().cloned());

    let prefetch: Vec<CollectionKey> = columns
        .iter()
        .filter_map(|column| new_selection.column_key(*column))
        .collect();

    Ok(TransitionResult {
        new_selection,
        prefetch,
    })
}

fn reconcile_fiscal_years(selection: &ScopeSelection, years: &[FiscalYear]) -> TransitionResult {
    let mut new_selection: ScopeSelection = selection.clone();
    let held_is_gone: bool = selection
        .fiscal_year_id()
        .is_some_and(|held| !years.iter().any(|year| year.id == held));
    if held_is_gone {
        new_selection.set_fiscal_year_id(default_fiscal_year(years).map(|year| year.id));
    }
    TransitionResult::without_prefetch(new_selection)
}

fn reconcile_blocks(
    policy: &RoleScopePolicy,
    selection: &ScopeSelection,
    district_id: GeoId,
    blocks: &[GeographyNode],
) -> TransitionResult {
    let mut new_selection: ScopeSelection = selection.clone();
    let listed = |entry: &ScopeEntry| blocks.iter().any(|block| block.id == entry.id);

    // A fixed block comes from the officer's assignment and is never dropped
    if policy.is_fixed(ScopeTier::Block) {
        return TransitionResult::without_prefetch(new_selection);
    }

    let committed_here: bool = selection.district().map(|d| d.id) == Some(district_id);
    if committed_here && selection.block().is_some_and(|block| !listed(block)) {
        new_selection.drop_stale_block();
    }

    let cursor = new_selection.cursor_mut();
    let cursor_here: bool = cursor.district.as_ref().map(|d| d.id) == Some(district_id);
    if cursor_here && cursor.block.as_ref().is_some_and(|block| !listed(block)) {
        cursor.block = None;
    }

    TransitionResult::without_prefetch(new_selection)
}

fn ensure_browsable(
    policy: &RoleScopePolicy,
    selection: &ScopeSelection,
    column: ScopeTier,
) -> Result<(), CoreError> {
    if policy.is_fixed(column) {
        return Err(CoreError::FixedColumn { column });
    }
    if !policy.is_browsable(column, selection.active_tier()) {
        return Err(CoreError::ColumnNotBrowsable {
            column,
            active: selection.active_tier(),
        });
    }
    Ok(())
}

fn ensure_parent(column: ScopeTier, node: &GeographyNode, expected: GeoId) -> Result<(), CoreError> {
    if node.belongs_to(expected) {
        Ok(())
    } else {
        Err(CoreError::InconsistentParent {
            column,
            node: node.id,
            expected,
        })
    }
}

/// Returns the district a block or GP column is browsing under.
///
/// Fixed fields win over the cursor.
fn browsed_district(
    policy: &RoleScopePolicy,
    selection: &ScopeSelection,
    column: ScopeTier,
) -> Result<ScopeEntry, CoreError> {
    policy
        .fixed()
        .district
        .clone()
        .or_else(|| selection.cursor().district.clone())
        .ok_or(CoreError::MissingAncestor {
            column,
            ancestor: ScopeTier::District,
        })
}

fn browsed_block(
    policy: &RoleScopePolicy,
    selection: &ScopeSelection,
) -> Result<ScopeEntry, CoreError> {
    policy
        .fixed()
        .block
        .clone()
        .or_else(|| selection.cursor().block.clone())
        .ok_or(CoreError::MissingAncestor {
            column: ScopeTier::Gp,
            ancestor: ScopeTier::Block,
        })
}
