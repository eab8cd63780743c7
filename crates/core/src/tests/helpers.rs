// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Command, ScopeSelection, TransitionResult, apply};
use sanitation_scope_domain::{
    FiscalYear, GeographyNode, OfficerProfile, RoleScopePolicy, ScopeEntry,
};

pub fn ajmer() -> GeographyNode {
    GeographyNode::root(3, "Ajmer")
}

pub fn jodhpur() -> GeographyNode {
    GeographyNode::root(7, "Jodhpur")
}

pub fn kishangarh() -> GeographyNode {
    GeographyNode::child_of(3, 30, "Kishangarh")
}

pub fn osian() -> GeographyNode {
    GeographyNode::child_of(7, 71, "Osian")
}

pub fn bilara() -> GeographyNode {
    GeographyNode::child_of(7, 72, "Bilara")
}

pub fn tinwari() -> GeographyNode {
    GeographyNode::child_of(71, 712, "Tinwari")
}

pub fn mathania() -> GeographyNode {
    GeographyNode::child_of(71, 713, "Mathania")
}

pub fn create_test_fiscal_years() -> Vec<FiscalYear> {
    vec![
        FiscalYear::new(8, "2023-2024"),
        FiscalYear::new(9, "2024-2025"),
    ]
}

pub fn state_policy() -> RoleScopePolicy {
    RoleScopePolicy::resolve(&OfficerProfile::state()).unwrap()
}

pub fn district_policy() -> RoleScopePolicy {
    RoleScopePolicy::resolve(&OfficerProfile::district(ScopeEntry::new(7, "Jodhpur"))).unwrap()
}

pub fn block_policy() -> RoleScopePolicy {
    RoleScopePolicy::resolve(&OfficerProfile::block(
        ScopeEntry::new(7, "Jodhpur"),
        ScopeEntry::new(71, "Osian"),
    ))
    .unwrap()
}

pub fn village_policy() -> RoleScopePolicy {
    RoleScopePolicy::resolve(&OfficerProfile::village(ScopeEntry::new(712, "Tinwari"))).unwrap()
}

/// Applies a command that is expected to succeed and returns the new selection.
pub fn run(policy: &RoleScopePolicy, selection: &ScopeSelection, command: Command) -> ScopeSelection {
    let result: TransitionResult = apply(policy, selection, command).unwrap();
    result.new_selection
}

/// Applies a sequence of commands that are all expected to succeed.
pub fn run_all(
    policy: &RoleScopePolicy,
    selection: ScopeSelection,
    commands: Vec<Command>,
) -> ScopeSelection {
    commands
        .into_iter()
        .fold(selection, |current, command| run(policy, &current, command))
}
