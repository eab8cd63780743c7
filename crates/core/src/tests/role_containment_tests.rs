// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! A block officer fixed to district 5, block 12 must never leave it.

use crate::{Command, ScopeSelection, apply};
use sanitation_scope_domain::{
    GeoId, GeographyNode, OfficerProfile, RoleScopePolicy, ScopeEntry, ScopeTier,
};

fn fixed_block_policy() -> RoleScopePolicy {
    RoleScopePolicy::resolve(&OfficerProfile::block(
        ScopeEntry::new(5, "Barmer"),
        ScopeEntry::new(12, "Balotra"),
    ))
    .unwrap()
}

fn every_command() -> Vec<Command> {
    let districts: Vec<GeographyNode> =
        vec![GeographyNode::root(5, "Barmer"), GeographyNode::root(6, "Bikaner")];
    let blocks: Vec<GeographyNode> = vec![
        GeographyNode::child_of(5, 12, "Balotra"),
        GeographyNode::child_of(5, 13, "Siwana"),
        GeographyNode::child_of(6, 60, "Nokha"),
        GeographyNode::root(14, "Orphan"),
    ];
    let gps: Vec<GeographyNode> = vec![
        GeographyNode::child_of(12, 120, "Asada"),
        GeographyNode::child_of(13, 130, "Mokalsar"),
        GeographyNode::root(140, "Unparented"),
    ];

    let mut commands: Vec<Command> = ScopeTier::ALL
        .into_iter()
        .map(|tier| Command::SetActiveTier { tier })
        .collect();
    commands.push(Command::OpenDropdown);
    commands.push(Command::CloseDropdown);
    for node in &districts {
        commands.push(Command::HoverDistrict { node: node.clone() });
        commands.push(Command::ClickDistrict { node: node.clone() });
        commands.push(Command::ReconcileBlocks {
            district_id: node.id,
            blocks: Vec::new(),
        });
    }
    for node in &blocks {
        commands.push(Command::HoverBlock { node: node.clone() });
        commands.push(Command::ClickBlock { node: node.clone() });
    }
    for node in &gps {
        commands.push(Command::ClickGp { node: node.clone() });
    }
    commands
}

fn assert_contained(selection: &ScopeSelection) {
    assert_eq!(selection.district().map(|d| d.id), Some(GeoId(5)));
    assert_eq!(selection.block().map(|b| b.id), Some(GeoId(12)));
    assert_eq!(selection.cursor().district.as_ref().map(|d| d.id), Some(GeoId(5)));
    assert_eq!(selection.cursor().block.as_ref().map(|b| b.id), Some(GeoId(12)));
}

#[test]
fn test_block_officer_never_leaves_assignment() {
    let policy: RoleScopePolicy = fixed_block_policy();
    let commands: Vec<Command> = every_command();

    // Walk every ordered pair of commands from both starting tiers
    for start in [ScopeTier::Block, ScopeTier::Gp] {
        let initial: ScopeSelection = apply(
            &policy,
            &ScopeSelection::for_policy(&policy),
            Command::SetActiveTier { tier: start },
        )
        .unwrap()
        .new_selection;

        for first in &commands {
            let after_first: ScopeSelection = apply(&policy, &initial, first.clone())
                .map_or_else(|_| initial.clone(), |result| result.new_selection);
            assert_contained(&after_first);

            for second in &commands {
                let after_second: ScopeSelection =
                    apply(&policy, &after_first, second.clone())
                        .map_or_else(|_| after_first.clone(), |result| result.new_selection);
                assert_contained(&after_second);
            }
        }
    }
}

#[test]
fn test_block_officer_commits_only_gps_in_own_block() {
    let policy: RoleScopePolicy = fixed_block_policy();
    let selection: ScopeSelection = apply(
        &policy,
        &ScopeSelection::for_policy(&policy),
        Command::SetActiveTier {
            tier: ScopeTier::Gp,
        },
    )
    .unwrap()
    .new_selection;

    let own = apply(
        &policy,
        &selection,
        Command::ClickGp {
            node: GeographyNode::child_of(12, 120, "Asada"),
        },
    );
    let foreign = apply(
        &policy,
        &selection,
        Command::ClickGp {
            node: GeographyNode::child_of(13, 130, "Mokalsar"),
        },
    );

    assert_eq!(
        own.unwrap().new_selection.gp(),
        Some(&ScopeEntry::new(120, "Asada"))
    );
    assert!(foreign.is_err());
}
