// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use serde_json::json;

use crate::changeset::{Changeset, ProjectUpdate};
use crate::identity::derive_project_id;
use crate::tests::support::{addr, event, num, Harness, REGISTRY};
use crate::types::enums::{ProjectRoleKind, RoundRoleKind};
use crate::types::id::ChainId;

const CHAIN: ChainId = ChainId(1);

fn owner_added(owner: u8, block: u64) -> crate::event::EventRecord {
    event("AlloV1/ProjectRegistry/V1", "OwnerAdded", REGISTRY, block, json!({"projectID": 1, "owner": addr(owner).to_hex()}))
}

#[tokio::test]
async fn test_bulk_delete_clears_every_duplicate_grant() {
    let mut h = Harness::new();
    h.process(&event("AlloV1/ProjectRegistry/V1", "ProjectCreated", REGISTRY, 1, json!({"projectID": 1, "owner": addr(2).to_hex()})))
        .await;
    h.process(&owner_added(2, 2)).await;
    h.process(&owner_added(3, 3)).await;

    let id = derive_project_id(CHAIN, REGISTRY, &num(1));
    assert_eq!(h.state.project_roles(CHAIN, &id).len(), 3);

    h.process(&event("AlloV1/ProjectRegistry/V1", "OwnerRemoved", REGISTRY, 4, json!({"projectID": 1, "owner": addr(2).to_hex()})))
        .await;

    let remaining = h.state.project_roles(CHAIN, &id);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].address, addr(3));
}

#[test]
fn test_bulk_delete_without_matches_is_noop() {
    let mut state = crate::state::IndexState::new();
    let before = state.clone();

    state.apply(&Changeset::DeleteAllProjectRolesByRoleAndAddress {
        chain_id: CHAIN,
        project_id: derive_project_id(CHAIN, REGISTRY, &num(9)),
        role: ProjectRoleKind::Owner,
        address: addr(2),
    });
    state.apply(&Changeset::DeleteAllRoundRolesByRoleAndAddress {
        chain_id: CHAIN,
        round_id: addr(0x60),
        role: RoundRoleKind::Manager,
        address: addr(2),
    });

    assert_eq!(state, before);
}

#[tokio::test]
async fn test_replaying_entity_changesets_leaves_state_unchanged() {
    let mut h = Harness::new();
    h.content.set("cid", json!({"title": "Project"}));
    let created = h
        .compile(&event("AlloV1/ProjectRegistry/V1", "ProjectCreated", REGISTRY, 1, json!({"projectID": 1, "owner": addr(2).to_hex()})))
        .await
        .unwrap();
    h.state.apply_batch(&created);
    let updated = h.process(&event("AlloV1/ProjectRegistry/V1", "MetadataUpdated", REGISTRY, 2, json!({"projectID": 1, "metaPtr": {"pointer": "cid"}}))).await;
    let removed = h.process(&event("AlloV1/ProjectRegistry/V1", "OwnerRemoved", REGISTRY, 3, json!({"projectID": 1, "owner": addr(2).to_hex()}))).await;

    let settled = h.state.clone();

    // Creation replayed after later updates must not roll them back.
    h.state.apply(&created[0]);
    h.state.apply_batch(&updated);
    h.state.apply_batch(&removed);

    assert_eq!(h.state, settled);
    let project = h.state.project(CHAIN, &derive_project_id(CHAIN, REGISTRY, &num(1))).unwrap();
    assert_eq!(project.name, "Project");
}

#[tokio::test]
async fn test_updated_at_block_never_decreases() {
    let mut h = Harness::new();
    let id = derive_project_id(CHAIN, REGISTRY, &num(1));
    h.process(&event("AlloV1/ProjectRegistry/V1", "ProjectCreated", REGISTRY, 50, json!({"projectID": 1, "owner": addr(2).to_hex()})))
        .await;

    h.state.apply(&Changeset::UpdateProject {
        chain_id: CHAIN,
        project_id: id.clone(),
        project: ProjectUpdate { name: Some("late".into()), updated_at_block: 40, ..ProjectUpdate::default() },
    });

    let project = h.state.project(CHAIN, &id).unwrap();
    assert_eq!(project.name, "late");
    assert_eq!(project.updated_at_block, 50);
}

#[test]
fn test_update_of_missing_entity_is_noop() {
    let mut state = crate::state::IndexState::new();
    state.apply(&Changeset::UpdateProject {
        chain_id: CHAIN,
        project_id: derive_project_id(CHAIN, REGISTRY, &num(1)),
        project: ProjectUpdate { name: Some("ghost".into()), updated_at_block: 1, ..ProjectUpdate::default() },
    });
    assert_eq!(state.project_count(), 0);
}

#[tokio::test]
async fn test_empty_pointer_clears_project_metadata() {
    let mut h = Harness::new();
    h.content.set("cid1", json!({"title": "A"}));
    let id = derive_project_id(CHAIN, REGISTRY, &num(1));
    h.process(&event("AlloV1/ProjectRegistry/V1", "ProjectCreated", REGISTRY, 1, json!({"projectID": 1, "owner": addr(2).to_hex()})))
        .await;
    h.process(&event("AlloV1/ProjectRegistry/V1", "MetadataUpdated", REGISTRY, 2, json!({"projectID": 1, "metaPtr": {"pointer": "cid1"}})))
        .await;
    assert_eq!(h.state.project(CHAIN, &id).unwrap().name, "A");

    h.process(&event("AlloV1/ProjectRegistry/V1", "MetadataUpdated", REGISTRY, 3, json!({"projectID": 1, "metaPtr": {"pointer": ""}})))
        .await;

    let project = h.state.project(CHAIN, &id).unwrap();
    assert_eq!(project.metadata_cid.as_deref(), Some(""));
    assert_eq!(project.metadata, None);
    assert_eq!(project.name, "");
    assert_eq!(project.updated_at_block, 3);
}

#[tokio::test]
async fn test_empty_pointer_clears_round_metadata() {
    let mut h = Harness::new();
    let round = addr(0x60);
    h.content.set("round-cid", json!({"name": "Round"}));
    h.mock_round_reads(round, json!(0), "round-cid", addr(0x99));
    h.process(&event(
        "AlloV1/RoundFactory/V1",
        "RoundCreated",
        addr(0x70),
        1,
        json!({"roundAddress": round.to_hex(), "ownedBy": addr(0x50).to_hex(), "roundImplementation": addr(0x71).to_hex()}),
    ))
    .await;

    h.process(&event("AlloV1/RoundImplementation/V1", "RoundMetaPtrUpdated", round, 2, json!({"oldMetaPtr": [0, "round-cid"], "newMetaPtr": {"pointer": ""}})))
        .await;

    let stored = h.state.round(CHAIN, round).unwrap();
    assert_eq!(stored.round_metadata_cid, "");
    assert_eq!(stored.round_metadata, None);
    // The application document has its own pointer and is untouched.
    assert_eq!(stored.application_metadata, Some(json!({"name": "Round"})));
}
