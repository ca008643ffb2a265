// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Changesets: described, not yet applied, storage mutations.
//!
//! This is the only output language of the compiler. The apply layer commits
//! one event's changesets as a single atomic unit.
//!
//! # Invariants
//! - An `Insert*` for an entity precedes every changeset that depends on it
//!   within the same batch.
//! - Role rows are never deleted one by one: revocations emit
//!   `DeleteAll*ByRoleAndAddress`, which clears every matching row and is a
//!   valid no-op when nothing matches.
//! - Same event + same read snapshot => byte-identical batch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DigestError;
use crate::types::address::Address;
use crate::types::entities::{Project, ProjectRole, Round, RoundRole};
use crate::types::enums::{ProjectRoleKind, RoundRoleKind};
use crate::types::id::{ChainId, ProjectId};
use crate::types::value::TokenAmount;

/// Partial project update. `None` fields are left untouched, except that
/// `metadata` travels with `metadata_cid`: once the CID is set, `metadata`
/// replaces the stored document and `None` clears it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub metadata_cid: Option<String>,
    pub metadata: Option<Value>,
    pub updated_at_block: u64,
}

/// Partial round update. `None` fields are left untouched, except that each
/// metadata document travels with its CID as in [`ProjectUpdate`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundUpdate {
    pub match_amount: Option<TokenAmount>,
    pub match_amount_in_usd: Option<f64>,
    pub round_metadata_cid: Option<String>,
    pub round_metadata: Option<Value>,
    pub application_metadata_cid: Option<String>,
    pub application_metadata: Option<Value>,
    pub applications_start_time: Option<u64>,
    pub applications_end_time: Option<u64>,
    pub donations_start_time: Option<u64>,
    pub donations_end_time: Option<u64>,
    pub updated_at_block: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Changeset {
    InsertProject {
        project: Project,
    },
    UpdateProject {
        chain_id: ChainId,
        project_id: ProjectId,
        project: ProjectUpdate,
    },
    InsertProjectRole {
        project_role: ProjectRole,
    },
    DeleteAllProjectRolesByRoleAndAddress {
        chain_id: ChainId,
        project_id: ProjectId,
        role: ProjectRoleKind,
        address: Address,
    },
    InsertRound {
        round: Round,
    },
    UpdateRound {
        chain_id: ChainId,
        round_id: Address,
        round: RoundUpdate,
    },
    InsertRoundRole {
        round_role: RoundRole,
    },
    DeleteAllRoundRolesByRoleAndAddress {
        chain_id: ChainId,
        round_id: Address,
        role: RoundRoleKind,
        address: Address,
    },
}

/// BLAKE3 over the bincode encoding of an ordered batch.
///
/// Equal batches give equal digests on any architecture; the node compares
/// digests to detect replays that compile differently.
pub fn batch_digest(batch: &[Changeset]) -> Result<[u8; 32], DigestError> {
    digest_items(batch)
}

fn digest_items<T: Serialize>(items: &[T]) -> Result<[u8; 32], DigestError> {
    let mut hasher = blake3::Hasher::new();
    for item in items {
        let bytes = bincode::serde::encode_to_vec(item, bincode::config::standard())?;
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }
    Ok(*hasher.finalize().as_bytes())
}
