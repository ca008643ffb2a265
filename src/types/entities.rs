// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Indexed entities.
//!
//! Entities reference each other by identifier value only. A `RoundRole`
//! names its round by `round_id`; nothing here owns anything else.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::address::Address;
use crate::types::enums::{ProjectRoleKind, RoundRoleKind};
use crate::types::id::{ChainId, ProjectId};
use crate::types::value::{TokenAmount, Uint256};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub chain_id: ChainId,
    pub registry_address: Address,
    /// `None` for program pseudo-projects.
    pub project_number: Option<Uint256>,
    pub name: String,
    pub metadata: Option<Value>,
    pub metadata_cid: Option<String>,
    pub tags: BTreeSet<String>,
    pub created_at_block: u64,
    pub updated_at_block: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRole {
    pub chain_id: ChainId,
    pub project_id: ProjectId,
    pub address: Address,
    pub role: ProjectRoleKind,
    pub created_at_block: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub id: Address,
    pub chain_id: ChainId,
    pub strategy_address: Address,
    pub application_metadata_cid: String,
    pub application_metadata: Option<Value>,
    pub round_metadata_cid: String,
    pub round_metadata: Option<Value>,
    pub applications_start_time: Option<u64>,
    pub applications_end_time: Option<u64>,
    pub donations_start_time: Option<u64>,
    pub donations_end_time: Option<u64>,
    pub match_amount: TokenAmount,
    pub match_token_address: Address,
    pub match_amount_in_usd: f64,
    pub project_id: ProjectId,
    pub tags: BTreeSet<String>,
    pub created_at_block: u64,
    pub updated_at_block: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRole {
    pub chain_id: ChainId,
    pub round_id: Address,
    pub address: Address,
    pub role: RoundRoleKind,
    pub created_at_block: u64,
}
