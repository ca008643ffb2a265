// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Stable entity identifiers.
//!
//! # Hash Input Structure
//! ```text
//! chain_id        (u64 BE, 8 bytes)
//! registry        (20 bytes)
//! project_number  (uint256 BE, 32 bytes)
//! ```
//! Fixed width, so no two distinct triples share an encoding. The chain id
//! keeps identically numbered projects on different chains apart.

use byteorder::{BigEndian, ByteOrder};

use crate::types::address::Address;
use crate::types::id::{ChainId, ProjectId};
use crate::types::value::Uint256;

const PROJECT_ID_INPUT_LEN: usize = 8 + 20 + 32;

/// Identifier of a registry-created project. Pure and total.
pub fn derive_project_id(chain_id: ChainId, registry: Address, project_number: &Uint256) -> ProjectId {
    let mut input = [0u8; PROJECT_ID_INPUT_LEN];
    BigEndian::write_u64(&mut input[0..8], chain_id.0);
    input[8..28].copy_from_slice(registry.as_bytes());
    input[28..60].copy_from_slice(&project_number.to_be_bytes());

    let hash = blake3::hash(&input);
    ProjectId(format!("0x{}", hex::encode(hash.as_bytes())))
}

/// Programs are already unique per chain by address.
pub fn program_project_id(program: Address) -> ProjectId {
    ProjectId(program.to_hex())
}

pub fn round_id(round: Address) -> Address {
    round
}
