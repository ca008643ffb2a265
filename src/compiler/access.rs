// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! `RoleGranted` / `RoleRevoked` on access-control contracts.
//!
//! The emitting contract is the entity: a program's roles are scoped to the
//! program id, a round's roles to the round address.

use tracing::debug;

use super::Compiler;
use crate::changeset::Changeset;
use crate::error::Result;
use crate::event::{ContractName, EventRecord};
use crate::identity::{program_project_id, round_id};
use crate::ports::{ChainReader, ContentFetcher, EntityLookup, PriceFeed};
use crate::roles::{self, AccessRole};
use crate::types::address::Address;
use crate::types::entities::{ProjectRole, RoundRole};

impl<C, F, L, P> Compiler<'_, C, F, L, P>
where
    C: ChainReader,
    F: ContentFetcher,
    L: EntityLookup,
    P: PriceFeed,
{
    /// `None` when the role constant has no mapping for this contract.
    fn resolve_access(contract: ContractName, event: &EventRecord) -> Result<Option<(AccessRole, Address)>> {
        let constant = event.param_role("role")?;
        let account = event.param_address("account")?;

        match roles::resolve(contract.family, contract.version, &constant) {
            Some(role) => Ok(Some((role, account))),
            None => {
                debug!(
                    contract = %event.contract_name,
                    role = %constant.to_hex(),
                    block = event.block_number,
                    "Unknown role constant, no changesets"
                );
                Ok(None)
            }
        }
    }

    pub(super) fn role_granted(&self, contract: ContractName, event: &EventRecord) -> Result<Vec<Changeset>> {
        let Some((role, account)) = Self::resolve_access(contract, event)? else {
            return Ok(Vec::new());
        };

        let changeset = match role {
            AccessRole::Program(role) => Changeset::InsertProjectRole {
                project_role: ProjectRole {
                    chain_id: event.chain_id,
                    project_id: program_project_id(event.address),
                    address: account,
                    role,
                    created_at_block: event.block_number,
                },
            },
            AccessRole::Round(role) => Changeset::InsertRoundRole {
                round_role: RoundRole {
                    chain_id: event.chain_id,
                    round_id: round_id(event.address),
                    address: account,
                    role,
                    created_at_block: event.block_number,
                },
            },
        };
        Ok(vec![changeset])
    }

    pub(super) fn role_revoked(&self, contract: ContractName, event: &EventRecord) -> Result<Vec<Changeset>> {
        let Some((role, account)) = Self::resolve_access(contract, event)? else {
            return Ok(Vec::new());
        };

        let changeset = match role {
            AccessRole::Program(role) => Changeset::DeleteAllProjectRolesByRoleAndAddress {
                chain_id: event.chain_id,
                project_id: program_project_id(event.address),
                role,
                address: account,
            },
            AccessRole::Round(role) => Changeset::DeleteAllRoundRolesByRoleAndAddress {
                chain_id: event.chain_id,
                round_id: round_id(event.address),
                role,
                address: account,
            },
        };
        Ok(vec![changeset])
    }
}
