// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Project registry handlers (ownership-style contract).

use std::collections::BTreeSet;

use super::{metadata_str, Compiler};
use crate::changeset::{Changeset, ProjectUpdate};
use crate::config::TAG_ALLO_V1;
use crate::error::Result;
use crate::event::EventRecord;
use crate::identity::derive_project_id;
use crate::ports::{ChainReader, ContentFetcher, EntityLookup, PriceFeed};
use crate::roles::ownership_role;
use crate::types::entities::{Project, ProjectRole};
use crate::types::id::ProjectId;

impl<C, F, L, P> Compiler<'_, C, F, L, P>
where
    C: ChainReader,
    F: ContentFetcher,
    L: EntityLookup,
    P: PriceFeed,
{
    /// Registry projects are keyed by the emitting registry contract.
    fn registry_project_id(event: &EventRecord) -> Result<ProjectId> {
        let number = event.param_uint256("projectID")?;
        Ok(derive_project_id(event.chain_id, event.address, &number))
    }

    pub(super) fn project_created(&self, event: &EventRecord) -> Result<Vec<Changeset>> {
        let number = event.param_uint256("projectID")?;
        let owner = event.param_address("owner")?;
        let id = derive_project_id(event.chain_id, event.address, &number);

        let project = Project {
            id: id.clone(),
            chain_id: event.chain_id,
            registry_address: event.address,
            project_number: Some(number),
            name: String::new(),
            metadata: None,
            metadata_cid: None,
            tags: BTreeSet::from([TAG_ALLO_V1.to_string()]),
            created_at_block: event.block_number,
            updated_at_block: event.block_number,
        };

        Ok(vec![
            Changeset::InsertProject { project },
            Changeset::InsertProjectRole {
                project_role: ProjectRole {
                    chain_id: event.chain_id,
                    project_id: id,
                    address: owner,
                    role: ownership_role(),
                    created_at_block: event.block_number,
                },
            },
        ])
    }

    pub(super) async fn project_metadata_updated(&self, event: &EventRecord) -> Result<Vec<Changeset>> {
        let project_id = Self::registry_project_id(event)?;
        let ptr = event.param_meta_ptr("metaPtr")?;
        let metadata = self.fetch_metadata(&ptr).await?;

        Ok(vec![Changeset::UpdateProject {
            chain_id: event.chain_id,
            project_id,
            project: ProjectUpdate {
                // A pointer without a usable document resets the name too.
                name: Some(metadata_str(&metadata, "title").unwrap_or_default()),
                metadata_cid: Some(ptr.pointer),
                metadata,
                updated_at_block: event.block_number,
            },
        }])
    }

    pub(super) fn project_owner_added(&self, event: &EventRecord) -> Result<Vec<Changeset>> {
        let project_id = Self::registry_project_id(event)?;
        let owner = event.param_address("owner")?;

        Ok(vec![Changeset::InsertProjectRole {
            project_role: ProjectRole {
                chain_id: event.chain_id,
                project_id,
                address: owner,
                role: ownership_role(),
                created_at_block: event.block_number,
            },
        }])
    }

    pub(super) fn project_owner_removed(&self, event: &EventRecord) -> Result<Vec<Changeset>> {
        let project_id = Self::registry_project_id(event)?;
        let owner = event.param_address("owner")?;

        Ok(vec![Changeset::DeleteAllProjectRolesByRoleAndAddress {
            chain_id: event.chain_id,
            project_id,
            role: ownership_role(),
            address: owner,
        }])
    }
}
