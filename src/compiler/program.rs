// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Program factory and program implementation handlers.
//!
//! Programs are indexed as pseudo-projects keyed by their contract address.

use std::collections::BTreeSet;

use super::{metadata_str, Compiler};
use crate::changeset::{Changeset, ProjectUpdate};
use crate::config::{functions, TAG_ALLO_V1, TAG_PROGRAM};
use crate::error::Result;
use crate::event::EventRecord;
use crate::identity::program_project_id;
use crate::ports::{ChainReader, ContentFetcher, EntityLookup, PriceFeed};
use crate::types::address::Address;
use crate::types::entities::Project;

impl<C, F, L, P> Compiler<'_, C, F, L, P>
where
    C: ChainReader,
    F: ContentFetcher,
    L: EntityLookup,
    P: PriceFeed,
{
    pub(super) async fn program_created(&self, event: &EventRecord) -> Result<Vec<Changeset>> {
        let program = event.param_address_any(&["programAddress", "programContractAddress"])?;
        let ptr = self.read_meta_ptr(program, functions::PROGRAM_META_PTR).await?;
        let metadata = self.fetch_metadata(&ptr).await?;

        let project = Project {
            id: program_project_id(program),
            chain_id: event.chain_id,
            registry_address: Address::ZERO,
            project_number: None,
            name: metadata_str(&metadata, "name").unwrap_or_default(),
            metadata,
            metadata_cid: Some(ptr.pointer),
            tags: BTreeSet::from([TAG_ALLO_V1.to_string(), TAG_PROGRAM.to_string()]),
            created_at_block: event.block_number,
            updated_at_block: event.block_number,
        };

        Ok(vec![Changeset::InsertProject { project }])
    }

    pub(super) async fn program_meta_ptr_updated(&self, event: &EventRecord) -> Result<Vec<Changeset>> {
        let ptr = event.param_meta_ptr("newMetaPtr")?;
        let metadata = self.fetch_metadata(&ptr).await?;

        Ok(vec![Changeset::UpdateProject {
            chain_id: event.chain_id,
            project_id: program_project_id(event.address),
            project: ProjectUpdate {
                // A pointer without a usable document resets the name too.
                name: Some(metadata_str(&metadata, "name").unwrap_or_default()),
                metadata_cid: Some(ptr.pointer),
                metadata,
                updated_at_block: event.block_number,
            },
        }])
    }
}
