// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! In-memory index state: the reference apply layer.
//!
//! # Invariants
//! - Entities are created once: an `Insert*` for an id that already exists
//!   is a no-op, so replaying a creation never rolls back later updates
//! - `updated_at_block` never decreases
//! - Role rows are append-only and never deduplicated; replaying a grant
//!   adds a second identical row. `DeleteAll*ByRoleAndAddress` removes every
//!   matching row and is a no-op when none match
//! - Updates to entities that do not exist are no-ops
//! - Stored metadata always belongs to the stored CID

use std::collections::BTreeMap;

use crate::changeset::{Changeset, ProjectUpdate, RoundUpdate};
use crate::error::PortError;
use crate::ports::EntityLookup;
use crate::types::address::Address;
use crate::types::entities::{Project, ProjectRole, Round, RoundRole};
use crate::types::enums::{ProjectRoleKind, RoundRoleKind};
use crate::types::id::{ChainId, ProjectId};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexState {
    projects: BTreeMap<(ChainId, ProjectId), Project>,
    rounds: BTreeMap<(ChainId, Address), Round>,
    project_roles: Vec<ProjectRole>,
    round_roles: Vec<RoundRole>,
}

impl IndexState {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Read APIs ---

    pub fn project(&self, chain_id: ChainId, id: &ProjectId) -> Option<&Project> {
        self.projects.get(&(chain_id, id.clone()))
    }

    pub fn round(&self, chain_id: ChainId, id: Address) -> Option<&Round> {
        self.rounds.get(&(chain_id, id))
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn rounds(&self) -> impl Iterator<Item = &Round> {
        self.rounds.values()
    }

    pub fn project_roles(&self, chain_id: ChainId, project_id: &ProjectId) -> Vec<&ProjectRole> {
        self.project_roles
            .iter()
            .filter(|r| r.chain_id == chain_id && &r.project_id == project_id)
            .collect()
    }

    pub fn round_roles(&self, chain_id: ChainId, round_id: Address) -> Vec<&RoundRole> {
        self.round_roles
            .iter()
            .filter(|r| r.chain_id == chain_id && r.round_id == round_id)
            .collect()
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    // --- Write Logic ---

    /// Applies one event's changesets, in order. Application cannot fail, so
    /// the batch lands as a unit.
    pub fn apply_batch(&mut self, batch: &[Changeset]) {
        for changeset in batch {
            self.apply(changeset);
        }
    }

    pub fn apply(&mut self, changeset: &Changeset) {
        match changeset {
            Changeset::InsertProject { project } => {
                self.projects
                    .entry((project.chain_id, project.id.clone()))
                    .or_insert_with(|| project.clone());
            }
            Changeset::UpdateProject { chain_id, project_id, project } => {
                if let Some(existing) = self.projects.get_mut(&(*chain_id, project_id.clone())) {
                    merge_project(existing, project);
                }
            }
            Changeset::InsertProjectRole { project_role } => {
                self.project_roles.push(project_role.clone());
            }
            Changeset::DeleteAllProjectRolesByRoleAndAddress { chain_id, project_id, role, address } => {
                self.delete_project_roles(*chain_id, project_id, *role, *address);
            }
            Changeset::InsertRound { round } => {
                self.rounds.entry((round.chain_id, round.id)).or_insert_with(|| round.clone());
            }
            Changeset::UpdateRound { chain_id, round_id, round } => {
                if let Some(existing) = self.rounds.get_mut(&(*chain_id, *round_id)) {
                    merge_round(existing, round);
                }
            }
            Changeset::InsertRoundRole { round_role } => {
                self.round_roles.push(round_role.clone());
            }
            Changeset::DeleteAllRoundRolesByRoleAndAddress { chain_id, round_id, role, address } => {
                self.delete_round_roles(*chain_id, *round_id, *role, *address);
            }
        }
    }

    fn delete_project_roles(&mut self, chain_id: ChainId, project_id: &ProjectId, role: ProjectRoleKind, address: Address) {
        self.project_roles.retain(|r| {
            !(r.chain_id == chain_id && &r.project_id == project_id && r.role == role && r.address == address)
        });
    }

    fn delete_round_roles(&mut self, chain_id: ChainId, round_id: Address, role: RoundRoleKind, address: Address) {
        self.round_roles.retain(|r| {
            !(r.chain_id == chain_id && r.round_id == round_id && r.role == role && r.address == address)
        });
    }
}

fn merge_project(project: &mut Project, update: &ProjectUpdate) {
    if let Some(name) = &update.name {
        project.name = name.clone();
    }
    if let Some(cid) = &update.metadata_cid {
        project.metadata_cid = Some(cid.clone());
        project.metadata = update.metadata.clone();
    }
    project.updated_at_block = project.updated_at_block.max(update.updated_at_block);
}

fn merge_round(round: &mut Round, update: &RoundUpdate) {
    fn set<T: Clone>(field: &mut T, value: &Option<T>) {
        if let Some(v) = value {
            *field = v.clone();
        }
    }
    fn set_opt<T: Clone>(field: &mut Option<T>, value: &Option<T>) {
        if value.is_some() {
            *field = value.clone();
        }
    }

    set(&mut round.match_amount, &update.match_amount);
    set(&mut round.match_amount_in_usd, &update.match_amount_in_usd);
    if let Some(cid) = &update.round_metadata_cid {
        round.round_metadata_cid = cid.clone();
        round.round_metadata = update.round_metadata.clone();
    }
    if let Some(cid) = &update.application_metadata_cid {
        round.application_metadata_cid = cid.clone();
        round.application_metadata = update.application_metadata.clone();
    }
    set_opt(&mut round.applications_start_time, &update.applications_start_time);
    set_opt(&mut round.applications_end_time, &update.applications_end_time);
    set_opt(&mut round.donations_start_time, &update.donations_start_time);
    set_opt(&mut round.donations_end_time, &update.donations_end_time);
    round.updated_at_block = round.updated_at_block.max(update.updated_at_block);
}

impl EntityLookup for IndexState {
    async fn get_project_by_id(&self, chain_id: ChainId, id: &ProjectId) -> Result<Option<Project>, PortError> {
        Ok(self.project(chain_id, id).cloned())
    }

    async fn get_round_by_id(&self, chain_id: ChainId, id: Address) -> Result<Option<Round>, PortError> {
        Ok(self.round(chain_id, id).cloned())
    }
}
