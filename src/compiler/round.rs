// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Round factory and round implementation handlers.

use std::collections::BTreeSet;

use futures::try_join;
use tracing::debug;

use super::{Compiler, TimeWindow};
use crate::changeset::{Changeset, RoundUpdate};
use crate::config::{functions, TAG_ALLO_V1};
use crate::error::{CompileErrorKind, Result};
use crate::event::EventRecord;
use crate::identity::{program_project_id, round_id};
use crate::ports::{ChainReader, ContentFetcher, EntityLookup, PriceFeed};
use crate::types::address::Address;
use crate::types::entities::Round;
use crate::types::value::{decode_address, decode_amount};

impl<C, F, L, P> Compiler<'_, C, F, L, P>
where
    C: ChainReader,
    F: ContentFetcher,
    L: EntityLookup,
    P: PriceFeed,
{
    pub(super) async fn round_created(&self, event: &EventRecord) -> Result<Vec<Changeset>> {
        let round = event.param_address("roundAddress")?;
        let owned_by = event.param_address("ownedBy")?;
        let program_id = program_project_id(owned_by);

        // Independent read-only calls; the only suspension point of this handler.
        let (match_amount, round_ptr, application_ptr, token) = try_join!(
            self.read(round, functions::MATCH_AMOUNT),
            self.read_meta_ptr(round, functions::ROUND_META_PTR),
            self.read_meta_ptr(round, functions::APPLICATION_META_PTR),
            self.read(round, functions::TOKEN),
        )?;
        let match_amount = decode_amount(&match_amount)
            .map_err(|e| CompileErrorKind::read_shape(round, functions::MATCH_AMOUNT, e))?;
        let token = decode_address(&token).map_err(|e| CompileErrorKind::read_shape(round, functions::TOKEN, e))?;

        let (round_metadata, application_metadata) =
            try_join!(self.fetch_metadata(&round_ptr), self.fetch_metadata(&application_ptr))?;

        let owner = self
            .ports
            .lookup
            .get_project_by_id(event.chain_id, &program_id)
            .await
            .map_err(CompileErrorKind::LookupFailure)?;
        if owner.is_none() {
            debug!(round = %round, program = %program_id, "Round created by a program not yet indexed");
        }

        let match_amount_in_usd = self.to_usd(event, token, match_amount).await?;

        let insert = Round {
            id: round_id(round),
            chain_id: event.chain_id,
            strategy_address: Address::ZERO,
            application_metadata_cid: application_ptr.pointer,
            application_metadata,
            round_metadata_cid: round_ptr.pointer,
            round_metadata,
            applications_start_time: None,
            applications_end_time: None,
            donations_start_time: None,
            donations_end_time: None,
            match_amount,
            match_token_address: token,
            match_amount_in_usd: 0.0,
            project_id: program_id,
            tags: BTreeSet::from([TAG_ALLO_V1.to_string()]),
            created_at_block: event.block_number,
            updated_at_block: event.block_number,
        };

        Ok(vec![
            Changeset::InsertRound { round: insert },
            Changeset::UpdateRound {
                chain_id: event.chain_id,
                round_id: round_id(round),
                round: RoundUpdate {
                    match_amount: Some(match_amount),
                    match_amount_in_usd: Some(match_amount_in_usd),
                    updated_at_block: event.block_number,
                    ..RoundUpdate::default()
                },
            },
        ])
    }

    pub(super) async fn match_amount_updated(&self, event: &EventRecord) -> Result<Vec<Changeset>> {
        let amount = event.param_amount("newAmount")?;

        let Some(round) = self
            .ports
            .lookup
            .get_round_by_id(event.chain_id, event.address)
            .await
            .map_err(CompileErrorKind::LookupFailure)?
        else {
            debug!(round = %event.address, "Match amount updated on unknown round, no changesets");
            return Ok(Vec::new());
        };

        let match_amount_in_usd = self.to_usd(event, round.match_token_address, amount).await?;

        Ok(vec![Changeset::UpdateRound {
            chain_id: event.chain_id,
            round_id: round.id,
            round: RoundUpdate {
                match_amount: Some(amount),
                match_amount_in_usd: Some(match_amount_in_usd),
                updated_at_block: event.block_number,
                ..RoundUpdate::default()
            },
        }])
    }

    pub(super) async fn round_meta_ptr_updated(&self, event: &EventRecord) -> Result<Vec<Changeset>> {
        let ptr = event.param_meta_ptr("newMetaPtr")?;
        let metadata = self.fetch_metadata(&ptr).await?;

        Ok(vec![Changeset::UpdateRound {
            chain_id: event.chain_id,
            round_id: round_id(event.address),
            round: RoundUpdate {
                round_metadata_cid: Some(ptr.pointer),
                round_metadata: metadata,
                updated_at_block: event.block_number,
                ..RoundUpdate::default()
            },
        }])
    }

    pub(super) async fn application_meta_ptr_updated(&self, event: &EventRecord) -> Result<Vec<Changeset>> {
        let ptr = event.param_meta_ptr("newMetaPtr")?;
        let metadata = self.fetch_metadata(&ptr).await?;

        Ok(vec![Changeset::UpdateRound {
            chain_id: event.chain_id,
            round_id: round_id(event.address),
            round: RoundUpdate {
                application_metadata_cid: Some(ptr.pointer),
                application_metadata: metadata,
                updated_at_block: event.block_number,
                ..RoundUpdate::default()
            },
        }])
    }

    pub(super) fn time_updated(&self, window: TimeWindow, event: &EventRecord) -> Result<Vec<Changeset>> {
        let time = Some(event.param_timestamp("newTime")?);
        let mut update = RoundUpdate { updated_at_block: event.block_number, ..RoundUpdate::default() };
        match window {
            TimeWindow::ApplicationsStart => update.applications_start_time = time,
            TimeWindow::ApplicationsEnd => update.applications_end_time = time,
            TimeWindow::DonationsStart => update.donations_start_time = time,
            TimeWindow::DonationsEnd => update.donations_end_time = time,
        }

        Ok(vec![Changeset::UpdateRound {
            chain_id: event.chain_id,
            round_id: round_id(event.address),
            round: update,
        }])
    }
}
