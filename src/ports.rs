// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Capability ports.
//!
//! Everything the compiler reads flows through these traits. Implementations
//! own retries, timeouts and cancellation; the compiler treats any `Err` as an
//! event-level abort.

#![allow(async_fn_in_trait)]

use serde_json::Value;

use crate::error::PortError;
use crate::types::address::Address;
use crate::types::entities::{Project, Round};
use crate::types::id::{ChainId, ProjectId};
use crate::types::value::TokenAmount;

/// Read-only contract calls.
pub trait ChainReader {
    async fn read_contract(&self, address: Address, function: &str, args: &[Value]) -> Result<Value, PortError>;
}

/// Resolves content pointers (CIDs) to JSON metadata.
pub trait ContentFetcher {
    async fn fetch_content(&self, pointer: &str) -> Result<Value, PortError>;
}

/// Current indexed state, as committed before the event being compiled.
pub trait EntityLookup {
    async fn get_project_by_id(&self, chain_id: ChainId, id: &ProjectId) -> Result<Option<Project>, PortError>;

    async fn get_round_by_id(&self, chain_id: ChainId, id: Address) -> Result<Option<Round>, PortError>;
}

/// Token amount to USD at a given block.
pub trait PriceFeed {
    async fn convert_to_usd(
        &self,
        chain_id: ChainId,
        token: Address,
        amount: TokenAmount,
        block_number: u64,
    ) -> Result<f64, PortError>;
}

/// One borrowed implementation of each port.
pub struct Ports<'a, C, F, L, P> {
    pub chain: &'a C,
    pub content: &'a F,
    pub lookup: &'a L,
    pub prices: &'a P,
}

impl<'a, C, F, L, P> Ports<'a, C, F, L, P> {
    pub fn new(chain: &'a C, content: &'a F, lookup: &'a L, prices: &'a P) -> Self {
        Self { chain, content, lookup, prices }
    }
}

impl<C, F, L, P> Clone for Ports<'_, C, F, L, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, F, L, P> Copy for Ports<'_, C, F, L, P> {}
