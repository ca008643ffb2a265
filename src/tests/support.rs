// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! In-memory ports for compiler tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;

use crate::changeset::Changeset;
use crate::compiler::Compiler;
use crate::error::{CompileError, PortError};
use crate::event::EventRecord;
use crate::ports::{ChainReader, ContentFetcher, Ports, PriceFeed};
use crate::state::IndexState;
use crate::types::address::Address;
use crate::types::id::ChainId;
use crate::types::value::{TokenAmount, Uint256};

pub const REGISTRY: Address = addr(0xaa);

pub const fn addr(last: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = last;
    Address(bytes)
}

pub fn num(n: u64) -> Uint256 {
    Uint256::from(n)
}

pub fn event(contract: &str, name: &str, address: Address, block: u64, params: Value) -> EventRecord {
    let params = match params {
        Value::Object(map) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    };
    EventRecord {
        chain_id: ChainId(1),
        contract_name: contract.to_string(),
        event_name: name.to_string(),
        address,
        block_number: block,
        log_index: 0,
        transaction_hash: format!("0x{:064x}", block),
        params,
    }
}

#[derive(Default)]
pub struct MockChain {
    values: BTreeMap<(Address, String), Value>,
    calls: AtomicUsize,
}

impl MockChain {
    pub fn set(&mut self, address: Address, function: &str, value: Value) {
        self.values.insert((address, function.to_string()), value);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ChainReader for MockChain {
    async fn read_contract(&self, address: Address, function: &str, _args: &[Value]) -> Result<Value, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.values
            .get(&(address, function.to_string()))
            .cloned()
            .ok_or_else(|| PortError::Failed(format!("execution reverted: {}", function)))
    }
}

#[derive(Default)]
pub struct MockContent {
    documents: BTreeMap<String, Value>,
    fetches: AtomicUsize,
}

impl MockContent {
    pub fn set(&mut self, pointer: &str, document: Value) {
        self.documents.insert(pointer.to_string(), document);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ContentFetcher for MockContent {
    async fn fetch_content(&self, pointer: &str) -> Result<Value, PortError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.documents
            .get(pointer)
            .cloned()
            .ok_or_else(|| PortError::Unavailable(pointer.to_string()))
    }
}

/// Converts at a flat USD rate per base unit.
pub struct MockPrices {
    pub usd_per_unit: f64,
    conversions: AtomicUsize,
}

impl Default for MockPrices {
    fn default() -> Self {
        Self { usd_per_unit: 2.0, conversions: AtomicUsize::new(0) }
    }
}

impl MockPrices {
    pub fn conversions(&self) -> usize {
        self.conversions.load(Ordering::SeqCst)
    }
}

impl PriceFeed for MockPrices {
    async fn convert_to_usd(
        &self,
        _chain_id: ChainId,
        _token: Address,
        amount: TokenAmount,
        _block_number: u64,
    ) -> Result<f64, PortError> {
        self.conversions.fetch_add(1, Ordering::SeqCst);
        Ok(amount.0 as f64 * self.usd_per_unit)
    }
}

/// Ports plus the state they read, applied to after each compile.
#[derive(Default)]
pub struct Harness {
    pub chain: MockChain,
    pub content: MockContent,
    pub prices: MockPrices,
    pub state: IndexState,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn compile(&self, event: &EventRecord) -> Result<Vec<Changeset>, CompileError> {
        Compiler::new(Ports::new(&self.chain, &self.content, &self.state, &self.prices))
            .compile(event)
            .await
    }

    /// Compiles and commits, as the apply layer would.
    pub async fn process(&mut self, event: &EventRecord) -> Vec<Changeset> {
        let batch = self.compile(event).await.expect("compile failed");
        self.state.apply_batch(&batch);
        batch
    }

    /// Reads `RoundCreated` performs, all answered.
    pub fn mock_round_reads(&mut self, round: Address, match_amount: Value, cid: &str, token: Address) {
        self.chain.set(round, "matchAmount", match_amount);
        self.chain.set(round, "roundMetaPtr", serde_json::json!([0, cid]));
        self.chain.set(round, "applicationMetaPtr", serde_json::json!([0, cid]));
        self.chain.set(round, "token", serde_json::json!(token.to_hex()));
    }
}
