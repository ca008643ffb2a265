// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Contract reads answered from a recorded fixture.
//!
//! Fixture shape: `{ "<address>": { "<function>": <value> } }`. Values are
//! whatever the live call returned, already decoded to JSON.

use std::collections::BTreeMap;
use std::path::Path;

use indexer_kernel::error::PortError;
use indexer_kernel::ports::ChainReader;
use indexer_kernel::types::address::Address;
use serde_json::Value;

use crate::errors::NodeError;

#[derive(Debug, Clone, Default)]
pub struct RecordedChainReader {
    calls: BTreeMap<Address, BTreeMap<String, Value>>,
}

impl RecordedChainReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, NodeError> {
        Ok(Self { calls: serde_json::from_str(json)? })
    }

    pub fn from_file(path: &Path) -> Result<Self, NodeError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

impl ChainReader for RecordedChainReader {
    async fn read_contract(&self, address: Address, function: &str, _args: &[Value]) -> Result<Value, PortError> {
        self.calls
            .get(&address)
            .and_then(|fns| fns.get(function))
            .cloned()
            .ok_or_else(|| PortError::Unavailable(format!("no recorded {}() for {}", function, address)))
    }
}
